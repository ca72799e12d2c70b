// src/core/engine.rs
use serde_json::Value;
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::error::{AnalyzerError, Result};
use super::{
    AnalysisReport, CallGraphBuilder, Chunk, ChunkedSource, Chunker, CodeSearcher,
    DataStructureExtractor, DependencyGraph, DiagramDialect, DiagramRenderer, FunctionExtractor,
    FunctionInsight, FunctionInspector, FunctionRecord, RefactorAdvice, RefactorAdvisor,
    ReportFormat, ReportGenerator, SearchKind, SearchReport, SecurityReport, SecurityRuleEngine,
    StructureReport,
};

/// Main entry point tying the analyzers together.
///
/// Every operation is synchronous and works on in-memory text; reading files
/// is left to the caller.
pub struct Engine {
    config: AnalysisConfig,
    extractor: FunctionExtractor,
    chunker: Chunker,
    graph_builder: CallGraphBuilder,
    security: SecurityRuleEngine,
    renderer: DiagramRenderer,
    structures: DataStructureExtractor,
    inspector: FunctionInspector,
    refactor: RefactorAdvisor,
    searcher: CodeSearcher,
    reporter: ReportGenerator,
}

impl Engine {
    /// Create an engine, compiling every pattern table up front
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        debug!("Creating engine with {:?}", config);

        Ok(Self {
            config: config.clone(),
            extractor: FunctionExtractor::new()?,
            chunker: Chunker::new(),
            graph_builder: CallGraphBuilder::new(),
            security: SecurityRuleEngine::new(config.max_findings)?,
            renderer: DiagramRenderer::new(),
            structures: DataStructureExtractor::new()?,
            inspector: FunctionInspector::new()?,
            refactor: RefactorAdvisor::new()?,
            searcher: CodeSearcher::new(config.max_search_results),
            reporter: ReportGenerator::new(),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn extract_functions(&self, text: &str) -> Vec<FunctionRecord> {
        self.extractor.extract(text)
    }

    pub fn chunk(&self, text: &str, max_chunk_size: usize) -> ChunkedSource {
        let functions = self.extractor.extract(text);
        let chunked = self.chunker.chunk_source(text, functions, max_chunk_size);

        info!(
            "Chunked {} functions into {} chunks (max size {})",
            chunked.total_functions, chunked.total_chunks, max_chunk_size
        );
        chunked
    }

    pub fn build_graph(&self, chunked: &ChunkedSource) -> DependencyGraph {
        let graph = self.graph_builder.build_from_chunks(&chunked.chunks);
        info!(
            "Built dependency graph: {} functions, {} relationships",
            graph.total_functions, graph.total_relationships
        );
        graph
    }

    /// Build a graph from serialized chunk output, e.g. a saved `chunk` result
    pub fn build_graph_from_json(&self, value: &Value) -> Result<DependencyGraph> {
        if let Some(error) = value.get("error") {
            return Err(AnalyzerError::InvalidInput(format!("chunk data carries an error: {}", error)));
        }

        let chunks = value
            .get("chunks")
            .filter(|chunks| chunks.is_array())
            .ok_or_else(|| AnalyzerError::InvalidInput("expected an object with a 'chunks' array".to_string()))?;

        let chunks: Vec<Chunk> = serde_json::from_value(chunks.clone())
            .map_err(|e| AnalyzerError::InvalidInput(format!("malformed chunk data: {}", e)))?;

        debug!("Loaded {} chunks from JSON", chunks.len());

        let graph = self.graph_builder.build_from_chunks(&chunks);
        info!(
            "Built dependency graph: {} functions, {} relationships",
            graph.total_functions, graph.total_relationships
        );
        Ok(graph)
    }

    /// Chunk with the configured bound and build the graph in one step
    pub fn graph_for_source(&self, text: &str) -> DependencyGraph {
        let chunked = self.chunk(text, self.config.max_chunk_size);
        self.build_graph(&chunked)
    }

    pub fn audit_security(&self, text: &str) -> SecurityReport {
        let report = self.security.audit(text);
        info!(
            "Security audit: {} findings, score {}",
            report.summary.total_findings, report.summary.security_score
        );
        report
    }

    pub fn render_diagram(&self, graph: &DependencyGraph, dialect: DiagramDialect, max_nodes: usize) -> String {
        debug!("Rendering {} diagram with at most {} edges", dialect, max_nodes);
        self.renderer.render_graph(graph, dialect, max_nodes)
    }

    pub fn extract_structures(&self, text: &str) -> StructureReport {
        let report = self.structures.extract(text);
        info!(
            "Found {} structures, {} enums, {} typedefs",
            report.summary.total_structures, report.summary.total_enums, report.summary.total_typedefs
        );
        report
    }

    pub fn inspect_function(&self, code: &str, name: &str) -> FunctionInsight {
        debug!("Inspecting function {}", name);
        self.inspector.inspect(code, name)
    }

    pub fn refactor_advice(&self, code: &str, name: &str) -> RefactorAdvice {
        debug!("Collecting refactor advice for {}", name);
        self.refactor.advise(code, name)
    }

    pub fn search(&self, text: &str, pattern: &str, kind: SearchKind) -> Result<SearchReport> {
        let report = self.searcher.search(text, pattern, kind)?;
        info!("Search for '{}' ({}): {} matches", pattern, kind, report.total_matches);
        Ok(report)
    }

    pub fn report(&self, label: &str, graph: &DependencyGraph) -> AnalysisReport {
        self.reporter.generate(label, graph)
    }

    pub fn render_report(&self, report: &AnalysisReport, format: ReportFormat) -> Result<String> {
        self.reporter.render(report, format)
    }

    /// Locate a function by name in extracted records
    pub fn find_function(&self, text: &str, name: &str) -> Option<FunctionRecord> {
        self.extractor
            .extract(text)
            .into_iter()
            .find(|function| function.name == name)
    }
}
