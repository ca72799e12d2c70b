// src/core/mod.rs
mod engine;
mod parser;
mod complexity;
mod chunker;
mod security;
mod diagram;
mod structures;
mod inspector;
mod refactor;
mod search;
mod report;

// Call graph reconstruction and module grouping
pub mod call_graph;

pub use engine::Engine;
pub use parser::{FunctionExtractor, FunctionRecord, CALL_EXCLUSIONS};
pub use complexity::ComplexityScorer;
pub use chunker::{Chunk, ChunkedSource, Chunker};
pub use security::{
    RiskAssessment, RiskLevel, RuleDef, SecurityCategory, SecurityFinding, SecurityReport,
    SecurityRule, SecurityRuleEngine, SecuritySummary, Severity, DEFAULT_RULES,
};
pub use diagram::{sanitize_identifier, DiagramDialect, DiagramRenderer, MINDMAP_CHILDREN_PER_GROUP};
pub use structures::{
    DataModelComplexity, DataStructureExtractor, EnumRecord, StructField, StructureRecord,
    StructureReport, StructureSummary, TypedefRecord,
};
pub use inspector::{
    ComplexityIndicators, ComplexityLevel, ErrorHandlingCue, FunctionAssessment, FunctionInsight,
    FunctionInspector, PurposeHint, Reliability, SecurityConcern, PURPOSE_RULES,
};
pub use refactor::{RefactorAdvice, RefactorAdvisor, RefactorPriority, RefactorSuggestion};
pub use search::{CodeSearcher, MatchType, SearchHit, SearchKind, SearchReport};
pub use report::{
    AnalysisReport, KeyFindings, ReportFormat, ReportGenerator, ReportSummary, IMPORTANCE_THRESHOLD,
};

pub use call_graph::{
    CallEdge, CallGraphBuilder, DependencyGraph, DependencyNode, GraphStatistics, ModuleGroup,
};
