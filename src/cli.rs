// src/cli.rs
use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use reverse_code_analyzer::core::{DependencyGraph, DiagramDialect, ReportFormat, SearchKind};
use reverse_code_analyzer::{Config, Engine};

#[derive(Parser)]
#[command(name = "reverse-code-analyzer")]
#[command(about = "Heuristic structure, call-graph and security analysis for C sources")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the functions found in a C file
    Functions {
        file: PathBuf,
    },

    /// Split a C file into size-bounded chunks of functions
    Chunk {
        file: PathBuf,

        /// Upper bound on the summed line span per chunk
        #[arg(short, long)]
        max_size: Option<usize>,
    },

    /// Build the dependency graph
    Graph {
        /// C file, or a saved `chunk` result with --from-chunks
        input: PathBuf,

        /// Treat the input as JSON produced by `chunk`
        #[arg(long)]
        from_chunks: bool,
    },

    /// Render the call graph as a Mermaid diagram
    Diagram {
        input: PathBuf,

        #[arg(long)]
        from_chunks: bool,

        /// flowchart, mindmap or graph
        #[arg(short, long)]
        dialect: Option<String>,

        /// Number of call edges to draw
        #[arg(long)]
        max_nodes: Option<usize>,
    },

    /// Scan a C file for risky constructs
    Audit {
        file: PathBuf,
    },

    /// Extract struct, enum and typedef declarations
    Structs {
        file: PathBuf,
    },

    /// Search a C file
    Search {
        file: PathBuf,

        pattern: String,

        /// function, variable, literal or regex
        #[arg(short, long, default_value = "function")]
        kind: String,
    },

    /// Detailed look at one function
    Inspect {
        file: PathBuf,

        /// Function name
        name: String,
    },

    /// Refactoring suggestions for one function
    Refactor {
        file: PathBuf,

        name: String,
    },

    /// Summary report over the dependency graph
    Report {
        input: PathBuf,

        #[arg(long)]
        from_chunks: bool,

        /// json or markdown
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Write a default configuration file
    InitConfig {
        #[arg(short, long, default_value = "reverse-analyzer.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub async fn execute(self, engine: Engine, config: Config) -> Result<()> {
        let pretty = config.output.pretty;

        match self.command {
            Commands::Functions { file } => {
                let source = read_source(&file).await?;
                emit(&engine.extract_functions(&source), pretty)
            }
            Commands::Chunk { file, max_size } => {
                let source = read_source(&file).await?;
                let max_size = max_size.unwrap_or(config.analysis.max_chunk_size);
                emit(&engine.chunk(&source, max_size), pretty)
            }
            Commands::Graph { input, from_chunks } => {
                let graph = load_graph(&engine, &input, from_chunks).await?;
                emit(&graph, pretty)
            }
            Commands::Diagram { input, from_chunks, dialect, max_nodes } => {
                let dialect = match dialect {
                    Some(name) => name.parse::<DiagramDialect>()?,
                    None => config.output.default_dialect,
                };
                let max_nodes = max_nodes.unwrap_or(config.analysis.max_nodes);

                let graph = load_graph(&engine, &input, from_chunks).await?;
                println!("{}", engine.render_diagram(&graph, dialect, max_nodes));
                Ok(())
            }
            Commands::Audit { file } => {
                let source = read_source(&file).await?;
                emit(&engine.audit_security(&source), pretty)
            }
            Commands::Structs { file } => {
                let source = read_source(&file).await?;
                emit(&engine.extract_structures(&source), pretty)
            }
            Commands::Search { file, pattern, kind } => {
                let kind: SearchKind = kind.parse()?;
                let source = read_source(&file).await?;
                emit(&engine.search(&source, &pattern, kind)?, pretty)
            }
            Commands::Inspect { file, name } => {
                let source = read_source(&file).await?;
                let Some(function) = engine.find_function(&source, &name) else {
                    bail!("Function '{}' not found in {}", name, file.display());
                };
                emit(&engine.inspect_function(&function.code, &function.name), pretty)
            }
            Commands::Refactor { file, name } => {
                let source = read_source(&file).await?;
                let Some(function) = engine.find_function(&source, &name) else {
                    bail!("Function '{}' not found in {}", name, file.display());
                };
                emit(&engine.refactor_advice(&function.code, &function.name), pretty)
            }
            Commands::Report { input, from_chunks, format } => {
                let format = match format {
                    Some(name) => name.parse::<ReportFormat>()?,
                    None => config.output.report_format,
                };

                let graph = load_graph(&engine, &input, from_chunks).await?;
                let report = engine.report(&input.display().to_string(), &graph);
                println!("{}", engine.render_report(&report, format)?);
                Ok(())
            }
            Commands::InitConfig { path, force } => {
                if path.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", path.display());
                }
                Config::default().save(&path)?;
                info!("Wrote configuration to {}", path.display());
                Ok(())
            }
        }
    }
}

async fn read_source(path: &Path) -> Result<String> {
    debug!("Reading {}", path.display());
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn load_graph(engine: &Engine, input: &Path, from_chunks: bool) -> Result<DependencyGraph> {
    let content = read_source(input).await?;

    if from_chunks {
        let value: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("{} is not valid JSON", input.display()))?;
        Ok(engine.build_graph_from_json(&value)?)
    } else {
        Ok(engine.graph_for_source(&content))
    }
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}
