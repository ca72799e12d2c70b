// src/lib.rs
//! Static analysis for C sources: function extraction, complexity scoring,
//! chunking, call-graph reconstruction, security auditing, Mermaid diagrams
//! and data-structure extraction.
//!
//! Everything is regex- and brace-counting based; there is no preprocessor
//! and no real C parser, so results are heuristics.

pub mod config;
pub mod core;
pub mod error;

pub use config::Config;
pub use self::core::Engine;
pub use error::{AnalyzerError, Result};
