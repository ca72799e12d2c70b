use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{DiagramDialect, ReportFormat};
use crate::error::{AnalyzerError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Analysis limits handed to the engine
    pub analysis: AnalysisConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Upper bound on the summed line span of a chunk
    pub max_chunk_size: usize,

    /// Number of call edges fed into a diagram
    pub max_nodes: usize,

    /// Security findings listed in full (all are still counted)
    pub max_findings: usize,

    /// Search hits listed in full (all are still counted)
    pub max_search_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: bool,

    /// Dialect used when `diagram` is called without one
    pub default_dialect: DiagramDialect,

    /// Default report format (json, markdown)
    pub report_format: ReportFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    pub level: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 600,
            max_nodes: 20,
            max_findings: 50,
            max_search_results: 50,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            output: OutputConfig {
                pretty: true,
                default_dialect: DiagramDialect::Flowchart,
                report_format: ReportFormat::Json,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| AnalyzerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AnalyzerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                // Try common config file locations
                let candidates = [
                    "ReverseAnalyzer.toml",
                    "reverse-analyzer.toml",
                    ".reverse-analyzer.toml",
                ];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    /// Apply MAX_CHUNK_SIZE, MAX_NODES and LOG_LEVEL from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("MAX_CHUNK_SIZE") {
            self.analysis.max_chunk_size = parse_limit("MAX_CHUNK_SIZE", &value)?;
        }
        if let Some(value) = lookup("MAX_NODES") {
            self.analysis.max_nodes = parse_limit("MAX_NODES", &value)?;
        }
        if let Some(value) = lookup("LOG_LEVEL") {
            self.logging.level = value.to_lowercase();
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.analysis.max_chunk_size == 0 {
            return Err(AnalyzerError::Config(
                "analysis.max_chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_limit(key: &str, value: &str) -> Result<usize> {
    value.trim().parse::<usize>().map_err(|e| {
        AnalyzerError::Config(format!("{} must be a non-negative integer, got '{}': {}", key, value, e))
    })
}
