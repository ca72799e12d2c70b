// src/core/report.rs
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};

use crate::error::{AnalyzerError, Result};
use super::call_graph::{DependencyGraph, ModuleGroup};

/// Nodes scoring above this are reported as important
pub const IMPORTANCE_THRESHOLD: f64 = 7.0;

const MAX_KEY_FUNCTIONS: usize = 5;

const RECOMMENDATIONS: &[&str] = &[
    "Focus review on functions with high importance scores",
    "Check coupling between modules",
    "Consider refactoring functions with excessive complexity",
];

const MARKDOWN_TEMPLATE: &str = r#"# Analysis Report: {{ label }}

Generated: {{ generated_at }}

## Summary

- Total functions: {{ summary.total_functions }}
- Critical functions: {{ summary.critical_functions }}
- Modules: {{ summary.modules }}
- Relationships: {{ summary.relationships }}

## Most Important Functions

{% if key_findings.most_important_functions %}{% for name in key_findings.most_important_functions %}- `{{ name }}`
{% endfor %}{% else %}No function scores above the importance threshold.
{% endif %}
## Module Distribution

| Module | Functions |
|--------|-----------|
{% for module, count in key_findings.module_distribution %}| {{ module }} | {{ count }} |
{% endfor %}
## Recommendations

{% for item in recommendations %}- {{ item }}
{% endfor %}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Markdown,
}

impl FromStr for ReportFormat {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            other => Err(AnalyzerError::InvalidInput(format!("unknown report format: {}", other))),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "markdown",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_functions: usize,
    /// Nodes scoring above [`IMPORTANCE_THRESHOLD`]
    pub critical_functions: usize,
    pub modules: usize,
    pub relationships: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyFindings {
    pub most_important_functions: Vec<String>,
    pub module_distribution: BTreeMap<ModuleGroup, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Usually the analyzed file path
    pub label: String,
    pub summary: ReportSummary,
    pub key_findings: KeyFindings,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Summarizes a dependency graph for humans
pub struct ReportGenerator;

impl ReportGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, label: &str, graph: &DependencyGraph) -> AnalysisReport {
        let important: Vec<String> = graph
            .dependency_nodes
            .iter()
            .filter(|node| node.importance_score > IMPORTANCE_THRESHOLD)
            .map(|node| node.name.clone())
            .collect();

        let module_distribution = graph
            .modules
            .iter()
            .map(|(group, functions)| (*group, functions.len()))
            .collect();

        AnalysisReport {
            label: label.to_string(),
            summary: ReportSummary {
                total_functions: graph.total_functions,
                critical_functions: important.len(),
                modules: graph.modules.len(),
                relationships: graph.total_relationships,
            },
            key_findings: KeyFindings {
                most_important_functions: important.into_iter().take(MAX_KEY_FUNCTIONS).collect(),
                module_distribution,
            },
            recommendations: RECOMMENDATIONS.iter().map(|r| r.to_string()).collect(),
            generated_at: Utc::now(),
        }
    }

    pub fn render(&self, report: &AnalysisReport, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            ReportFormat::Markdown => {
                let context = Context::from_serialize(report)?;
                Ok(Tera::one_off(MARKDOWN_TEMPLATE, &context, false)?)
            }
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}
