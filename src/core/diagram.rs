// src/core/diagram.rs
//! Mermaid rendering of a dependency graph.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::AnalyzerError;
use super::call_graph::{CallEdge, DependencyGraph, ModuleGroup};

/// Children listed under each module group in a mindmap
pub const MINDMAP_CHILDREN_PER_GROUP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramDialect {
    /// Top-down flowchart with one declaration per node
    Flowchart,
    /// Module groups with their functions as children
    Mindmap,
    /// Left-to-right graph with inline labels
    Graph,
}

impl FromStr for DiagramDialect {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flowchart" => Ok(DiagramDialect::Flowchart),
            "mindmap" => Ok(DiagramDialect::Mindmap),
            "graph" => Ok(DiagramDialect::Graph),
            other => Err(AnalyzerError::UnknownDialect(other.to_string())),
        }
    }
}

impl fmt::Display for DiagramDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagramDialect::Flowchart => "flowchart",
            DiagramDialect::Mindmap => "mindmap",
            DiagramDialect::Graph => "graph",
        })
    }
}

/// Renders call edges and module groups as Mermaid source
pub struct DiagramRenderer;

impl DiagramRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render a built graph
    pub fn render_graph(&self, graph: &DependencyGraph, dialect: DiagramDialect, max_nodes: usize) -> String {
        self.render(&graph.call_graph, &graph.modules, dialect, max_nodes)
    }

    /// Render edges and groups. Only the first `max_nodes` edges are drawn;
    /// the cap applies to edges, not to distinct nodes.
    pub fn render(
        &self,
        edges: &[CallEdge],
        modules: &BTreeMap<ModuleGroup, Vec<String>>,
        dialect: DiagramDialect,
        max_nodes: usize,
    ) -> String {
        let edges = &edges[..edges.len().min(max_nodes)];

        let lines = match dialect {
            DiagramDialect::Flowchart => Self::flowchart(edges),
            DiagramDialect::Mindmap => Self::mindmap(modules),
            DiagramDialect::Graph => Self::graph(edges),
        };

        lines.join("\n")
    }

    fn flowchart(edges: &[CallEdge]) -> Vec<String> {
        let mut lines = vec!["flowchart TD".to_string()];
        let mut declared: HashSet<&str> = HashSet::new();

        for edge in edges {
            let caller = sanitize_identifier(&edge.caller);
            let callee = sanitize_identifier(&edge.callee);

            if declared.insert(edge.caller.as_str()) {
                lines.push(format!("    {}[\"{}\"]", caller, escape_label(&edge.caller)));
            }
            if declared.insert(edge.callee.as_str()) {
                lines.push(format!("    {}[\"{}\"]", callee, escape_label(&edge.callee)));
            }

            lines.push(format!("    {} --> {}", caller, callee));
        }

        lines
    }

    fn mindmap(modules: &BTreeMap<ModuleGroup, Vec<String>>) -> Vec<String> {
        let mut lines = vec!["mindmap".to_string(), "  root((Code Structure))".to_string()];

        for (group, functions) in modules {
            if functions.is_empty() {
                continue;
            }
            lines.push(format!("    {}", group));
            for function in functions.iter().take(MINDMAP_CHILDREN_PER_GROUP) {
                lines.push(format!("      {}", sanitize_identifier(function)));
            }
        }

        lines
    }

    fn graph(edges: &[CallEdge]) -> Vec<String> {
        let mut lines = vec!["graph LR".to_string()];

        for edge in edges {
            lines.push(format!(
                "    {}[{}] --> {}[{}]",
                sanitize_identifier(&edge.caller),
                escape_label(&edge.caller),
                sanitize_identifier(&edge.callee),
                escape_label(&edge.callee),
            ));
        }

        lines
    }
}

impl Default for DiagramRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
/// An empty name becomes `_` so every node keeps an identifier.
pub fn sanitize_identifier(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn escape_label(label: &str) -> String {
    label.replace('"', "#quot;")
}
