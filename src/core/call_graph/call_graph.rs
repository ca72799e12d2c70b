// src/core/call_graph/call_graph.rs
use std::collections::{BTreeMap, HashMap};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::module_classifier::{classify, ModuleGroup};
use super::super::{Chunk, FunctionRecord};

/// Weight of each caller in the importance score
pub const INBOUND_WEIGHT: f64 = 2.0;
/// Weight of each callee in the importance score
pub const OUTBOUND_WEIGHT: f64 = 0.5;
/// Weight of the complexity score in the importance score
pub const COMPLEXITY_WEIGHT: f64 = 0.1;

/// Node in the dependency graph representing one function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyNode {
    pub name: String,
    /// Call targets, including ones with no node of their own
    pub calls: Vec<String>,
    /// Callers that are themselves nodes; one entry per call edge
    pub called_by: Vec<String>,
    pub complexity: u32,
    pub line_count: usize,
    pub importance_score: f64,
    pub module_group: ModuleGroup,
}

impl DependencyNode {
    /// Get in-degree (number of callers)
    pub fn in_degree(&self) -> usize {
        self.called_by.len()
    }

    /// Get out-degree (number of callees)
    pub fn out_degree(&self) -> usize {
        self.calls.len()
    }
}

/// Edge in the call graph; the callee may be an unresolved external symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller: String,
    pub callee: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub max_calls_in: usize,
    pub max_calls_out: usize,
    pub avg_complexity: f64,
}

/// Complete dependency graph for one source text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub total_functions: usize,
    pub total_relationships: usize,
    /// Nodes by descending importance; ties keep encounter order
    pub dependency_nodes: Vec<DependencyNode>,
    /// Names of the top tenth of nodes (at least one)
    pub critical_functions: Vec<String>,
    pub modules: BTreeMap<ModuleGroup, Vec<String>>,
    /// Every (caller, callee) pair in source order
    pub call_graph: Vec<CallEdge>,
    pub statistics: GraphStatistics,
}

impl DependencyGraph {
    /// Look up a node by function name
    pub fn node(&self, name: &str) -> Option<&DependencyNode> {
        self.dependency_nodes.iter().find(|node| node.name == name)
    }

    /// Get functions that this function calls (outgoing edges)
    pub fn get_callees(&self, name: &str) -> Vec<&str> {
        self.node(name)
            .map(|node| node.calls.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Get functions that call this function (incoming edges)
    pub fn get_callers(&self, name: &str) -> Vec<&str> {
        self.node(name)
            .map(|node| node.called_by.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Edges whose callee is a node in this graph
    pub fn resolved_edges(&self) -> impl Iterator<Item = &CallEdge> {
        self.call_graph
            .iter()
            .filter(move |edge| self.node(&edge.callee).is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.dependency_nodes.is_empty()
    }
}

/// Builds a [`DependencyGraph`] from extracted function records
pub struct CallGraphBuilder;

impl CallGraphBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build from chunks, visiting functions in chunk order
    pub fn build_from_chunks(&self, chunks: &[Chunk]) -> DependencyGraph {
        self.build(chunks.iter().flat_map(|chunk| chunk.functions.iter()))
    }

    /// Build from any ordered sequence of function records.
    ///
    /// A later record with an already-seen name replaces the earlier node in
    /// place, but the earlier record's edges stay in the edge list.
    pub fn build<'a, I>(&self, functions: I) -> DependencyGraph
    where
        I: IntoIterator<Item = &'a FunctionRecord>,
    {
        let mut nodes: Vec<DependencyNode> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut edges: Vec<CallEdge> = Vec::new();

        // First pass: nodes and outbound edges
        for function in functions {
            let node = DependencyNode {
                name: function.name.clone(),
                calls: function.calls.clone(),
                called_by: Vec::new(),
                complexity: function.complexity,
                line_count: function.line_span(),
                importance_score: 0.0,
                module_group: classify(&function.name),
            };

            match index.get(&function.name) {
                Some(&slot) => nodes[slot] = node,
                None => {
                    index.insert(function.name.clone(), nodes.len());
                    nodes.push(node);
                }
            }

            for callee in &function.calls {
                edges.push(CallEdge {
                    caller: function.name.clone(),
                    callee: callee.clone(),
                });
            }
        }

        // Second pass: inbound edges, only for callees that are nodes
        for edge in &edges {
            if let Some(&slot) = index.get(&edge.callee) {
                nodes[slot].called_by.push(edge.caller.clone());
            }
        }

        for node in &mut nodes {
            node.importance_score = Self::importance(node);
        }

        let statistics = Self::statistics(&nodes);

        // Vec::sort_by is stable, so equal scores keep encounter order
        nodes.sort_by(|a, b| {
            b.importance_score
                .partial_cmp(&a.importance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let critical_functions = nodes
            .iter()
            .take(Self::critical_count(nodes.len()))
            .map(|node| node.name.clone())
            .collect();

        let mut modules: BTreeMap<ModuleGroup, Vec<String>> = BTreeMap::new();
        for node in &nodes {
            modules.entry(node.module_group).or_default().push(node.name.clone());
        }

        debug!("Built dependency graph: {} nodes, {} edges", nodes.len(), edges.len());

        DependencyGraph {
            total_functions: nodes.len(),
            total_relationships: edges.len(),
            dependency_nodes: nodes,
            critical_functions,
            modules,
            call_graph: edges,
            statistics,
        }
    }

    /// `2×in + 0.5×out + 0.1×complexity`
    pub fn importance(node: &DependencyNode) -> f64 {
        INBOUND_WEIGHT * node.in_degree() as f64
            + OUTBOUND_WEIGHT * node.out_degree() as f64
            + COMPLEXITY_WEIGHT * node.complexity as f64
    }

    /// Size of the critical subset: ceil(n / 10)
    pub fn critical_count(node_count: usize) -> usize {
        node_count.div_ceil(10)
    }

    fn statistics(nodes: &[DependencyNode]) -> GraphStatistics {
        let avg_complexity = if nodes.is_empty() {
            0.0
        } else {
            nodes.iter().map(|n| n.complexity as f64).sum::<f64>() / nodes.len() as f64
        };

        GraphStatistics {
            max_calls_in: nodes.iter().map(DependencyNode::in_degree).max().unwrap_or(0),
            max_calls_out: nodes.iter().map(DependencyNode::out_degree).max().unwrap_or(0),
            avg_complexity,
        }
    }
}

impl Default for CallGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, calls: &[&str], complexity: u32) -> FunctionRecord {
        FunctionRecord {
            name: name.to_string(),
            signature: format!("int {}(void)", name),
            start_line: 1,
            end_line: 5,
            code: String::new(),
            calls: calls.iter().map(|c| c.to_string()).collect(),
            complexity,
        }
    }

    #[test]
    fn test_inbound_edges_and_scores() {
        let functions = vec![
            record("main", &["parse", "run", "printf_wrapper"], 2),
            record("parse", &["strtok"], 4),
            record("run", &["parse"], 1),
        ];
        let graph = CallGraphBuilder::new().build(&functions);

        let parse = graph.node("parse").unwrap();
        assert_eq!(parse.called_by, vec!["main".to_string(), "run".to_string()]);
        assert!((parse.importance_score - (4.0 + 0.5 + 0.4)).abs() < 1e-9);

        let main = graph.node("main").unwrap();
        assert_eq!(main.in_degree(), 0);
        assert!((main.importance_score - (1.5 + 0.2)).abs() < 1e-9);

        assert_eq!(graph.dependency_nodes[0].name, "parse");
        assert_eq!(graph.total_relationships, 5);
        assert_eq!(graph.resolved_edges().count(), 3);
    }

    #[test]
    fn test_unresolved_callee_creates_no_node() {
        let functions = vec![record("caller", &["memcpy"], 1)];
        let graph = CallGraphBuilder::new().build(&functions);

        assert_eq!(graph.total_functions, 1);
        assert!(graph.node("memcpy").is_none());
        assert_eq!(graph.node("caller").unwrap().out_degree(), 1);
        assert_eq!(graph.get_callers("memcpy"), Vec::<&str>::new());
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let functions = vec![record("b_first", &[], 1), record("a_second", &[], 1), record("c_third", &[], 1)];
        let graph = CallGraphBuilder::new().build(&functions);

        let names: Vec<&str> = graph.dependency_nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["b_first", "a_second", "c_third"]);
    }

    #[test]
    fn test_duplicate_name_overwrites_node() {
        let functions = vec![
            record("dup", &["x1"], 1),
            record("other", &["dup"], 1),
            record("dup", &["x2", "x3"], 7),
        ];
        let graph = CallGraphBuilder::new().build(&functions);

        assert_eq!(graph.total_functions, 2);
        let dup = graph.node("dup").unwrap();
        assert_eq!(dup.calls, vec!["x2".to_string(), "x3".to_string()]);
        assert_eq!(dup.complexity, 7);
        // edges from both records survive
        assert_eq!(graph.total_relationships, 4);
    }

    #[test]
    fn test_critical_count_and_modules() {
        let names = [
            "modbus_read", "tcp_send", "rtu_open", "ctx_init", "get_reg",
            "worker", "a1", "a2", "a3", "a4", "a5",
        ];
        let functions: Vec<FunctionRecord> = names.iter().map(|n| record(n, &[], 1)).collect();
        let graph = CallGraphBuilder::new().build(&functions);

        assert_eq!(graph.critical_functions.len(), 2);
        assert_eq!(graph.modules[&ModuleGroup::Modbus], vec!["modbus_read".to_string()]);
        assert_eq!(graph.modules[&ModuleGroup::Core].len(), 6);
        assert_eq!(CallGraphBuilder::critical_count(0), 0);
        assert_eq!(CallGraphBuilder::critical_count(1), 1);
        assert_eq!(CallGraphBuilder::critical_count(10), 1);
    }

    #[test]
    fn test_empty_graph_statistics() {
        let graph = CallGraphBuilder::new().build(std::iter::empty());
        assert!(graph.is_empty());
        assert!(graph.critical_functions.is_empty());
        assert_eq!(graph.statistics.avg_complexity, 0.0);
        assert_eq!(graph.statistics.max_calls_in, 0);
    }

    #[test]
    fn test_statistics() {
        let functions = vec![record("a", &["b", "c"], 2), record("b", &["c"], 4), record("c", &[], 6)];
        let graph = CallGraphBuilder::new().build(&functions);

        assert_eq!(graph.statistics.max_calls_in, 2);
        assert_eq!(graph.statistics.max_calls_out, 2);
        assert!((graph.statistics.avg_complexity - 4.0).abs() < 1e-9);
    }
}
