// src/core/call_graph/mod.rs
//! Call-graph reconstruction over extracted C functions.
//!
//! Functions become nodes keyed by name; every extracted call becomes an
//! edge, whether or not the callee was itself extracted. Nodes are ranked by
//! an importance score and bucketed into coarse module groups by name.

mod call_graph;
mod module_classifier;

pub use call_graph::{
    CallEdge, CallGraphBuilder, DependencyGraph, DependencyNode, GraphStatistics,
    COMPLEXITY_WEIGHT, INBOUND_WEIGHT, OUTBOUND_WEIGHT,
};
pub use module_classifier::{classify, ModuleGroup, FALLBACK_GROUP, MODULE_RULES};
