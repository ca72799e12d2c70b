use std::collections::BTreeMap;

use proptest::prelude::*;
use reverse_code_analyzer::core::{
    sanitize_identifier, CallEdge, CallGraphBuilder, Chunker, DiagramDialect, DiagramRenderer,
    FunctionExtractor, FunctionRecord,
};

fn record(name: String, start_line: usize, span: usize, calls: Vec<String>) -> FunctionRecord {
    FunctionRecord {
        signature: format!("int {}(void)", name),
        name,
        start_line,
        end_line: start_line + span,
        code: String::new(),
        calls,
        complexity: 1,
    }
}

// ── Chunking: bound respected, order preserved ───────────────────────────

proptest! {
    #[test]
    fn chunks_respect_bound_and_preserve_order(
        spans in prop::collection::vec(0usize..80, 0..40),
        max in 1usize..200
    ) {
        let functions: Vec<FunctionRecord> = spans
            .iter()
            .enumerate()
            .map(|(i, span)| record(format!("f{i}"), i * 100 + 1, *span, Vec::new()))
            .collect();
        let expected: Vec<String> = functions.iter().map(|f| f.name.clone()).collect();

        let chunks = Chunker::new().chunk(functions, max);

        for (index, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.id, index);
            prop_assert!(!chunk.functions.is_empty());
            prop_assert_eq!(chunk.size, chunk.functions.iter().map(|f| f.line_span()).sum::<usize>());
            prop_assert!(
                chunk.size <= max || chunk.functions.len() == 1,
                "chunk {} has size {} over bound {} with {} functions",
                index, chunk.size, max, chunk.functions.len()
            );
        }

        let flattened: Vec<String> = chunks
            .iter()
            .flat_map(|c| c.functions.iter().map(|f| f.name.clone()))
            .collect();
        prop_assert_eq!(flattened, expected);
    }
}

// ── Call graph: inbound edges mirror resolvable outbound ones ────────────

proptest! {
    #[test]
    fn inbound_total_equals_resolved_edges(
        call_targets in prop::collection::vec(prop::collection::vec(0usize..30, 0..6), 1..20)
    ) {
        let count = call_targets.len();
        // indices past the function count name external symbols
        let functions: Vec<FunctionRecord> = call_targets
            .iter()
            .enumerate()
            .map(|(i, targets)| {
                let mut calls: Vec<String> = targets.iter().map(|t| format!("f{t}")).collect();
                calls.sort();
                calls.dedup();
                record(format!("f{i}"), 1, 3, calls)
            })
            .collect();

        let graph = CallGraphBuilder::new().build(&functions);

        let inbound: usize = graph.dependency_nodes.iter().map(|n| n.in_degree()).sum();
        prop_assert_eq!(inbound, graph.resolved_edges().count());

        // external callees never become nodes
        prop_assert_eq!(graph.total_functions, count);
        prop_assert_eq!(graph.total_relationships, functions.iter().map(|f| f.calls.len()).sum::<usize>());

        let critical = graph.critical_functions.len();
        prop_assert!(critical >= 1 && critical <= count.div_ceil(10));

        let scores: Vec<f64> = graph.dependency_nodes.iter().map(|n| n.importance_score).collect();
        prop_assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
}

// ── Diagrams: deterministic, identifiers sanitized ───────────────────────

/// Node identifiers from flowchart declarations/edges and graph edges
fn rendered_identifiers(chart: &str) -> Vec<String> {
    let mut ids = Vec::new();
    for line in chart.lines().skip(1) {
        for side in line.trim_start().split(" --> ") {
            let id = side.split('[').next().unwrap_or_default();
            ids.push(id.to_string());
        }
    }
    ids
}

proptest! {
    #[test]
    fn diagram_rendering_is_idempotent(
        pairs in prop::collection::vec(("[a-z_:.<>-]{0,10}", "[a-z_:.<>-]{0,10}"), 0..30),
        max_nodes in 0usize..40
    ) {
        let edges: Vec<CallEdge> = pairs
            .into_iter()
            .map(|(caller, callee)| CallEdge { caller, callee })
            .collect();
        let renderer = DiagramRenderer::new();
        let modules = BTreeMap::new();

        for dialect in [DiagramDialect::Flowchart, DiagramDialect::Graph] {
            let first = renderer.render(&edges, &modules, dialect, max_nodes);
            let second = renderer.render(&edges, &modules, dialect, max_nodes);
            prop_assert_eq!(&first, &second);

            for id in rendered_identifiers(&first) {
                prop_assert!(!id.is_empty(), "empty identifier in {:?}", first);
                prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
            }
        }

        let graph = renderer.render(&edges, &modules, DiagramDialect::Graph, max_nodes);
        prop_assert_eq!(graph.lines().count(), 1 + edges.len().min(max_nodes));
    }

    #[test]
    fn sanitized_identifiers_use_safe_charset(name in "\\PC{0,24}") {
        let id = sanitize_identifier(&name);
        prop_assert_eq!(id.chars().count(), name.chars().count().max(1));
        prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }
}

// ── Extraction: spans equal brace-block line counts ──────────────────────

proptest! {
    #[test]
    fn extracted_spans_match_generated_bodies(
        bodies in prop::collection::vec(0usize..12, 1..10)
    ) {
        let mut source = String::new();
        for (i, body_lines) in bodies.iter().enumerate() {
            source.push_str(&format!("int generated_{i}(int x)\n{{\n"));
            for _ in 0..*body_lines {
                source.push_str("    x = x + 1;\n");
            }
            source.push_str("    return x;\n}\n\n");
        }

        let functions = FunctionExtractor::new().unwrap().extract(&source);
        prop_assert_eq!(functions.len(), bodies.len());

        for (function, body_lines) in functions.iter().zip(&bodies) {
            // `{`, body, return, `}`
            prop_assert_eq!(function.line_span(), body_lines + 3);
            prop_assert_eq!(function.complexity, 1);
            prop_assert!(function.calls.is_empty());
        }
    }
}
