use reverse_code_analyzer::config::AnalysisConfig;
use reverse_code_analyzer::core::{DiagramDialect, MatchType, ModuleGroup, ReportFormat, SearchKind, Severity};
use reverse_code_analyzer::{Config, Engine};

const DRIVER: &str = r#"#include <stdio.h>
#include <stdlib.h>

typedef struct {
    int slave;
    char *device;
} modbus_ctx;

/* allocate a context */
modbus_ctx* modbus_new_ctx(const char *device)
{
    modbus_ctx *ctx = malloc(sizeof(modbus_ctx));
    if (ctx == NULL) {
        return NULL;
    }
    ctx->device = strdup(device);
    return ctx;
}

int tcp_send_frame(modbus_ctx *ctx, const char *frame)
{
    char buffer[64];
    strcpy(buffer, frame);
    return write_frame(ctx, buffer);
}

int modbus_write_register(modbus_ctx *ctx, int addr, int value)
{
    char frame[16];
    sprintf(frame, "%d:%d", addr, value);
    return tcp_send_frame(ctx, frame);
}

void ctx_free(modbus_ctx *ctx)
{
    free(ctx->device);
    free(ctx);
}

int main(void)
{
    modbus_ctx *ctx = modbus_new_ctx("/dev/ttyS0");
    modbus_write_register(ctx, 1, 42);
    ctx_free(ctx);
    return 0;
}
"#;

fn engine() -> Engine {
    Engine::new(&AnalysisConfig::default()).unwrap()
}

#[test]
fn extracts_every_driver_function() {
    let functions = engine().extract_functions(DRIVER);
    let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();

    assert_eq!(
        names,
        vec!["modbus_new_ctx", "tcp_send_frame", "modbus_write_register", "ctx_free", "main"],
        "unexpected functions: {:?}",
        names
    );

    let new_ctx = &functions[0];
    assert_eq!(new_ctx.start_line, 10);
    assert_eq!(new_ctx.end_line, 18);
    assert_eq!(new_ctx.calls, vec!["malloc".to_string(), "strdup".to_string()]);
    assert_eq!(new_ctx.complexity, 2);
}

#[test]
fn chunk_then_graph_then_diagram() {
    let engine = engine();
    let chunked = engine.chunk(DRIVER, 10);

    assert_eq!(chunked.total_functions, 5);
    assert!(chunked.total_chunks > 1);
    assert_eq!(chunked.content_hash.len(), 64);

    let json = serde_json::to_value(&chunked).unwrap();
    let graph = engine.build_graph_from_json(&json).unwrap();

    assert_eq!(graph.get_callers("tcp_send_frame"), vec!["modbus_write_register"]);
    assert_eq!(graph.get_callers("modbus_new_ctx"), vec!["main"]);
    assert_eq!(graph.modules[&ModuleGroup::Modbus].len(), 2);
    assert_eq!(graph.modules[&ModuleGroup::Network], vec!["tcp_send_frame".to_string()]);
    assert_eq!(graph.modules[&ModuleGroup::Lifecycle], vec!["ctx_free".to_string()]);
    assert_eq!(graph.critical_functions.len(), 1);

    let chart = engine.render_diagram(&graph, DiagramDialect::Flowchart, 20);
    assert!(chart.starts_with("flowchart TD"));
    assert!(chart.contains("    main --> modbus_new_ctx"));

    let mindmap = engine.render_diagram(&graph, DiagramDialect::Mindmap, 20);
    assert!(mindmap.contains("    network\n      tcp_send_frame"));
}

#[test]
fn audit_flags_unbounded_strings_and_leaks() {
    let report = engine().audit_security(DRIVER);

    assert_eq!(report.summary.total_findings, 3);
    assert_eq!(report.summary.severity_distribution[&Severity::High], 2);
    assert_eq!(report.summary.severity_distribution[&Severity::Medium], 1);
    assert_eq!(report.summary.security_score, 100 - 2 * (3 + 3 + 2));
    assert_eq!(report.risk_assessment.critical_findings.len(), 2);
}

#[test]
fn structures_and_search() {
    let engine = engine();

    let structs = engine.extract_structures(DRIVER);
    assert_eq!(structs.summary.total_structures, 1);
    assert_eq!(structs.structures[0].name, "modbus_ctx");
    assert_eq!(structs.structures[0].field_count, 2);

    let hits = engine.search(DRIVER, "tcp_send_frame", SearchKind::Function).unwrap();
    let kinds: Vec<MatchType> = hits.results.iter().map(|h| h.match_type).collect();
    assert_eq!(kinds, vec![MatchType::Definition, MatchType::Call]);
}

#[test]
fn inspect_and_refactor_one_function() {
    let engine = engine();
    let function = engine.find_function(DRIVER, "modbus_new_ctx").unwrap();

    let insight = engine.inspect_function(&function.code, &function.name);
    assert!(!insight.purpose_hints.is_empty());
    assert_eq!(insight.complexity_indicators.conditions, 1);

    let advice = engine.refactor_advice(&function.code, &function.name);
    assert!(advice.improvement_score <= 100);
    assert_eq!(advice.function_name, "modbus_new_ctx");
}

#[test]
fn markdown_report_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reverse-analyzer.toml");

    let mut config = Config::default();
    config.output.report_format = ReportFormat::Markdown;
    config.analysis.max_chunk_size = 40;
    config.save(&path).unwrap();

    let config = Config::load_or_default(Some(&path)).unwrap();
    let engine = Engine::new(&config.analysis).unwrap();

    let graph = engine.graph_for_source(DRIVER);
    let report = engine.report("driver.c", &graph);
    let markdown = engine.render_report(&report, config.output.report_format).unwrap();

    assert!(markdown.starts_with("# Analysis Report: driver.c"));
    assert!(markdown.contains("- Total functions: 5"));
}
