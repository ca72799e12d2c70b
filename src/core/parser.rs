// src/core/parser.rs
use std::collections::BTreeSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use super::complexity::ComplexityScorer;

/// Identifiers followed by `(` that are never recorded as calls
pub const CALL_EXCLUSIONS: &[&str] = &["if", "while", "for", "switch", "sizeof", "return", "printf"];

/// One C function definition located in the source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    /// Function name
    pub name: String,

    /// Declarator line as written, trimmed
    #[serde(default)]
    pub signature: String,

    /// 1-based line of the signature
    #[serde(default)]
    pub start_line: usize,

    /// 1-based line holding the closing brace
    #[serde(default)]
    pub end_line: usize,

    /// Verbatim text from the signature through the closing brace
    #[serde(default)]
    pub code: String,

    /// Distinct identifiers invoked from the body.
    /// Only the brace block is scanned, so the declarator is never a self-call.
    #[serde(default)]
    pub calls: Vec<String>,

    /// Heuristic complexity score
    #[serde(default = "default_complexity")]
    pub complexity: u32,
}

fn default_complexity() -> u32 {
    1
}

impl FunctionRecord {
    /// Number of lines from the opening brace line through the closing one
    pub fn line_span(&self) -> usize {
        self.end_line.saturating_sub(self.start_line)
    }
}

/// Line-oriented function locator: signature pattern plus brace matching.
///
/// Comment skipping only looks at line prefixes; a block comment spanning
/// several lines is not tracked, so a signature-shaped line inside one can
/// still be picked up.
pub struct FunctionExtractor {
    signature_regex: Regex,
    fallback_signature_regex: Regex,
    call_regex: Regex,
    scorer: ComplexityScorer,
}

impl FunctionExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            signature_regex: Regex::new(concat!(
                r"^\s*(?:(static|extern|inline)\s+)?",
                r"(?:(const|volatile)\s+)?",
                r"(\w+(?:\s*\*)*)\s+",
                r"(?:__cdecl\s+|__stdcall\s+|__fastcall\s+)?",
                r"(\w+)\s*",
                r"\(([^)]*)\)\s*$",
            ))?,
            fallback_signature_regex: Regex::new(r"^\s*(?:\w+\s+)*(\w+)\s*\([^)]*\)\s*$")?,
            call_regex: Regex::new(r"\b(\w+)\s*\(")?,
            scorer: ComplexityScorer::new()?,
        })
    }

    /// Extract every function definition in source order.
    ///
    /// Never fails: candidates whose braces do not balance before the end of
    /// input are dropped and scanning resumes on the next line.
    pub fn extract(&self, source: &str) -> Vec<FunctionRecord> {
        let lines: Vec<&str> = source.split('\n').collect();
        let mut functions = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].trim();

            if Self::is_skippable(line) {
                i += 1;
                continue;
            }

            let opens_block = lines.get(i + 1).map_or(false, |next| next.trim() == "{");

            let Some(name) = self.match_signature(line, opens_block) else {
                i += 1;
                continue;
            };

            if !opens_block {
                i += 1;
                continue;
            }

            match Self::find_block_end(&lines, i + 1) {
                Some(close_index) => {
                    let code = lines[i..=close_index].join("\n");
                    // metrics come from the brace block so the declarator never counts as a self-call
                    let body = lines[i + 1..=close_index].join("\n");
                    let calls = self.extract_calls(&body);
                    let complexity = self.scorer.score(&body);

                    functions.push(FunctionRecord {
                        name,
                        signature: line.to_string(),
                        start_line: i + 1,
                        end_line: close_index + 1,
                        code,
                        calls,
                        complexity,
                    });

                    i = close_index + 1;
                }
                None => {
                    debug!("Unbalanced braces after '{}' (line {}), skipping candidate", name, i + 1);
                    i += 1;
                }
            }
        }

        debug!("Extracted {} functions from {} lines", functions.len(), lines.len());
        functions
    }

    /// Collect distinct call targets from a code span
    pub fn extract_calls(&self, code: &str) -> Vec<String> {
        let calls: BTreeSet<&str> = self.call_regex
            .captures_iter(code)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str())
            .filter(|name| Self::is_call_candidate(name))
            .collect();

        calls.into_iter().map(str::to_string).collect()
    }

    fn match_signature(&self, line: &str, opens_block: bool) -> Option<String> {
        if let Some(caps) = self.signature_regex.captures(line) {
            return caps.get(4).map(|m| m.as_str().to_string());
        }

        if opens_block {
            if let Some(caps) = self.fallback_signature_regex.captures(line) {
                return caps.get(1).map(|m| m.as_str().to_string());
            }
        }

        None
    }

    /// Index of the line where brace depth, counted from `open_index`, returns to zero
    fn find_block_end(lines: &[&str], open_index: usize) -> Option<usize> {
        let mut depth: i64 = 0;

        for (j, line) in lines.iter().enumerate().skip(open_index) {
            for ch in line.chars() {
                match ch {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(j);
                        }
                    }
                    _ => {}
                }
            }
        }

        None
    }

    fn is_skippable(line: &str) -> bool {
        line.is_empty() || line.starts_with("//") || line.starts_with("/*") || line.starts_with('#')
    }

    fn is_call_candidate(name: &str) -> bool {
        !CALL_EXCLUSIONS.contains(&name)
            && !name.chars().all(|c| c.is_ascii_digit())
            && name.chars().count() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> FunctionExtractor {
        FunctionExtractor::new().unwrap()
    }

    #[test]
    fn test_extract_simple_function() {
        let code = "int add(int a, int b)\n{\n    return a + b;\n}\n";
        let functions = extractor().extract(code);

        assert_eq!(functions.len(), 1);
        let add = &functions[0];
        assert_eq!(add.name, "add");
        assert_eq!(add.signature, "int add(int a, int b)");
        assert_eq!(add.start_line, 1);
        assert_eq!(add.end_line, 4);
        assert_eq!(add.line_span(), 3);
        assert!(add.calls.is_empty());
        assert_eq!(add.complexity, 1);
    }

    #[test]
    fn test_extract_multiple_functions_in_order() {
        let code = r#"
#include <stdio.h>

static int helper(int x)
{
    if (x > 0) {
        return x;
    }
    return -x;
}

// entry point
int main(void)
{
    int v = helper(3);
    log_value(v);
    printf("%d\n", v);
    return 0;
}
"#;
        let functions = extractor().extract(code);
        let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["helper", "main"]);

        let main = &functions[1];
        assert_eq!(main.calls, vec!["helper".to_string(), "log_value".to_string()]);
        assert_eq!(functions[0].complexity, 2);
    }

    #[test]
    fn test_calling_convention_and_pointer_return() {
        let code = "char * __stdcall get_name(void *ctx)\n{\n    return lookup(ctx);\n}\n";
        let functions = extractor().extract(code);
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "get_name");
        assert_eq!(functions[0].calls, vec!["lookup".to_string()]);
    }

    #[test]
    fn test_fallback_signature_requires_brace_line() {
        // three leading words defeat the precise pattern but not the fallback
        let code = "unsigned long int counter_value(void)\n{\n  return 1;\n}\n";
        let functions = extractor().extract(code);
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "counter_value");
    }

    #[test]
    fn test_same_line_brace_is_not_a_definition() {
        let code = "int inline_brace(void) {\n    return 0;\n}\n";
        assert!(extractor().extract(code).is_empty());
    }

    #[test]
    fn test_unbalanced_block_is_skipped() {
        let code = "int broken(void)\n{\n    if (x) {\n        return 1;\n\nint fine(void)\n{\n    return 2;\n}\n";
        let functions = extractor().extract(code);
        // `broken` never closes; `fine` is still found by scanning on
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "fine");
    }

    #[test]
    fn test_span_seals_mid_line() {
        let code = "void f(void)\n{\n  a();\n} int trailing;\nvoid g(void)\n{\n}\n";
        let functions = extractor().extract(code);
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].end_line, 4);
        assert_eq!(functions[1].name, "g");
        assert_eq!(functions[1].start_line, 5);
    }

    #[test]
    fn test_only_real_recursion_is_a_self_call() {
        let code = "int fact(int n)\n{\n    return n ? n * fact(n - 1) : 1;\n}\nint id(int n)\n{\n    return n;\n}\n";
        let functions = extractor().extract(code);
        assert_eq!(functions[0].calls, vec!["fact".to_string()]);
        assert_eq!(functions[1].signature, "int id(int n)");
        assert!(functions[1].calls.is_empty());
    }

    #[test]
    fn test_extract_function_calls() {
        let calls = extractor().extract_calls("int result = function_a(x);\nfunction_b(y, z);\n");
        assert!(calls.contains(&"function_a".to_string()));
        assert!(calls.contains(&"function_b".to_string()));
    }

    #[test]
    fn test_call_exclusions() {
        let code = "if (a) while (b) for (;;) switch (c) sizeof(int); return (x); printf(\"\"); f(1); 123(); g2 (z); g2(z);";
        let calls = extractor().extract_calls(code);
        assert_eq!(calls, vec!["g2".to_string()]);
    }

    #[test]
    fn test_comment_and_preprocessor_lines_skipped() {
        let code = "// int fake(void)\n{\n}\n#define M(x) (x)\n/* void hidden(void)\n{\n}\n";
        // the `{` lines that follow comments never start a definition
        assert!(extractor().extract(code).is_empty());
    }
}
