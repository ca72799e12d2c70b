// src/core/complexity.rs
use regex::Regex;

use crate::error::Result;

/// Keyword-counting complexity heuristic.
///
/// Purely textual: keywords inside string literals or comments are counted
/// too. This is not a cyclomatic number computed over a control-flow graph.
pub struct ComplexityScorer {
    control_keyword_regex: Regex,
    boolean_operator_regex: Regex,
}

impl ComplexityScorer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            control_keyword_regex: Regex::new(r"\b(?:if|else|while|for|switch|case|do)\b")?,
            boolean_operator_regex: Regex::new(r"&&|\|\|")?,
        })
    }

    /// Score a code span; the result is never below 1
    pub fn score(&self, code: &str) -> u32 {
        let control = self.control_keyword_regex.find_iter(code).count();
        let gotos = code.matches("goto").count();
        let boolean = self.boolean_operator_regex.find_iter(code).count();

        (1 + control + gotos * 2 + boolean) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_value_for_straight_line_code() {
        let scorer = ComplexityScorer::new().unwrap();
        assert_eq!(scorer.score("return a + b;"), 1);
        assert_eq!(scorer.score(""), 1);
    }

    #[test]
    fn test_control_keywords_increase_score() {
        let scorer = ComplexityScorer::new().unwrap();
        let code = r#"
if (condition) {
    for (int i = 0; i < 10; i++) {
        if (i % 2 == 0) {
            continue;
        }
    }
}
"#;
        // two ifs and one for
        assert_eq!(scorer.score(code), 4);
        assert!(scorer.score(code) > 1);
    }

    #[test]
    fn test_goto_counts_double() {
        let scorer = ComplexityScorer::new().unwrap();
        assert_eq!(scorer.score("goto fail;"), 3);
        assert_eq!(scorer.score("goto a; goto b;"), 5);
    }

    #[test]
    fn test_boolean_operators_and_whole_words() {
        let scorer = ComplexityScorer::new().unwrap();
        assert_eq!(scorer.score("x = a && b || c;"), 3);
        // identifiers that merely contain keywords do not count
        assert_eq!(scorer.score("format(); done(); iffy = doit;"), 1);
        assert_eq!(scorer.score("switch (x) { case 1: break; case 2: break; }"), 4);
    }
}
