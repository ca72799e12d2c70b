// src/core/refactor.rs
use std::collections::BTreeSet;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use super::complexity::ComplexityScorer;

const LONG_FUNCTION_LINES: usize = 50;
const COMPLEX_FUNCTION_SCORE: u32 = 15;
const SCORE_PENALTY_PER_SUGGESTION: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefactorSuggestion {
    TooLong { lines: usize },
    TooComplex { score: u32 },
    ShortIdentifiers { names: Vec<String> },
    MissingErrorHandling,
    MagicNumbers { values: Vec<String> },
}

impl RefactorSuggestion {
    pub fn message(&self) -> String {
        match self {
            RefactorSuggestion::TooLong { lines } => {
                format!("Function is {} lines long; split it into smaller functions", lines)
            }
            RefactorSuggestion::TooComplex { score } => {
                format!("Complexity score is {}; simplify the control flow", score)
            }
            RefactorSuggestion::ShortIdentifiers { names } => {
                format!("Use descriptive names instead of: {}", names.join(", "))
            }
            RefactorSuggestion::MissingErrorHandling => {
                "Add error handling for failure paths".to_string()
            }
            RefactorSuggestion::MagicNumbers { values } => {
                format!("Replace magic numbers with named constants: {}", values.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefactorPriority {
    High,
    Medium,
    Low,
}

impl RefactorPriority {
    pub fn from_suggestion_count(count: usize) -> Self {
        if count > 3 {
            RefactorPriority::High
        } else if count > 1 {
            RefactorPriority::Medium
        } else {
            RefactorPriority::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefactorAdvice {
    pub function_name: String,
    pub suggestions: Vec<RefactorSuggestion>,
    /// 100 minus 15 per suggestion, floored at zero
    pub improvement_score: u32,
    pub priority: RefactorPriority,
}

pub struct RefactorAdvisor {
    scorer: ComplexityScorer,
    short_identifier_regex: Regex,
    magic_number_regex: Regex,
}

impl RefactorAdvisor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            scorer: ComplexityScorer::new()?,
            short_identifier_regex: Regex::new(r"\b[a-z]\b")?,
            magic_number_regex: Regex::new(r"\b\d{2,}\b")?,
        })
    }

    pub fn advise(&self, code: &str, name: &str) -> RefactorAdvice {
        let mut suggestions = Vec::new();

        let lines = code.split('\n').count();
        if lines > LONG_FUNCTION_LINES {
            suggestions.push(RefactorSuggestion::TooLong { lines });
        }

        let score = self.scorer.score(code);
        if score > COMPLEX_FUNCTION_SCORE {
            suggestions.push(RefactorSuggestion::TooComplex { score });
        }

        let names = Self::distinct(&self.short_identifier_regex, code);
        if !names.is_empty() {
            suggestions.push(RefactorSuggestion::ShortIdentifiers { names });
        }

        if !code.contains("return -1") && !code.contains("return NULL") {
            suggestions.push(RefactorSuggestion::MissingErrorHandling);
        }

        let values = Self::distinct(&self.magic_number_regex, code);
        if !values.is_empty() {
            suggestions.push(RefactorSuggestion::MagicNumbers { values });
        }

        let penalty = SCORE_PENALTY_PER_SUGGESTION.saturating_mul(suggestions.len() as u32);

        RefactorAdvice {
            function_name: name.to_string(),
            improvement_score: 100u32.saturating_sub(penalty),
            priority: RefactorPriority::from_suggestion_count(suggestions.len()),
            suggestions,
        }
    }

    fn distinct(regex: &Regex, code: &str) -> Vec<String> {
        regex
            .find_iter(code)
            .map(|m| m.as_str().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
