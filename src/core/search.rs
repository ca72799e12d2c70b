// src/core/search.rs
use std::fmt;
use std::str::FromStr;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};

/// Substrings that mark a function-name hit as a definition rather than a call
const DEFINITION_CUES: &[&str] = &["int ", "void ", "static ", "char ", "uint"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Function,
    Variable,
    /// Raw substring match
    Literal,
    Regex,
}

impl FromStr for SearchKind {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "function" => Ok(SearchKind::Function),
            "variable" => Ok(SearchKind::Variable),
            "literal" | "string" => Ok(SearchKind::Literal),
            "regex" => Ok(SearchKind::Regex),
            other => Err(AnalyzerError::InvalidInput(format!("unknown search kind: {}", other))),
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchKind::Function => "function",
            SearchKind::Variable => "variable",
            SearchKind::Literal => "literal",
            SearchKind::Regex => "regex",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Definition,
    Call,
    VariableUsage,
    StringLiteral,
    RegexMatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// 1-based
    pub line_number: usize,
    pub line_content: String,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub pattern: String,
    pub kind: SearchKind,
    /// Every matching line, including those cut from `results`
    pub total_matches: usize,
    pub results: Vec<SearchHit>,
    pub total_lines: usize,
}

/// Line-oriented search over source text
pub struct CodeSearcher {
    max_results: usize,
}

impl CodeSearcher {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }

    pub fn search(&self, text: &str, pattern: &str, kind: SearchKind) -> Result<SearchReport> {
        let matcher: Box<dyn Fn(&str) -> Option<MatchType>> = match kind {
            SearchKind::Function => {
                let regex = Regex::new(&format!(r"\b{}\s*\(", regex::escape(pattern)))?;
                Box::new(move |line: &str| {
                    regex.is_match(line).then(|| {
                        if DEFINITION_CUES.iter().any(|cue| line.contains(cue)) {
                            MatchType::Definition
                        } else {
                            MatchType::Call
                        }
                    })
                })
            }
            SearchKind::Variable => {
                let regex = Regex::new(&format!(r"\b{}\b", regex::escape(pattern)))?;
                Box::new(move |line: &str| regex.is_match(line).then_some(MatchType::VariableUsage))
            }
            SearchKind::Literal => {
                let needle = pattern.to_string();
                Box::new(move |line: &str| line.contains(needle.as_str()).then_some(MatchType::StringLiteral))
            }
            SearchKind::Regex => {
                let regex = Regex::new(pattern).map_err(|e| AnalyzerError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
                Box::new(move |line: &str| regex.is_match(line).then_some(MatchType::RegexMatch))
            }
        };

        let lines: Vec<&str> = text.split('\n').collect();
        let hits: Vec<SearchHit> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, &line)| {
                matcher(line).map(|match_type| SearchHit {
                    line_number: i + 1,
                    line_content: line.trim().to_string(),
                    match_type,
                })
            })
            .collect();

        let total_matches = hits.len();
        let results = hits.into_iter().take(self.max_results).collect();

        Ok(SearchReport {
            pattern: pattern.to_string(),
            kind,
            total_matches,
            results,
            total_lines: lines.len(),
        })
    }
}
