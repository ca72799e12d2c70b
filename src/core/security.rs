// src/core/security.rs
use std::collections::BTreeMap;
use std::fmt;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Weight of one finding in the aggregate score
    pub fn weight(&self) -> usize {
        match self {
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityCategory {
    BufferOverflow,
    MemoryLeak,
    CommandInjection,
    SensitiveData,
    ArrayBounds,
    WeakRandom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "high risk")]
    High,
    #[serde(rename = "medium risk")]
    Medium,
    #[serde(rename = "low risk")]
    Low,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        if score < 60 {
            RiskLevel::High
        } else if score < 80 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Static description of a rule before its patterns are compiled
#[derive(Debug, Clone, Copy)]
pub struct RuleDef {
    pub pattern: &'static str,
    /// Rejects a match when this also appears between the match and the next `;`
    pub unless_before_semicolon: Option<&'static str>,
    pub severity: Severity,
    pub category: SecurityCategory,
    pub description: &'static str,
    pub suggestion: &'static str,
}

/// Built-in rule table, in scan order
pub const DEFAULT_RULES: &[RuleDef] = &[
    RuleDef {
        pattern: r"\b(strcpy|strcat|sprintf|gets)\s*\(",
        unless_before_semicolon: None,
        severity: Severity::High,
        category: SecurityCategory::BufferOverflow,
        description: "Unbounded string function may overflow its destination buffer",
        suggestion: "Use the bounded variants: strncpy, strncat, snprintf, fgets",
    },
    RuleDef {
        pattern: r"\bmalloc\s*\([^)]+\)",
        unless_before_semicolon: Some("free"),
        severity: Severity::Medium,
        category: SecurityCategory::MemoryLeak,
        description: "Memory allocated with malloc may never be released",
        suggestion: "Make sure every malloc has a matching free on all paths",
    },
    RuleDef {
        pattern: r"\bsystem\s*\(",
        unless_before_semicolon: None,
        severity: Severity::High,
        category: SecurityCategory::CommandInjection,
        description: "system() passes its argument to a shell and allows command injection",
        suggestion: "Use the exec family (execv and friends) with an explicit argument vector",
    },
    RuleDef {
        pattern: r"password|passwd|pwd",
        unless_before_semicolon: None,
        severity: Severity::Medium,
        category: SecurityCategory::SensitiveData,
        description: "Possible hard-coded password or other sensitive value",
        suggestion: "Keep credentials out of source; load them from protected storage",
    },
    RuleDef {
        pattern: r"\[\s*\w+\s*\]\s*=",
        unless_before_semicolon: Some("sizeof"),
        severity: Severity::Medium,
        category: SecurityCategory::ArrayBounds,
        description: "Indexed array write without a visible bounds check",
        suggestion: "Check the index against the array length before writing",
    },
    RuleDef {
        pattern: r"rand\s*\(\)",
        unless_before_semicolon: None,
        severity: Severity::Low,
        category: SecurityCategory::WeakRandom,
        description: "rand() is not a cryptographically secure random source",
        suggestion: "Use a CSPRNG such as getrandom() or /dev/urandom",
    },
];

const AUDIT_RECOMMENDATIONS: &[&str] = &[
    "Fix high severity findings first",
    "Establish a security review step for code changes",
    "Run static analysis tools regularly",
    "Train developers in secure C programming practices",
];

/// A compiled, case-insensitive rule
#[derive(Debug, Clone)]
pub struct SecurityRule {
    pattern: Regex,
    exclusion: Option<Regex>,
    pub severity: Severity,
    pub category: SecurityCategory,
    pub description: String,
    pub suggestion: String,
}

impl SecurityRule {
    pub fn compile(def: &RuleDef) -> Result<Self> {
        let exclusion = match def.unless_before_semicolon {
            Some(pattern) => Some(Self::case_insensitive(pattern)?),
            None => None,
        };

        Ok(Self {
            pattern: Self::case_insensitive(def.pattern)?,
            exclusion,
            severity: def.severity,
            category: def.category,
            description: def.description.to_string(),
            suggestion: def.suggestion.to_string(),
        })
    }

    /// True when some occurrence of the pattern survives the exclusion
    pub fn matches(&self, line: &str) -> bool {
        let Some(exclusion) = &self.exclusion else {
            return self.pattern.is_match(line);
        };

        self.pattern.find_iter(line).any(|m| {
            let rest = &line[m.end()..];
            let statement_tail = match rest.find(';') {
                Some(pos) => &rest[..pos],
                None => rest,
            };
            !exclusion.is_match(statement_tail)
        })
    }

    fn case_insensitive(pattern: &str) -> Result<Regex> {
        Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
    }
}

/// One rule match on one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityFinding {
    pub line_number: usize,
    pub line_content: String,
    pub severity: Severity,
    pub category: SecurityCategory,
    pub description: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySummary {
    /// All findings, including those beyond the listed ones
    pub total_findings: usize,
    pub severity_distribution: BTreeMap<Severity, usize>,
    pub category_distribution: BTreeMap<SecurityCategory, usize>,
    pub security_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall_risk: RiskLevel,
    /// High severity findings, capped like the main list
    pub critical_findings: Vec<SecurityFinding>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityReport {
    pub findings: Vec<SecurityFinding>,
    pub summary: SecuritySummary,
    pub risk_assessment: RiskAssessment,
}

/// Line-by-line matcher over an ordered, immutable rule table
pub struct SecurityRuleEngine {
    rules: Vec<SecurityRule>,
    max_findings: usize,
}

impl SecurityRuleEngine {
    /// Engine with the built-in rule table
    pub fn new(max_findings: usize) -> Result<Self> {
        let rules = DEFAULT_RULES
            .iter()
            .map(SecurityRule::compile)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::with_rules(rules, max_findings))
    }

    pub fn with_rules(rules: Vec<SecurityRule>, max_findings: usize) -> Self {
        Self { rules, max_findings }
    }

    pub fn rules(&self) -> &[SecurityRule] {
        &self.rules
    }

    /// Test every line against every rule once, in rule order
    pub fn audit(&self, source: &str) -> SecurityReport {
        let mut findings = Vec::new();

        for (index, line) in source.split('\n').enumerate() {
            for rule in &self.rules {
                if rule.matches(line) {
                    findings.push(SecurityFinding {
                        line_number: index + 1,
                        line_content: line.trim().to_string(),
                        severity: rule.severity,
                        category: rule.category,
                        description: rule.description.clone(),
                        suggestion: rule.suggestion.clone(),
                    });
                }
            }
        }

        let mut severity_distribution: BTreeMap<Severity, usize> = BTreeMap::new();
        let mut category_distribution: BTreeMap<SecurityCategory, usize> = BTreeMap::new();
        for finding in &findings {
            *severity_distribution.entry(finding.severity).or_insert(0) += 1;
            *category_distribution.entry(finding.category).or_insert(0) += 1;
        }

        let count = |severity: Severity| severity_distribution.get(&severity).copied().unwrap_or(0);
        let security_score = Self::security_score(
            count(Severity::High),
            count(Severity::Medium),
            count(Severity::Low),
        );

        debug!("Security audit: {} findings, score {}", findings.len(), security_score);

        let critical_findings = findings
            .iter()
            .filter(|f| f.severity == Severity::High)
            .take(self.max_findings)
            .cloned()
            .collect();

        let summary = SecuritySummary {
            total_findings: findings.len(),
            severity_distribution,
            category_distribution,
            security_score,
        };

        findings.truncate(self.max_findings);

        SecurityReport {
            findings,
            summary,
            risk_assessment: RiskAssessment {
                overall_risk: RiskLevel::from_score(security_score),
                critical_findings,
                recommendations: AUDIT_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    /// `max(0, 100 - 2 × (3·high + 2·medium + 1·low))`
    pub fn security_score(high: usize, medium: usize, low: usize) -> u32 {
        let weight = high * Severity::High.weight()
            + medium * Severity::Medium.weight()
            + low * Severity::Low.weight();
        100usize.saturating_sub(weight.saturating_mul(2)) as u32
    }
}
