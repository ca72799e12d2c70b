// src/core/inspector.rs
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use super::security::Severity;

/// What a function name suggests it is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurposeHint {
    Initialization,
    ResourceRelease,
    DataRetrieval,
    DataUpdate,
    NetworkIo,
    ModbusProtocol,
    TcpNetworking,
    RtuSerial,
}

impl PurposeHint {
    pub fn description(&self) -> &'static str {
        match self {
            PurposeHint::Initialization => "initialization",
            PurposeHint::ResourceRelease => "resource release",
            PurposeHint::DataRetrieval => "data retrieval",
            PurposeHint::DataUpdate => "data update",
            PurposeHint::NetworkIo => "network I/O",
            PurposeHint::ModbusProtocol => "Modbus protocol",
            PurposeHint::TcpNetworking => "TCP networking",
            PurposeHint::RtuSerial => "RTU serial",
        }
    }
}

/// Name keywords per hint, in reporting order. Unlike module grouping every
/// matching hint is kept, not just the first.
pub const PURPOSE_RULES: &[(&[&str], PurposeHint)] = &[
    (&["init", "initialize", "setup", "create"], PurposeHint::Initialization),
    (&["free", "destroy", "cleanup", "close"], PurposeHint::ResourceRelease),
    (&["get", "read", "fetch"], PurposeHint::DataRetrieval),
    (&["set", "write", "store"], PurposeHint::DataUpdate),
    (&["send", "recv", "transmit"], PurposeHint::NetworkIo),
    (&["modbus"], PurposeHint::ModbusProtocol),
    (&["tcp"], PurposeHint::TcpNetworking),
    (&["rtu"], PurposeHint::RtuSerial),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorHandlingCue {
    /// `return -1` or `return NULL`
    ErrorReturnValue,
    Errno,
    NullCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityConcern {
    UnsafeStringFunction,
    PossibleMemoryLeak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    VeryHigh,
    High,
    Medium,
    Low,
}

impl ComplexityLevel {
    /// Tier by non-blank line count
    pub fn from_line_count(lines: usize) -> Self {
        if lines > 100 {
            ComplexityLevel::VeryHigh
        } else if lines > 50 {
            ComplexityLevel::High
        } else if lines > 20 {
            ComplexityLevel::Medium
        } else {
            ComplexityLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl Reliability {
    pub fn from_cue_count(cues: usize) -> Self {
        match cues {
            0 => Reliability::NeedsImprovement,
            1 => Reliability::Fair,
            2 => Reliability::Good,
            _ => Reliability::Excellent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityIndicators {
    pub loops: usize,
    pub conditions: usize,
    pub function_calls: usize,
    /// Non-blank lines
    pub line_count: usize,
    /// Count of `{`
    pub nested_blocks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionAssessment {
    pub estimated_purpose: String,
    pub complexity_level: ComplexityLevel,
    pub reliability: Reliability,
    pub security_risk: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionInsight {
    pub function_name: String,
    pub complexity_indicators: ComplexityIndicators,
    pub purpose_hints: Vec<PurposeHint>,
    pub error_handling: Vec<ErrorHandlingCue>,
    pub security_concerns: Vec<SecurityConcern>,
    pub assessment: FunctionAssessment,
}

/// Single-function deep dive: shape metrics, naming hints, error handling
pub struct FunctionInspector {
    loop_regex: Regex,
    condition_regex: Regex,
    call_regex: Regex,
    null_check_regex: Regex,
    unsafe_string_regex: Regex,
    malloc_regex: Regex,
}

impl FunctionInspector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            loop_regex: Regex::new(r"\b(?:for|while|do)\b")?,
            condition_regex: Regex::new(r"\b(?:if|else|switch)\b")?,
            call_regex: Regex::new(r"\w+\s*\(")?,
            null_check_regex: Regex::new(r"\bif\s*\([^)]*==\s*NULL\)")?,
            unsafe_string_regex: Regex::new(r"\b(?:strcpy|strcat|sprintf|gets)\b")?,
            malloc_regex: Regex::new(r"\bmalloc\b")?,
        })
    }

    pub fn inspect(&self, code: &str, name: &str) -> FunctionInsight {
        let complexity_indicators = ComplexityIndicators {
            loops: self.loop_regex.find_iter(code).count(),
            conditions: self.condition_regex.find_iter(code).count(),
            function_calls: self.call_regex.find_iter(code).count(),
            line_count: code.split('\n').filter(|line| !line.trim().is_empty()).count(),
            nested_blocks: code.matches('{').count(),
        };

        let purpose_hints = Self::purpose_hints(name);
        let error_handling = self.error_handling(code);
        let security_concerns = self.security_concerns(code);

        let estimated_purpose = if purpose_hints.is_empty() {
            "general processing".to_string()
        } else {
            purpose_hints
                .iter()
                .map(PurposeHint::description)
                .collect::<Vec<_>>()
                .join(" | ")
        };

        let security_risk = match security_concerns.len() {
            0 => Severity::Low,
            1 => Severity::Medium,
            _ => Severity::High,
        };

        let assessment = FunctionAssessment {
            estimated_purpose,
            complexity_level: ComplexityLevel::from_line_count(complexity_indicators.line_count),
            reliability: Reliability::from_cue_count(error_handling.len()),
            security_risk,
        };

        FunctionInsight {
            function_name: name.to_string(),
            complexity_indicators,
            purpose_hints,
            error_handling,
            security_concerns,
            assessment,
        }
    }

    /// Every hint whose keywords appear in the lowercased name, in [`PURPOSE_RULES`] order
    pub fn purpose_hints(name: &str) -> Vec<PurposeHint> {
        let lowered = name.to_lowercase();

        PURPOSE_RULES
            .iter()
            .filter(|(keywords, _)| keywords.iter().any(|keyword| lowered.contains(keyword)))
            .map(|(_, hint)| *hint)
            .collect()
    }

    fn error_handling(&self, code: &str) -> Vec<ErrorHandlingCue> {
        let mut cues = Vec::new();
        if code.contains("return -1") || code.contains("return NULL") {
            cues.push(ErrorHandlingCue::ErrorReturnValue);
        }
        if code.contains("errno") {
            cues.push(ErrorHandlingCue::Errno);
        }
        if self.null_check_regex.is_match(code) {
            cues.push(ErrorHandlingCue::NullCheck);
        }
        cues
    }

    fn security_concerns(&self, code: &str) -> Vec<SecurityConcern> {
        let mut concerns = Vec::new();
        if self.unsafe_string_regex.is_match(code) {
            concerns.push(SecurityConcern::UnsafeStringFunction);
        }
        if self.malloc_regex.is_match(code) && !code.contains("free") {
            concerns.push(SecurityConcern::PossibleMemoryLeak);
        }
        concerns
    }
}
