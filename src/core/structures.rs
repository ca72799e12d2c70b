// src/core/structures.rs
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Structures with more fields than this are listed as complex
const COMPLEX_STRUCT_FIELDS: usize = 5;

/// Rough per-field size used for `estimated_size`
const ESTIMATED_FIELD_BYTES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructField {
    #[serde(rename = "type")]
    pub field_type: String,
    pub name: String,
    /// The trimmed source line the field was read from
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureRecord {
    pub name: String,
    pub fields: Vec<StructField>,
    pub field_count: usize,
    pub estimated_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumRecord {
    pub name: String,
    pub values: Vec<String>,
    pub value_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedefRecord {
    pub name: String,
    pub base_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataModelComplexity {
    High,
    Medium,
    Low,
}

impl DataModelComplexity {
    pub fn from_structure_count(count: usize) -> Self {
        if count > 10 {
            DataModelComplexity::High
        } else if count > 3 {
            DataModelComplexity::Medium
        } else {
            DataModelComplexity::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureSummary {
    pub total_structures: usize,
    pub total_enums: usize,
    pub total_typedefs: usize,
    /// Names of structures with more than five fields
    pub complex_structures: Vec<String>,
    pub most_complex_struct: Option<String>,
    pub data_model_complexity: DataModelComplexity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureReport {
    pub structures: Vec<StructureRecord>,
    pub enums: Vec<EnumRecord>,
    pub typedefs: Vec<TypedefRecord>,
    pub summary: StructureSummary,
}

/// Regex capture of struct, enum and plain typedef declarations.
///
/// Bodies are matched up to the first `}`, so nested aggregates are cut
/// short; lines that do not look like fields are skipped silently.
pub struct DataStructureExtractor {
    struct_regex: Regex,
    enum_regex: Regex,
    field_regex: Regex,
    typedef_regex: Regex,
}

impl DataStructureExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            struct_regex: Regex::new(r"typedef\s+struct\s*\{([^}]+)\}\s*(\w+);?|struct\s+(\w+)\s*\{([^}]+)\}")?,
            enum_regex: Regex::new(r"typedef\s+enum\s*\{([^}]+)\}\s*(\w+);?|enum\s+(\w+)\s*\{([^}]+)\}")?,
            field_regex: Regex::new(r"(\w+)(\s*\*+\s*|\s+)(\w+)\s*(?:\[[^\]]*\])?\s*;")?,
            typedef_regex: Regex::new(r"typedef\s+([^;]+)\s+(\w+)\s*;")?,
        })
    }

    pub fn extract(&self, source: &str) -> StructureReport {
        let structures = self.extract_structures(source);
        let enums = self.extract_enums(source);
        let typedefs = self.extract_typedefs(source);

        let complex_structures = structures
            .iter()
            .filter(|s| s.field_count > COMPLEX_STRUCT_FIELDS)
            .map(|s| s.name.clone())
            .collect();

        // first structure wins on ties
        let most_complex_struct = structures
            .iter()
            .rev()
            .max_by_key(|s| s.field_count)
            .map(|s| s.name.clone());

        let summary = StructureSummary {
            total_structures: structures.len(),
            total_enums: enums.len(),
            total_typedefs: typedefs.len(),
            complex_structures,
            most_complex_struct,
            data_model_complexity: DataModelComplexity::from_structure_count(structures.len()),
        };

        StructureReport {
            structures,
            enums,
            typedefs,
            summary,
        }
    }

    fn extract_structures(&self, source: &str) -> Vec<StructureRecord> {
        self.struct_regex
            .captures_iter(source)
            .filter_map(|caps| {
                let (name, body) = match (caps.get(2), caps.get(1)) {
                    (Some(name), Some(body)) => (name, body),
                    _ => (caps.get(3)?, caps.get(4)?),
                };

                let fields: Vec<StructField> = body
                    .as_str()
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with("//") && !line.starts_with("/*"))
                    .filter_map(|line| self.parse_field(line))
                    .collect();

                Some(StructureRecord {
                    name: name.as_str().to_string(),
                    field_count: fields.len(),
                    estimated_size: fields.len() * ESTIMATED_FIELD_BYTES,
                    fields,
                })
            })
            .collect()
    }

    fn parse_field(&self, line: &str) -> Option<StructField> {
        let caps = self.field_regex.captures(line)?;
        let base = caps.get(1)?.as_str();
        let pointer_depth = caps.get(2)?.as_str().matches('*').count();

        let field_type = if pointer_depth > 0 {
            format!("{} {}", base, "*".repeat(pointer_depth))
        } else {
            base.to_string()
        };

        Some(StructField {
            field_type,
            name: caps.get(3)?.as_str().to_string(),
            line: line.to_string(),
        })
    }

    fn extract_enums(&self, source: &str) -> Vec<EnumRecord> {
        self.enum_regex
            .captures_iter(source)
            .filter_map(|caps| {
                let (name, body) = match (caps.get(2), caps.get(1)) {
                    (Some(name), Some(body)) => (name, body),
                    _ => (caps.get(3)?, caps.get(4)?),
                };

                let values: Vec<String> = body
                    .as_str()
                    .lines()
                    .map(|line| line.trim().trim_end_matches(','))
                    .filter(|line| !line.is_empty() && !line.starts_with("//"))
                    .map(str::to_string)
                    .collect();

                Some(EnumRecord {
                    name: name.as_str().to_string(),
                    value_count: values.len(),
                    values,
                })
            })
            .collect()
    }

    fn extract_typedefs(&self, source: &str) -> Vec<TypedefRecord> {
        self.typedef_regex
            .captures_iter(source)
            .filter_map(|caps| {
                let base_type = caps.get(1)?.as_str().trim();
                if base_type.contains("struct") || base_type.contains("enum") {
                    return None;
                }

                Some(TypedefRecord {
                    name: caps.get(2)?.as_str().to_string(),
                    base_type: base_type.to_string(),
                })
            })
            .collect()
    }
}
