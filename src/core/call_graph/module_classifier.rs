// src/core/call_graph/module_classifier.rs
use std::fmt;
use serde::{Deserialize, Serialize};

/// Coarse functional grouping derived from function naming conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleGroup {
    Modbus,
    Network,
    Serial,
    Lifecycle,
    DataAccess,
    Core,
}

impl ModuleGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleGroup::Modbus => "modbus",
            ModuleGroup::Network => "network",
            ModuleGroup::Serial => "serial",
            ModuleGroup::Lifecycle => "lifecycle",
            ModuleGroup::DataAccess => "data_access",
            ModuleGroup::Core => "core",
        }
    }
}

impl fmt::Display for ModuleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification ladder, evaluated top to bottom; the first rule with a
/// keyword contained in the lowercased name wins. Protocol families come
/// before lifecycle and accessor names, so `modbus_get_x` is `modbus`.
pub const MODULE_RULES: &[(&[&str], ModuleGroup)] = &[
    (&["modbus"], ModuleGroup::Modbus),
    (&["tcp"], ModuleGroup::Network),
    (&["rtu"], ModuleGroup::Serial),
    (&["init", "free"], ModuleGroup::Lifecycle),
    (&["get", "set"], ModuleGroup::DataAccess),
];

/// Group for names no rule matches
pub const FALLBACK_GROUP: ModuleGroup = ModuleGroup::Core;

/// Classify a function name against [`MODULE_RULES`]
pub fn classify(name: &str) -> ModuleGroup {
    let lowered = name.to_lowercase();

    MODULE_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|(_, group)| *group)
        .unwrap_or(FALLBACK_GROUP)
}
