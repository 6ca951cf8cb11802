//! Central mapping memory: reusable skip rules and manual mappings.
//!
//! The document has a global section and per-table overrides keyed by
//! `<object>_<variant>` (see [`table_key`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Drop a source field from matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRule {
    pub source_field: String,
    #[serde(default)]
    pub source_description: String,
    #[serde(default = "default_skip")]
    pub skip: bool,
    #[serde(default)]
    pub comment: String,
}

fn default_skip() -> bool {
    true
}

/// Pin a source field to a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualMapping {
    pub source_field: String,
    #[serde(default)]
    pub source_description: String,
    pub target: String,
    #[serde(default)]
    pub target_description: String,
    #[serde(default)]
    pub comment: String,
}

/// Rules that apply to a single migration object/variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRules {
    #[serde(default)]
    pub skip_fields: Vec<SkipRule>,
    #[serde(default)]
    pub manual_mappings: Vec<ManualMapping>,
}

/// The whole central-memory document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentralMemory {
    /// Extra synonym groups: term -> equivalent terms.
    #[serde(default)]
    pub synonyms: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub global_skip_fields: Vec<SkipRule>,
    #[serde(default)]
    pub global_manual_mappings: Vec<ManualMapping>,
    #[serde(default)]
    pub table_specific: BTreeMap<String, TableRules>,
}

impl CentralMemory {
    pub fn table_rules(&self, table: &str) -> Option<&TableRules> {
        self.table_specific.get(table)
    }

    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
            && self.global_skip_fields.is_empty()
            && self.global_manual_mappings.is_empty()
            && self.table_specific.is_empty()
    }
}

/// Key of a table-specific section, e.g. `m140_bnka`.
pub fn table_key(object: &str, variant: &str) -> String {
    format!("{}_{}", object.trim(), variant.trim())
}
