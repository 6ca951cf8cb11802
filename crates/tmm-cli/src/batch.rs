//! TOML batch files: one table's source and target field lists.
//!
//! ```toml
//! object = "m140"
//! variant = "bnka"
//!
//! [[sources]]
//! name = "BANKL"
//! description = "Bank Key"
//!
//! [[targets]]
//! name = "S_BNKA.BANKL"
//! description = "Bank Key"
//! mandatory = true
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tmm_model::{SourceField, TargetField, table_key};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Batch {
    /// Explicit central-memory table key. Wins over `object`/`variant`.
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceField>,
    #[serde(default)]
    pub targets: Vec<TargetField>,
}

impl Batch {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read batch file {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parse batch file {}", path.display()))
    }

    /// The `<object>_<variant>` key for table-scoped central rules, if known.
    pub fn table_key(&self) -> Option<String> {
        if let Some(table) = self.table.as_deref().map(str::trim)
            && !table.is_empty()
        {
            return Some(table.to_string());
        }
        match (self.object.as_deref(), self.variant.as_deref()) {
            (Some(object), Some(variant)) => Some(table_key(object, variant)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_key_prefers_explicit_table() {
        let batch = Batch {
            table: Some("m140_bnka".to_string()),
            object: Some("x".to_string()),
            variant: Some("y".to_string()),
            ..Batch::default()
        };
        assert_eq!(batch.table_key().as_deref(), Some("m140_bnka"));

        let derived = Batch {
            object: Some("m140".to_string()),
            variant: Some("bnka".to_string()),
            ..Batch::default()
        };
        assert_eq!(derived.table_key().as_deref(), Some("m140_bnka"));
        assert_eq!(Batch::default().table_key(), None);
    }

    #[test]
    fn batch_parses_field_lists() {
        let batch: Batch = toml::from_str(
            r#"
object = "m140"
variant = "bnka"

[[sources]]
name = "BANKL"
description = "Bank Key"
data_type = "CHAR"

[[targets]]
name = "S_BNKA.BANKL"
mandatory = true
length = 15
"#,
        )
        .expect("parse batch");
        assert_eq!(batch.sources[0].data_type.as_deref(), Some("CHAR"));
        assert!(batch.targets[0].mandatory);
        assert_eq!(batch.targets[0].length, Some(15));
        assert_eq!(batch.targets[0].description, "");
    }
}
