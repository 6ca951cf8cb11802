//! Source and target field records.
//!
//! Both are immutable during matching. Target occupancy is tracked by the
//! engine, never on the record itself.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A column of the legacy/source system that needs a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceField {
    /// Raw identifier, e.g. `IBAN_RULE`.
    pub name: String,
    /// Human label. May be empty.
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_value: Option<String>,
}

impl SourceField {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = required_name(name.into(), "source")?;
        Ok(Self {
            name,
            description: description.into().trim().to_string(),
            data_type: None,
            sample_value: None,
        })
    }

    #[must_use]
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    #[must_use]
    pub fn with_sample_value(mut self, sample: impl Into<String>) -> Self {
        self.sample_value = Some(sample.into());
        self
    }
}

/// A destination schema field, e.g. a field of an SAP migration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetField {
    /// Fully qualified name, e.g. `S_BNKA.BANKL`.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub key_field: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

impl TargetField {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = required_name(name.into(), "target")?;
        Ok(Self {
            name,
            description: description.into().trim().to_string(),
            mandatory: false,
            key_field: false,
            data_type: None,
            length: None,
        })
    }

    #[must_use]
    pub fn mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    #[must_use]
    pub fn key_field(mut self, key_field: bool) -> Self {
        self.key_field = key_field;
        self
    }

    #[must_use]
    pub fn with_data_type(mut self, data_type: impl Into<String>, length: Option<u32>) -> Self {
        self.data_type = Some(data_type.into());
        self.length = length;
        self
    }

    /// Structure part of a qualified name (`S_BNKA` for `S_BNKA.BANKL`).
    pub fn table(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(table, _)| table)
    }

    /// Unqualified field part (`BANKL` for `S_BNKA.BANKL`).
    pub fn field_name(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(_, field)| field)
    }
}

fn required_name(raw: String, kind: &'static str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName { kind });
    }
    Ok(trimmed.to_string())
}
