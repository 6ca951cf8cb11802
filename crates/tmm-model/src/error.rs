use thiserror::Error;

/// A malformed input record. Raised before any matching starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{kind} field name is blank")]
    BlankName { kind: &'static str },

    #[error("source field #{index} has no name")]
    MissingSourceName { index: usize },

    #[error("target field #{index} has no name")]
    MissingTargetName { index: usize },

    #[error("source field '{name}' appears twice (#{first} and #{second})")]
    DuplicateSource {
        name: String,
        first: usize,
        second: usize,
    },

    #[error("target field '{name}' appears twice (#{first} and #{second})")]
    DuplicateTarget {
        name: String,
        first: usize,
        second: usize,
    },
}

/// Contradictory central-memory rules or unusable matching options.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error(
        "manual mappings for '{first_source}' and '{second_source}' both claim target '{target}'"
    )]
    ConflictingManualTarget {
        target: String,
        first_source: String,
        second_source: String,
    },

    #[error("manual mapping for '{source_field}' names unknown target '{target}'")]
    UnknownManualTarget {
        source_field: String,
        target: String,
    },

    #[error(
        "manual mapping for '{source_field}' names target '{target}', which matches {}",
        .candidates.join(", ")
    )]
    AmbiguousManualTarget {
        source_field: String,
        target: String,
        candidates: Vec<String>,
    },

    #[error("fuzzy threshold must be between 0.0 and 1.0, got {0}")]
    InvalidThreshold(f64),

    #[error("weight '{name}' must be a finite, non-negative number, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("weights for {pair} sum to zero")]
    ZeroWeightSum { pair: &'static str },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
}
