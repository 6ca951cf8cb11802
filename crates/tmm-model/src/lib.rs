//! Typed records shared by the field-matching engine and its callers.
//!
//! Source and target field lists come in, match decisions and aggregate
//! statistics go out. Nothing here performs I/O.

pub mod confidence;
pub mod decision;
pub mod error;
pub mod field;
pub mod options;
pub mod rules;
pub mod statistics;

pub use confidence::{ConfidenceLevel, ConfidenceThresholds};
pub use decision::{
    CENTRAL_CONFIDENCE, EXACT_CONFIDENCE, EXACT_NAME_ONLY_CONFIDENCE, MatchAlgorithm,
    MatchCandidate, MatchDecision, MatchStatus, MatchType, SYNONYM_CONFIDENCE, Suggestion,
};
pub use error::{ConfigurationError, MatchError, ValidationError};
pub use field::{SourceField, TargetField};
pub use options::{MatchOptions, ScoreWeights};
pub use rules::{CentralMemory, ManualMapping, SkipRule, TableRules, table_key};
pub use statistics::MatchStatistics;

/// Result alias for engine entry points.
pub type Result<T> = std::result::Result<T, MatchError>;
