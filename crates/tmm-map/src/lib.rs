#![deny(unsafe_code)]

//! Field-matching engine.
//!
//! Phases run in a fixed order over shrinking pools of sources and targets:
//! central rules, exact, synonym, fuzzy, unmapped finalize, then an audit pass
//! that never changes the mapping.

pub mod central;
pub mod engine;
pub mod loader;
pub mod normalize;
pub mod similarity;
pub mod synonyms;

pub use central::{CentralOutcome, ResolvedRules, RuleAction, RuleScope, apply_central_rules};
pub use engine::{MatchEngine, MatchOutcome};
pub use loader::{LoadError, OptionsFile, load_central_memory, load_options};
pub use normalize::{normalize, normalize_description, normalize_field_name};
pub use similarity::{Blend, EditDistance, FieldScorer, PrefixWeighted, SimilarityScorer};
pub use synonyms::SynonymTable;
