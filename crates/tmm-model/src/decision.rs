//! Match candidates and the decisions the engine emits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::{SourceField, TargetField};

/// Confidence of an exact name match whose descriptions also agree.
pub const EXACT_CONFIDENCE: f64 = 1.0;
/// Confidence of an exact name match without description agreement.
pub const EXACT_NAME_ONLY_CONFIDENCE: f64 = 0.95;
/// Fixed confidence for a synonym match, whichever synonym matched.
pub const SYNONYM_CONFIDENCE: f64 = 0.85;
/// Confidence of a central-memory skip or manual mapping.
pub const CENTRAL_CONFIDENCE: f64 = 1.0;

/// Disposition of a source field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Mapped,
    Skipped,
    Unmapped,
    /// Additional transparency record; never the primary decision.
    AuditOnly,
}

impl MatchStatus {
    /// True for the statuses that make up a source field's primary decision.
    pub fn is_primary(self) -> bool {
        !matches!(self, Self::AuditOnly)
    }
}

/// How a decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Synonym,
    Fuzzy,
    CentralManual,
    CentralSkip,
    None,
}

impl MatchType {
    pub const ALL: [MatchType; 6] = [
        Self::Exact,
        Self::Synonym,
        Self::Fuzzy,
        Self::CentralManual,
        Self::CentralSkip,
        Self::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Synonym => "synonym",
            Self::Fuzzy => "fuzzy",
            Self::CentralManual => "central_manual",
            Self::CentralSkip => "central_skip",
            Self::None => "none",
        }
    }

    /// Lowest confidence a `mapped` decision of this type may carry.
    pub fn minimum_confidence(self, fuzzy_threshold: f64) -> f64 {
        match self {
            Self::Exact => EXACT_NAME_ONLY_CONFIDENCE,
            Self::Synonym => SYNONYM_CONFIDENCE,
            Self::Fuzzy => fuzzy_threshold,
            Self::CentralManual | Self::CentralSkip => CENTRAL_CONFIDENCE,
            Self::None => 0.0,
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which automated strategy produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchAlgorithm {
    Exact,
    Synonym,
    Fuzzy,
}

impl From<MatchAlgorithm> for MatchType {
    fn from(algorithm: MatchAlgorithm) -> Self {
        match algorithm {
            MatchAlgorithm::Exact => Self::Exact,
            MatchAlgorithm::Synonym => Self::Synonym,
            MatchAlgorithm::Fuzzy => Self::Fuzzy,
        }
    }
}

/// A scored source/target pairing. Transient; produced by a scorer.
#[derive(Debug, Clone, Copy)]
pub struct MatchCandidate<'a> {
    pub source: &'a SourceField,
    pub target: &'a TargetField,
    pub name_score: f64,
    pub description_score: f64,
    pub combined_score: f64,
    pub algorithm: MatchAlgorithm,
}

/// A ranked alternative target kept alongside a fuzzy decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub target_name: String,
    pub score: f64,
}

/// The engine's verdict for one source field (or one audit observation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDecision {
    pub source_name: String,
    pub target_name: Option<String>,
    pub status: MatchStatus,
    pub confidence: f64,
    pub match_type: MatchType,
    /// Human-readable reason. Never empty.
    pub rationale: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Suggestion>,
}

impl MatchDecision {
    /// A `mapped` decision from an automated candidate.
    pub fn from_candidate(candidate: &MatchCandidate<'_>, rationale: impl Into<String>) -> Self {
        Self {
            source_name: candidate.source.name.clone(),
            target_name: Some(candidate.target.name.clone()),
            status: MatchStatus::Mapped,
            confidence: candidate.combined_score,
            match_type: candidate.algorithm.into(),
            rationale: non_empty(rationale.into(), "automated match"),
            source_description: candidate.source.description.clone(),
            target_description: Some(candidate.target.description.clone()),
            alternatives: Vec::new(),
        }
    }

    pub fn central_manual(
        source: &SourceField,
        target: &TargetField,
        comment: &str,
    ) -> Self {
        Self {
            source_name: source.name.clone(),
            target_name: Some(target.name.clone()),
            status: MatchStatus::Mapped,
            confidence: CENTRAL_CONFIDENCE,
            match_type: MatchType::CentralManual,
            rationale: rule_rationale("manual mapping", comment),
            source_description: source.description.clone(),
            target_description: Some(target.description.clone()),
            alternatives: Vec::new(),
        }
    }

    pub fn central_skip(source: &SourceField, comment: &str) -> Self {
        Self {
            source_name: source.name.clone(),
            target_name: None,
            status: MatchStatus::Skipped,
            confidence: CENTRAL_CONFIDENCE,
            match_type: MatchType::CentralSkip,
            rationale: rule_rationale("skip rule", comment),
            source_description: source.description.clone(),
            target_description: None,
            alternatives: Vec::new(),
        }
    }

    pub fn unmapped(source: &SourceField) -> Self {
        Self {
            source_name: source.name.clone(),
            target_name: None,
            status: MatchStatus::Unmapped,
            confidence: 0.0,
            match_type: MatchType::None,
            rationale: "No suitable target found".to_string(),
            source_description: source.description.clone(),
            target_description: None,
            alternatives: Vec::new(),
        }
    }

    /// A fuzzy correspondence to a target that is already taken.
    pub fn audit(candidate: &MatchCandidate<'_>) -> Self {
        Self {
            source_name: candidate.source.name.clone(),
            target_name: Some(candidate.target.name.clone()),
            status: MatchStatus::AuditOnly,
            confidence: candidate.combined_score,
            match_type: MatchType::Fuzzy,
            rationale: format!(
                "Fuzzy match to already mapped target (audit, similarity: {:.2})",
                candidate.combined_score
            ),
            source_description: candidate.source.description.clone(),
            target_description: Some(candidate.target.description.clone()),
            alternatives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_alternatives(mut self, alternatives: Vec<Suggestion>) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn is_mapped(&self) -> bool {
        self.status == MatchStatus::Mapped
    }
}

fn rule_rationale(kind: &str, comment: &str) -> String {
    let comment = comment.trim();
    if comment.is_empty() {
        format!("Central memory {kind}")
    } else {
        format!("Central memory {kind}: {comment}")
    }
}

fn non_empty(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
