//! Confidence bands used when reviewing a mapping.

use serde::{Deserialize, Serialize};

/// Confidence level categories for mapping quality assessment.
///
/// - `High`: near-certain, can be used without review
/// - `Medium`: plausible, should be verified
/// - `Low`: weak, requires manual confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "high confidence - likely correct",
            Self::Medium => "medium confidence - should review",
            Self::Low => "low confidence - needs verification",
        }
    }
}

/// Boundaries between confidence levels.
///
/// Below `low` a score has no level at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    /// Minimum confidence for high-quality matches (default: 0.95).
    pub high: f64,
    /// Minimum confidence for medium-quality matches (default: 0.80).
    pub medium: f64,
    /// Minimum confidence to be categorised at all (default: 0.60).
    pub low: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 0.95,
            medium: 0.80,
            low: 0.60,
        }
    }
}

impl ConfidenceThresholds {
    #[must_use]
    pub fn strict() -> Self {
        Self {
            high: 0.98,
            medium: 0.90,
            low: 0.75,
        }
    }

    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            high: 0.90,
            medium: 0.70,
            low: 0.50,
        }
    }

    /// Returns `None` if the score is below the low threshold.
    #[must_use]
    pub fn categorize(&self, confidence: f64) -> Option<ConfidenceLevel> {
        if confidence >= self.high {
            Some(ConfidenceLevel::High)
        } else if confidence >= self.medium {
            Some(ConfidenceLevel::Medium)
        } else if confidence >= self.low {
            Some(ConfidenceLevel::Low)
        } else {
            None
        }
    }
}
