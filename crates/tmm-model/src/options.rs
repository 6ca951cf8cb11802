//! Configuration scalars for the matching engine.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Weights for the score combiner.
///
/// `name`/`description` split the combined score between the two field
/// attributes; `levenshtein`/`jaro_winkler` blend the two string algorithms
/// inside each attribute score. Each pair is normalised by its sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub name: f64,
    pub description: f64,
    pub levenshtein: f64,
    pub jaro_winkler: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            name: 0.7,
            description: 0.3,
            levenshtein: 0.5,
            jaro_winkler: 0.5,
        }
    }
}

impl ScoreWeights {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (name, value) in [
            ("name", self.name),
            ("description", self.description),
            ("levenshtein", self.levenshtein),
            ("jaro_winkler", self.jaro_winkler),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidWeight { name, value });
            }
        }
        if self.name + self.description <= 0.0 {
            return Err(ConfigurationError::ZeroWeightSum {
                pair: "name/description",
            });
        }
        if self.levenshtein + self.jaro_winkler <= 0.0 {
            return Err(ConfigurationError::ZeroWeightSum {
                pair: "levenshtein/jaro_winkler",
            });
        }
        Ok(())
    }
}

/// Options controlling a matching run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Minimum combined score for a fuzzy candidate (inclusive).
    pub fuzzy_threshold: f64,
    /// Cap on ranked alternatives and audit decisions per source.
    pub max_suggestions: usize,
    /// Run the fuzzy and audit phases.
    pub fuzzy_enabled: bool,
    pub weights: ScoreWeights,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.6,
            max_suggestions: 3,
            fuzzy_enabled: true,
            weights: ScoreWeights::default(),
        }
    }
}

impl MatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    #[must_use]
    pub fn with_fuzzy(mut self, enabled: bool) -> Self {
        self.fuzzy_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(ConfigurationError::InvalidThreshold(self.fuzzy_threshold));
        }
        self.weights.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = MatchOptions::default();
        assert_eq!(options.fuzzy_threshold, 0.6);
        assert_eq!(options.max_suggestions, 3);
        assert!(options.fuzzy_enabled);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let options = MatchOptions::default().with_threshold(1.2);
        assert_eq!(
            options.validate(),
            Err(ConfigurationError::InvalidThreshold(1.2))
        );
        assert!(MatchOptions::default().with_threshold(f64::NAN).validate().is_err());
    }

    #[test]
    fn zero_weight_pair_is_rejected() {
        let weights = ScoreWeights {
            levenshtein: 0.0,
            jaro_winkler: 0.0,
            ..ScoreWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigurationError::ZeroWeightSum { .. })
        ));
        let negative = ScoreWeights {
            name: -0.1,
            ..ScoreWeights::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(ConfigurationError::InvalidWeight { name: "name", .. })
        ));
    }
}
