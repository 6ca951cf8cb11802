//! String similarity scorers and the name/description combiner.
//!
//! Two interchangeable algorithms sit behind [`SimilarityScorer`]:
//! normalized Levenshtein ([`EditDistance`]) and Jaro-Winkler
//! ([`PrefixWeighted`]). [`Blend`] mixes any set of scorers by weight and
//! [`FieldScorer`] combines name and description similarity.

use std::fmt;

use rapidfuzz::distance::{jaro_winkler, levenshtein};
use tmm_model::{MatchAlgorithm, MatchCandidate, ScoreWeights, SourceField, TargetField};

use crate::normalize::{normalize_description, normalize_field_name};

/// A normalized similarity in `[0, 1]`.
pub trait SimilarityScorer: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, left: &str, right: &str) -> f64;
}

/// `1 - distance / max(len)` over insert/delete/substitute edits.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditDistance;

impl SimilarityScorer for EditDistance {
    fn name(&self) -> &'static str {
        "levenshtein"
    }

    fn score(&self, left: &str, right: &str) -> f64 {
        match (left.is_empty(), right.is_empty()) {
            (true, true) => 1.0,
            (true, false) | (false, true) => 0.0,
            (false, false) => {
                levenshtein::normalized_similarity(left.chars(), right.chars()).clamp(0.0, 1.0)
            }
        }
    }
}

/// Jaro similarity with the Winkler common-prefix bonus.
///
/// Tolerates transpositions and rewards shared prefixes, which suits short
/// identifier-like names better than plain edit distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixWeighted;

impl SimilarityScorer for PrefixWeighted {
    fn name(&self) -> &'static str {
        "jaro_winkler"
    }

    fn score(&self, left: &str, right: &str) -> f64 {
        match (left.is_empty(), right.is_empty()) {
            (true, true) => 1.0,
            (true, false) | (false, true) => 0.0,
            (false, false) => {
                jaro_winkler::similarity(left.chars(), right.chars()).clamp(0.0, 1.0)
            }
        }
    }
}

/// Weighted mean of several scorers. Weights are normalized by their sum.
#[derive(Debug, Default)]
pub struct Blend {
    members: Vec<(Box<dyn SimilarityScorer>, f64)>,
}

impl Blend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Levenshtein and Jaro-Winkler with the configured sub-weights.
    pub fn from_weights(weights: &ScoreWeights) -> Self {
        Self::new()
            .with(EditDistance, weights.levenshtein)
            .with(PrefixWeighted, weights.jaro_winkler)
    }

    #[must_use]
    pub fn with(mut self, scorer: impl SimilarityScorer + 'static, weight: f64) -> Self {
        if weight > 0.0 {
            self.members.push((Box::new(scorer), weight));
        }
        self
    }

    /// Name of the scorer carrying the most weight, first one on ties.
    pub fn dominant(&self) -> Option<&'static str> {
        let mut best: Option<(&'static str, f64)> = None;
        for (scorer, weight) in &self.members {
            if best.is_none_or(|(_, w)| *weight > w) {
                best = Some((scorer.name(), *weight));
            }
        }
        best.map(|(name, _)| name)
    }
}

impl SimilarityScorer for Blend {
    fn name(&self) -> &'static str {
        "blend"
    }

    fn score(&self, left: &str, right: &str) -> f64 {
        let total: f64 = self.members.iter().map(|(_, weight)| weight).sum();
        if total <= 0.0 {
            return 0.0;
        }
        let sum: f64 = self
            .members
            .iter()
            .map(|(scorer, weight)| scorer.score(left, right) * weight)
            .sum();
        (sum / total).clamp(0.0, 1.0)
    }
}

/// Normalized comparison keys of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKeys {
    /// Compact name key, separators removed.
    pub name: String,
    /// Description key, separators collapsed to single spaces.
    pub description: String,
}

impl FieldKeys {
    pub fn of_source(source: &SourceField) -> Self {
        Self {
            name: normalize_field_name(&source.name),
            description: normalize_description(&source.description),
        }
    }

    /// Targets are compared on their unqualified field part.
    pub fn of_target(target: &TargetField) -> Self {
        Self {
            name: normalize_field_name(target.field_name()),
            description: normalize_description(&target.description),
        }
    }

    /// Description with separators removed, for synonym lookups.
    pub fn compact_description(&self) -> String {
        self.description.replace(' ', "")
    }
}

/// Component scores of one source/target pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairScore {
    pub name: f64,
    pub description: f64,
    pub combined: f64,
}

/// Combines name and description similarity into one score.
///
/// `combined = w_name * name + w_desc * description` with the pair normalized
/// by its sum. When either description is empty, `combined = name`.
#[derive(Debug)]
pub struct FieldScorer {
    blend: Blend,
    name_weight: f64,
    description_weight: f64,
}

impl FieldScorer {
    pub fn new(weights: &ScoreWeights) -> Self {
        Self::with_blend(Blend::from_weights(weights), weights)
    }

    pub fn with_blend(blend: Blend, weights: &ScoreWeights) -> Self {
        Self {
            blend,
            name_weight: weights.name,
            description_weight: weights.description,
        }
    }

    pub fn blend(&self) -> &Blend {
        &self.blend
    }

    /// Blended similarity of two name keys.
    pub fn name_similarity(&self, left: &str, right: &str) -> f64 {
        self.blend.score(left, right)
    }

    pub fn score_keys(&self, source: &FieldKeys, target: &FieldKeys) -> PairScore {
        let name = self.blend.score(&source.name, &target.name);
        if source.description.is_empty() || target.description.is_empty() {
            return PairScore {
                name,
                description: 0.0,
                combined: name,
            };
        }
        let description = self.blend.score(&source.description, &target.description);
        let total = self.name_weight + self.description_weight;
        let combined = if total > 0.0 {
            (self.name_weight * name + self.description_weight * description) / total
        } else {
            name
        };
        PairScore {
            name,
            description,
            combined: combined.clamp(0.0, 1.0),
        }
    }

    /// Scores a pair from scratch as a fuzzy candidate.
    pub fn candidate<'a>(
        &self,
        source: &'a SourceField,
        target: &'a TargetField,
    ) -> MatchCandidate<'a> {
        let score = self.score_keys(&FieldKeys::of_source(source), &FieldKeys::of_target(target));
        MatchCandidate {
            source,
            target,
            name_score: score.name,
            description_score: score.description,
            combined_score: score.combined,
            algorithm: MatchAlgorithm::Fuzzy,
        }
    }
}
