//! Aggregate statistics over a decision list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::decision::{MatchDecision, MatchStatus, MatchType};
use crate::field::TargetField;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStatistics {
    pub total_sources: usize,
    pub total_targets: usize,
    pub mapped: usize,
    pub skipped: usize,
    pub unmapped: usize,
    /// Primary decisions per match type. Audit-only decisions are excluded.
    pub by_match_type: BTreeMap<MatchType, usize>,
    pub audit_matches: usize,
    /// `mapped / total_sources * 100`, 0 for an empty batch.
    pub coverage_percentage: f64,
    /// Targets no `mapped` decision points at, in input order.
    pub unmapped_targets: Vec<String>,
    pub unmapped_mandatory_targets: Vec<String>,
}

impl MatchStatistics {
    pub fn from_decisions(decisions: &[MatchDecision], targets: &[TargetField]) -> Self {
        let mut by_match_type: BTreeMap<MatchType, usize> =
            MatchType::ALL.iter().map(|kind| (*kind, 0)).collect();
        let mut mapped = 0;
        let mut skipped = 0;
        let mut unmapped = 0;
        let mut audit_matches = 0;
        for decision in decisions {
            match decision.status {
                MatchStatus::Mapped => mapped += 1,
                MatchStatus::Skipped => skipped += 1,
                MatchStatus::Unmapped => unmapped += 1,
                MatchStatus::AuditOnly => {
                    audit_matches += 1;
                    continue;
                }
            }
            *by_match_type.entry(decision.match_type).or_insert(0) += 1;
        }
        let total_sources = mapped + skipped + unmapped;
        let coverage_percentage = if total_sources == 0 {
            0.0
        } else {
            mapped as f64 / total_sources as f64 * 100.0
        };

        let mapped_targets: std::collections::BTreeSet<&str> = decisions
            .iter()
            .filter(|d| d.is_mapped())
            .filter_map(|d| d.target_name.as_deref())
            .collect();
        let unmapped_target_fields: Vec<&TargetField> = targets
            .iter()
            .filter(|t| !mapped_targets.contains(t.name.as_str()))
            .collect();

        Self {
            total_sources,
            total_targets: targets.len(),
            mapped,
            skipped,
            unmapped,
            by_match_type,
            audit_matches,
            coverage_percentage,
            unmapped_targets: unmapped_target_fields
                .iter()
                .map(|t| t.name.clone())
                .collect(),
            unmapped_mandatory_targets: unmapped_target_fields
                .iter()
                .filter(|t| t.mandatory)
                .map(|t| t.name.clone())
                .collect(),
        }
    }

    pub fn count(&self, match_type: MatchType) -> usize {
        self.by_match_type.get(&match_type).copied().unwrap_or(0)
    }

    /// Coverage as a fraction in [0, 1].
    pub fn coverage(&self) -> f64 {
        self.coverage_percentage / 100.0
    }
}
