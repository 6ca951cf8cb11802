//! The phase state machine.
//!
//! A run owns one [`Pools`] value holding the ordinals of sources and targets
//! still in play. Each phase takes from the pools in input order and writes
//! one primary decision per source; the audit pass only reads them.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use tmm_model::{
    CentralMemory, ConfidenceLevel, ConfidenceThresholds, ConfigurationError, EXACT_CONFIDENCE,
    EXACT_NAME_ONLY_CONFIDENCE, MatchAlgorithm, MatchCandidate, MatchDecision, MatchOptions,
    MatchStatistics, SYNONYM_CONFIDENCE, SourceField, Suggestion, TargetField, ValidationError,
};
use tracing::{debug, info, info_span, trace};

use crate::central::{ResolvedRules, apply_central_rules};
use crate::similarity::{FieldKeys, FieldScorer, PairScore, SimilarityScorer};
use crate::synonyms::SynonymTable;

/// Decisions of one run plus their aggregate statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Primary decisions in source order, then audit-only decisions.
    pub decisions: Vec<MatchDecision>,
    pub statistics: MatchStatistics,
}

impl MatchOutcome {
    /// Exactly one decision per source field.
    pub fn primary_decisions(&self) -> impl Iterator<Item = &MatchDecision> {
        self.decisions.iter().filter(|d| d.status.is_primary())
    }

    pub fn audit_decisions(&self) -> impl Iterator<Item = &MatchDecision> {
        self.decisions.iter().filter(|d| !d.status.is_primary())
    }

    pub fn mapped(&self) -> impl Iterator<Item = &MatchDecision> {
        self.decisions.iter().filter(|d| d.is_mapped())
    }

    /// The primary decision for `source_name`.
    pub fn decision_for(&self, source_name: &str) -> Option<&MatchDecision> {
        self.primary_decisions().find(|d| d.source_name == source_name)
    }

    /// Counts mapped decisions per confidence level, with default thresholds.
    #[must_use]
    pub fn count_by_level(&self) -> BTreeMap<ConfidenceLevel, usize> {
        self.count_by_level_with(&ConfidenceThresholds::default())
    }

    #[must_use]
    pub fn count_by_level_with(
        &self,
        thresholds: &ConfidenceThresholds,
    ) -> BTreeMap<ConfidenceLevel, usize> {
        let mut counts = BTreeMap::new();
        for decision in self.mapped() {
            if let Some(level) = thresholds.categorize(decision.confidence) {
                *counts.entry(level).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Mapped decisions at or above `min_level`.
    #[must_use]
    pub fn filter_by_level(&self, min_level: ConfidenceLevel) -> Vec<&MatchDecision> {
        self.filter_by_level_with(min_level, &ConfidenceThresholds::default())
    }

    #[must_use]
    pub fn filter_by_level_with(
        &self,
        min_level: ConfidenceLevel,
        thresholds: &ConfidenceThresholds,
    ) -> Vec<&MatchDecision> {
        self.mapped()
            .filter(|d| {
                thresholds
                    .categorize(d.confidence)
                    .is_some_and(|level| level >= min_level)
            })
            .collect()
    }

    #[must_use]
    pub fn group_by_level(&self) -> BTreeMap<ConfidenceLevel, Vec<&MatchDecision>> {
        self.group_by_level_with(&ConfidenceThresholds::default())
    }

    #[must_use]
    pub fn group_by_level_with(
        &self,
        thresholds: &ConfidenceThresholds,
    ) -> BTreeMap<ConfidenceLevel, Vec<&MatchDecision>> {
        let mut groups: BTreeMap<ConfidenceLevel, Vec<&MatchDecision>> = BTreeMap::new();
        for decision in self.mapped() {
            if let Some(level) = thresholds.categorize(decision.confidence) {
                groups.entry(level).or_default().push(decision);
            }
        }
        groups
    }

    #[must_use]
    pub fn min_confidence(&self) -> Option<f64> {
        self.mapped()
            .map(|d| d.confidence)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    }

    #[must_use]
    pub fn max_confidence(&self) -> Option<f64> {
        self.mapped()
            .map(|d| d.confidence)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    }

    #[must_use]
    pub fn mean_confidence(&self) -> Option<f64> {
        let (count, sum) = self
            .mapped()
            .fold((0usize, 0.0), |(count, sum), d| (count + 1, sum + d.confidence));
        (count > 0).then(|| sum / count as f64)
    }

    /// True when there is at least one mapping and every mapping is high confidence.
    #[must_use]
    pub fn all_high_confidence(&self) -> bool {
        let thresholds = ConfidenceThresholds::default();
        let mut mapped = self.mapped().peekable();
        mapped.peek().is_some()
            && mapped.all(|d| thresholds.categorize(d.confidence) == Some(ConfidenceLevel::High))
    }
}

/// Engine for mapping source fields onto target schema fields.
///
/// One-to-one: each source gets exactly one primary decision and each target
/// is the subject of at most one `mapped` decision.
///
/// ```ignore
/// use tmm_map::{MatchEngine, ResolvedRules};
/// use tmm_model::MatchOptions;
///
/// let engine = MatchEngine::new(MatchOptions::default())?;
/// let outcome = engine.run(&sources, &targets, &ResolvedRules::empty())?;
/// ```
#[derive(Debug)]
pub struct MatchEngine {
    options: MatchOptions,
    synonyms: SynonymTable,
    scorer: FieldScorer,
}

impl MatchEngine {
    /// Builds an engine with the built-in synonym vocabulary.
    pub fn new(options: MatchOptions) -> Result<Self, ConfigurationError> {
        options.validate()?;
        let scorer = FieldScorer::new(&options.weights);
        Ok(Self {
            options,
            synonyms: SynonymTable::builtin(),
            scorer,
        })
    }

    #[must_use]
    pub fn with_synonyms(mut self, synonyms: SynonymTable) -> Self {
        self.synonyms = synonyms;
        self
    }

    /// Adds the custom synonym groups of a central-memory document.
    #[must_use]
    pub fn with_central_memory(mut self, memory: &CentralMemory) -> Self {
        self.synonyms.extend_from(&memory.synonyms);
        self
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    /// Runs every phase without central rules.
    pub fn match_fields(
        &self,
        sources: &[SourceField],
        targets: &[TargetField],
    ) -> tmm_model::Result<MatchOutcome> {
        self.run(sources, targets, &ResolvedRules::empty())
    }

    /// Validates the batch, then runs central rules, exact, synonym, fuzzy,
    /// unmapped finalize and the audit pass.
    pub fn run(
        &self,
        sources: &[SourceField],
        targets: &[TargetField],
        rules: &ResolvedRules,
    ) -> tmm_model::Result<MatchOutcome> {
        let span = info_span!("match_fields", table = rules.table().unwrap_or("-"));
        let _guard = span.enter();

        validate_batch(sources, targets)?;
        let sources = rules.backfill_descriptions(sources);
        let central = apply_central_rules(&sources, targets, rules)?;
        debug!(
            decided = central.decisions.len(),
            remaining_sources = central.remaining_sources.len(),
            remaining_targets = central.remaining_targets.len(),
            "central rules applied"
        );

        let mut run = Run {
            engine: self,
            sources: &sources,
            targets,
            source_keys: sources.iter().map(FieldKeys::of_source).collect(),
            target_keys: targets.iter().map(FieldKeys::of_target).collect(),
            decisions: central.decisions,
            pools: Pools {
                sources: central.remaining_sources.into_iter().collect(),
                targets: central.remaining_targets.into_iter().collect(),
                occupied: BTreeSet::new(),
            },
        };
        run.exact_phase();
        run.synonym_phase();
        run.fuzzy_phase();
        run.finalize_unmapped();
        let audits = run.audit_pass();

        let mut decisions: Vec<MatchDecision> = run.decisions.into_values().collect();
        decisions.extend(audits);
        let statistics = MatchStatistics::from_decisions(&decisions, targets);
        info!(
            sources = statistics.total_sources,
            targets = statistics.total_targets,
            mapped = statistics.mapped,
            skipped = statistics.skipped,
            unmapped = statistics.unmapped,
            audit = statistics.audit_matches,
            coverage = format_args!("{:.1}%", statistics.coverage_percentage),
            "matching complete"
        );
        Ok(MatchOutcome {
            decisions,
            statistics,
        })
    }
}

/// Rejects blank and duplicate names before any phase runs.
fn validate_batch(sources: &[SourceField], targets: &[TargetField]) -> Result<(), ValidationError> {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for (index, source) in sources.iter().enumerate() {
        let name = source.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingSourceName { index });
        }
        if let Some(first) = seen.insert(name, index) {
            return Err(ValidationError::DuplicateSource {
                name: name.to_string(),
                first,
                second: index,
            });
        }
    }
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for (index, target) in targets.iter().enumerate() {
        let name = target.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingTargetName { index });
        }
        if let Some(first) = seen.insert(name, index) {
            return Err(ValidationError::DuplicateTarget {
                name: name.to_string(),
                first,
                second: index,
            });
        }
    }
    Ok(())
}

/// Ordinals still in play. `occupied` holds targets taken by automated phases.
#[derive(Debug, Default)]
struct Pools {
    sources: BTreeSet<usize>,
    targets: BTreeSet<usize>,
    occupied: BTreeSet<usize>,
}

impl Pools {
    fn take(&mut self, source: usize, target: usize) {
        self.sources.remove(&source);
        self.targets.remove(&target);
        self.occupied.insert(target);
    }
}

struct Run<'a> {
    engine: &'a MatchEngine,
    sources: &'a [SourceField],
    targets: &'a [TargetField],
    source_keys: Vec<FieldKeys>,
    target_keys: Vec<FieldKeys>,
    decisions: BTreeMap<usize, MatchDecision>,
    pools: Pools,
}

impl Run<'_> {
    fn candidate(
        &self,
        source: usize,
        target: usize,
        score: PairScore,
        algorithm: MatchAlgorithm,
    ) -> MatchCandidate<'_> {
        MatchCandidate {
            source: &self.sources[source],
            target: &self.targets[target],
            name_score: score.name,
            description_score: score.description,
            combined_score: score.combined,
            algorithm,
        }
    }

    fn accept(&mut self, source: usize, target: usize, decision: MatchDecision) {
        trace!(
            source = %decision.source_name,
            target = decision.target_name.as_deref().unwrap_or_default(),
            match_type = %decision.match_type,
            confidence = decision.confidence,
            "accepted"
        );
        self.pools.take(source, target);
        self.decisions.insert(source, decision);
    }

    fn exact_phase(&mut self) {
        let mut matched = 0usize;
        let pending: Vec<usize> = self.pools.sources.iter().copied().collect();
        for source in pending {
            let keys = &self.source_keys[source];
            if keys.name.is_empty() {
                continue;
            }
            let mut name_only = None;
            let mut full = None;
            for &target in &self.pools.targets {
                let target_keys = &self.target_keys[target];
                if target_keys.name != keys.name {
                    continue;
                }
                if !keys.description.is_empty() && keys.description == target_keys.description {
                    full = Some(target);
                    break;
                }
                name_only.get_or_insert(target);
            }
            let Some((target, confidence)) = full
                .map(|t| (t, EXACT_CONFIDENCE))
                .or_else(|| name_only.map(|t| (t, EXACT_NAME_ONLY_CONFIDENCE)))
            else {
                continue;
            };
            let description = if full.is_some() {
                1.0
            } else {
                self.description_similarity(source, target)
            };
            let score = PairScore {
                name: 1.0,
                description,
                combined: confidence,
            };
            let rationale = if full.is_some() {
                "Exact name and description match"
            } else {
                "Exact name match"
            };
            let decision = MatchDecision::from_candidate(
                &self.candidate(source, target, score, MatchAlgorithm::Exact),
                rationale,
            );
            self.accept(source, target, decision);
            matched += 1;
        }
        self.log_phase("exact", matched);
    }

    fn synonym_phase(&mut self) {
        let mut matched = 0usize;
        let pending: Vec<usize> = self.pools.sources.iter().copied().collect();
        for source in pending {
            let keys = &self.source_keys[source];
            let source_description = keys.compact_description();
            let mut best: Option<(usize, f64)> = None;
            for &target in &self.pools.targets {
                let target_keys = &self.target_keys[target];
                let synonyms = &self.engine.synonyms;
                let qualifies = synonyms.contains_pair(&keys.name, &target_keys.name)
                    || synonyms
                        .contains_pair(&source_description, &target_keys.compact_description());
                if !qualifies {
                    continue;
                }
                let similarity = self
                    .engine
                    .scorer
                    .name_similarity(&keys.name, &target_keys.name);
                if best.is_none_or(|(_, score)| similarity > score) {
                    best = Some((target, similarity));
                }
            }
            let Some((target, similarity)) = best else {
                continue;
            };
            let score = PairScore {
                name: similarity,
                description: self.description_similarity(source, target),
                combined: SYNONYM_CONFIDENCE,
            };
            let rationale = format!(
                "Synonym match: '{}' ~ '{}'",
                self.sources[source].name,
                self.targets[target].field_name()
            );
            let decision = MatchDecision::from_candidate(
                &self.candidate(source, target, score, MatchAlgorithm::Synonym),
                rationale,
            );
            self.accept(source, target, decision);
            matched += 1;
        }
        self.log_phase("synonym", matched);
    }

    /// Global greedy assignment over every pair that clears the threshold.
    fn fuzzy_phase(&mut self) {
        if !self.engine.options.fuzzy_enabled {
            debug!("fuzzy phase disabled");
            return;
        }
        let threshold = self.engine.options.fuzzy_threshold;
        let mut pairs: Vec<(usize, usize, PairScore)> = Vec::new();
        for &source in &self.pools.sources {
            for &target in &self.pools.targets {
                if !self.has_name_keys(source, target) {
                    continue;
                }
                let score = self.score(source, target);
                if score.combined >= threshold {
                    pairs.push((source, target, score));
                }
            }
        }
        pairs.sort_by(|a, b| {
            b.2.combined
                .total_cmp(&a.2.combined)
                .then(a.0.cmp(&b.0))
                .then(a.1.cmp(&b.1))
        });

        let mut matched = 0usize;
        for &(source, target, score) in &pairs {
            if !self.pools.sources.contains(&source) || !self.pools.targets.contains(&target) {
                continue;
            }
            let alternatives = self.alternatives(&pairs, source, target);
            let rationale = format!(
                "Fuzzy match (name {:.2}, description {:.2}, combined {:.2})",
                score.name, score.description, score.combined
            );
            let decision = MatchDecision::from_candidate(
                &self.candidate(source, target, score, MatchAlgorithm::Fuzzy),
                rationale,
            )
            .with_alternatives(alternatives);
            self.accept(source, target, decision);
            matched += 1;
        }
        self.log_phase("fuzzy", matched);
    }

    /// Ranked free targets for `source`, the chosen one first.
    fn alternatives(
        &self,
        pairs: &[(usize, usize, PairScore)],
        source: usize,
        chosen: usize,
    ) -> Vec<Suggestion> {
        let ranked = pairs
            .iter()
            .filter(|(s, t, _)| *s == source && *t == chosen)
            .chain(pairs.iter().filter(|(s, t, _)| {
                *s == source && *t != chosen && self.pools.targets.contains(t)
            }));
        ranked
            .take(self.engine.options.max_suggestions)
            .map(|(_, target, score)| Suggestion {
                target_name: self.targets[*target].name.clone(),
                score: score.combined,
            })
            .collect()
    }

    fn finalize_unmapped(&mut self) {
        for &source in &self.pools.sources {
            self.decisions
                .insert(source, MatchDecision::unmapped(&self.sources[source]));
        }
        debug!(unmapped = self.pools.sources.len(), "unmapped sources finalized");
    }

    /// Scores still-unmapped sources against targets taken by automated phases.
    fn audit_pass(&self) -> Vec<MatchDecision> {
        let options = &self.engine.options;
        if !options.fuzzy_enabled || options.max_suggestions == 0 {
            return Vec::new();
        }
        let mut audits = Vec::new();
        for &source in &self.pools.sources {
            let mut hits: Vec<(usize, PairScore)> = self
                .pools
                .occupied
                .iter()
                .filter(|&&target| self.has_name_keys(source, target))
                .map(|&target| (target, self.score(source, target)))
                .filter(|(_, score)| score.combined >= options.fuzzy_threshold)
                .collect();
            hits.sort_by(|a, b| b.1.combined.total_cmp(&a.1.combined).then(a.0.cmp(&b.0)));
            hits.truncate(options.max_suggestions);
            audits.extend(hits.into_iter().map(|(target, score)| {
                MatchDecision::audit(&self.candidate(source, target, score, MatchAlgorithm::Fuzzy))
            }));
        }
        debug!(audit = audits.len(), "audit pass complete");
        audits
    }

    /// Symbol-only names normalize to empty keys and never score.
    fn has_name_keys(&self, source: usize, target: usize) -> bool {
        !self.source_keys[source].name.is_empty() && !self.target_keys[target].name.is_empty()
    }

    fn score(&self, source: usize, target: usize) -> PairScore {
        self.engine
            .scorer
            .score_keys(&self.source_keys[source], &self.target_keys[target])
    }

    fn description_similarity(&self, source: usize, target: usize) -> f64 {
        let left = &self.source_keys[source].description;
        let right = &self.target_keys[target].description;
        if left.is_empty() || right.is_empty() {
            0.0
        } else {
            self.engine.scorer.blend().score(left, right)
        }
    }

    fn log_phase(&self, phase: &'static str, matched: usize) {
        debug!(
            phase,
            matched,
            remaining_sources = self.pools.sources.len(),
            remaining_targets = self.pools.targets.len(),
            "phase complete"
        );
    }
}
