//! Central-memory rule resolution and application.
//!
//! Rules are flattened once into a per-source action map: table-scoped rules
//! replace global ones for the same source field, and within a scope a skip
//! rule beats a manual mapping.

use std::collections::{BTreeMap, BTreeSet};

use tmm_model::{
    CentralMemory, ConfigurationError, ManualMapping, MatchDecision, SkipRule, SourceField,
    TargetField,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    Global,
    Table,
}

/// The effective rule for one source field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAction {
    Skip {
        scope: RuleScope,
        source_description: String,
        comment: String,
    },
    Manual {
        scope: RuleScope,
        source_description: String,
        target: String,
        comment: String,
    },
}

impl RuleAction {
    fn skip(rule: &SkipRule, scope: RuleScope) -> Self {
        Self::Skip {
            scope,
            source_description: rule.source_description.trim().to_string(),
            comment: rule.comment.trim().to_string(),
        }
    }

    fn manual(mapping: &ManualMapping, scope: RuleScope) -> Self {
        Self::Manual {
            scope,
            source_description: mapping.source_description.trim().to_string(),
            target: mapping.target.trim().to_string(),
            comment: mapping.comment.trim().to_string(),
        }
    }

    pub fn scope(&self) -> RuleScope {
        match self {
            Self::Skip { scope, .. } | Self::Manual { scope, .. } => *scope,
        }
    }

    pub fn source_description(&self) -> &str {
        match self {
            Self::Skip {
                source_description, ..
            }
            | Self::Manual {
                source_description, ..
            } => source_description,
        }
    }
}

/// Flat source-field -> action map. Keys are trimmed, upper-cased names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRules {
    actions: BTreeMap<String, RuleAction>,
    table: Option<String>,
}

impl ResolvedRules {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Flattens global rules plus the overrides of `table`, if given.
    pub fn resolve(memory: &CentralMemory, table: Option<&str>) -> Self {
        let mut actions = scope_actions(
            &memory.global_skip_fields,
            &memory.global_manual_mappings,
            RuleScope::Global,
        );

        if let Some(table_rules) = table.and_then(|key| memory.table_rules(key)) {
            for rule in table_rules.skip_fields.iter().filter(|rule| !rule.skip) {
                let key = rule_key(&rule.source_field);
                if matches!(actions.get(&key), Some(RuleAction::Skip { .. })) {
                    actions.remove(&key);
                }
            }
            let overrides = scope_actions(
                &table_rules.skip_fields,
                &table_rules.manual_mappings,
                RuleScope::Table,
            );
            actions.extend(overrides);
        } else if let Some(key) = table {
            debug!(table = %key, "no table-specific central rules");
        }

        Self {
            actions,
            table: table.map(str::to_string),
        }
    }

    /// The `<object>_<variant>` key these rules were resolved for.
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn get(&self, source_name: &str) -> Option<&RuleAction> {
        self.actions.get(&rule_key(source_name))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Copies `sources`, filling empty descriptions from the matching rule.
    pub fn backfill_descriptions(&self, sources: &[SourceField]) -> Vec<SourceField> {
        sources
            .iter()
            .map(|source| {
                let mut source = source.clone();
                if source.description.trim().is_empty()
                    && let Some(action) = self.get(&source.name)
                    && !action.source_description().is_empty()
                {
                    source.description = action.source_description().to_string();
                }
                source
            })
            .collect()
    }
}

fn scope_actions(
    skips: &[SkipRule],
    manuals: &[ManualMapping],
    scope: RuleScope,
) -> BTreeMap<String, RuleAction> {
    let mut actions = BTreeMap::new();
    for mapping in manuals {
        actions.insert(rule_key(&mapping.source_field), RuleAction::manual(mapping, scope));
    }
    for rule in skips.iter().filter(|rule| rule.skip) {
        actions.insert(rule_key(&rule.source_field), RuleAction::skip(rule, scope));
    }
    actions
}

fn rule_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Result of applying central rules to a batch.
///
/// Pools hold input ordinals, in input order.
#[derive(Debug, Clone, Default)]
pub struct CentralOutcome {
    /// Decisions keyed by source ordinal.
    pub decisions: BTreeMap<usize, MatchDecision>,
    pub remaining_sources: Vec<usize>,
    pub remaining_targets: Vec<usize>,
}

/// Applies skip rules and manual mappings ahead of automated matching.
///
/// Fails when a manual mapping names a target missing from `targets`, or when
/// two manual mappings claim the same target.
pub fn apply_central_rules(
    sources: &[SourceField],
    targets: &[TargetField],
    rules: &ResolvedRules,
) -> Result<CentralOutcome, ConfigurationError> {
    let mut outcome = CentralOutcome::default();
    let mut claimed: BTreeMap<usize, &str> = BTreeMap::new();
    let mut used_rules: BTreeSet<String> = BTreeSet::new();

    for (index, source) in sources.iter().enumerate() {
        let Some(action) = rules.get(&source.name) else {
            outcome.remaining_sources.push(index);
            continue;
        };
        used_rules.insert(rule_key(&source.name));
        match action {
            RuleAction::Skip { comment, .. } => {
                outcome
                    .decisions
                    .insert(index, MatchDecision::central_skip(source, comment));
            }
            RuleAction::Manual {
                target, comment, ..
            } => {
                let target_index = find_target(targets, &source.name, target)?;
                if let Some(first_source) = claimed.get(&target_index) {
                    return Err(ConfigurationError::ConflictingManualTarget {
                        target: targets[target_index].name.clone(),
                        first_source: (*first_source).to_string(),
                        second_source: source.name.clone(),
                    });
                }
                claimed.insert(target_index, &source.name);
                outcome.decisions.insert(
                    index,
                    MatchDecision::central_manual(source, &targets[target_index], comment),
                );
            }
        }
    }

    for key in rules.actions.keys().filter(|key| !used_rules.contains(*key)) {
        debug!(source_field = %key, "central rule does not match any source field");
    }

    outcome.remaining_targets = (0..targets.len())
        .filter(|index| !claimed.contains_key(index))
        .collect();
    Ok(outcome)
}

/// Full name first, then case-insensitive full name, then unqualified field part.
///
/// The case-insensitive fallbacks must resolve to a single target.
fn find_target(
    targets: &[TargetField],
    source_field: &str,
    wanted: &str,
) -> Result<usize, ConfigurationError> {
    if let Some(index) = targets.iter().position(|t| t.name == wanted) {
        return Ok(index);
    }
    let fallbacks: [fn(&TargetField, &str) -> bool; 2] = [
        |t, wanted| t.name.eq_ignore_ascii_case(wanted),
        |t, wanted| t.field_name().eq_ignore_ascii_case(wanted),
    ];
    for is_match in fallbacks {
        let found: Vec<usize> = targets
            .iter()
            .enumerate()
            .filter(|(_, t)| is_match(t, wanted))
            .map(|(index, _)| index)
            .collect();
        match found.as_slice() {
            [] => continue,
            [index] => return Ok(*index),
            _ => {
                return Err(ConfigurationError::AmbiguousManualTarget {
                    source_field: source_field.to_string(),
                    target: wanted.to_string(),
                    candidates: found.iter().map(|&i| targets[i].name.clone()).collect(),
                });
            }
        }
    }
    Err(ConfigurationError::UnknownManualTarget {
        source_field: source_field.to_string(),
        target: wanted.to_string(),
    })
}
