use tmm_map::similarity::{FieldKeys, FieldScorer};
use tmm_map::{MatchEngine, ResolvedRules, SynonymTable};
use tmm_model::{
    CentralMemory, ConfigurationError, ManualMapping, MatchError, MatchOptions, MatchStatus,
    MatchType, ScoreWeights, SkipRule, SourceField, TableRules, TargetField, ValidationError,
    table_key,
};

fn source(name: &str, description: &str) -> SourceField {
    SourceField::new(name, description).unwrap()
}

fn target(name: &str, description: &str) -> TargetField {
    TargetField::new(name, description).unwrap()
}

fn engine() -> MatchEngine {
    MatchEngine::new(MatchOptions::default()).unwrap()
}

fn skip_rule(source_field: &str, comment: &str) -> SkipRule {
    SkipRule {
        source_field: source_field.to_string(),
        source_description: String::new(),
        skip: true,
        comment: comment.to_string(),
    }
}

fn manual(source_field: &str, target: &str) -> ManualMapping {
    ManualMapping {
        source_field: source_field.to_string(),
        source_description: String::new(),
        target: target.to_string(),
        target_description: String::new(),
        comment: String::new(),
    }
}

#[test]
fn exact_name_and_description_maps_with_full_confidence() {
    let outcome = engine()
        .match_fields(&[source("BANKL", "Bank Key")], &[target("BANKL", "Bank Key")])
        .unwrap();

    let decision = outcome.decision_for("BANKL").unwrap();
    assert_eq!(decision.status, MatchStatus::Mapped);
    assert_eq!(decision.match_type, MatchType::Exact);
    assert_eq!(decision.confidence, 1.0);
    assert_eq!(decision.target_name.as_deref(), Some("BANKL"));
    assert_eq!(outcome.statistics.coverage_percentage, 100.0);
}

#[test]
fn synonym_match_uses_fixed_confidence() {
    let outcome = engine()
        .match_fields(
            &[source("KLANT", "Klantnaam")],
            &[target("CUSTOMER", "Customer Name")],
        )
        .unwrap();

    let decision = outcome.decision_for("KLANT").unwrap();
    assert_eq!(decision.status, MatchStatus::Mapped);
    assert_eq!(decision.match_type, MatchType::Synonym);
    assert_eq!(decision.confidence, 0.85);
    insta::assert_json_snapshot!("synonym_decision", decision);
}

#[test]
fn unmapped_source_gets_audit_record_against_occupied_target() {
    let outcome = engine()
        .match_fields(
            &[source("BANKL", "Bank Key"), source("IBAN_RULE", "")],
            &[target("BANKL", "Bank Key")],
        )
        .unwrap();

    let primary = outcome.decision_for("IBAN_RULE").unwrap();
    assert_eq!(primary.status, MatchStatus::Unmapped);
    assert_eq!(primary.match_type, MatchType::None);
    assert_eq!(primary.confidence, 0.0);

    let audits: Vec<_> = outcome.audit_decisions().collect();
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].source_name, "IBAN_RULE");
    assert_eq!(audits[0].target_name.as_deref(), Some("BANKL"));
    assert_eq!(audits[0].match_type, MatchType::Fuzzy);
    // Levenshtein 0.5 and Jaro-Winkler 0.7667 for "ibanrule" / "bankl".
    assert!((audits[0].confidence - 0.6333).abs() < 1e-3);
    assert!(audits[0].rationale.starts_with("Fuzzy match to already mapped target"));

    assert_eq!(outcome.statistics.audit_matches, 1);
    assert_eq!(outcome.statistics.coverage_percentage, 50.0);
    assert_eq!(outcome.decisions.last().map(|d| d.status), Some(MatchStatus::AuditOnly));
}

#[test]
fn central_skip_wins_over_any_similarity() {
    let memory = CentralMemory {
        global_skip_fields: vec![skip_rule("ZRES1", "reserved")],
        ..CentralMemory::default()
    };
    let rules = ResolvedRules::resolve(&memory, None);
    let outcome = engine()
        .run(&[source("ZRES1", "Reserve")], &[target("ZRES1", "Reserve")], &rules)
        .unwrap();

    let decision = outcome.decision_for("ZRES1").unwrap();
    assert_eq!(decision.status, MatchStatus::Skipped);
    assert_eq!(decision.match_type, MatchType::CentralSkip);
    assert_eq!(decision.confidence, 1.0);
    assert!(decision.target_name.is_none());
    assert_eq!(outcome.statistics.unmapped_targets, vec!["ZRES1"]);
}

#[test]
fn contested_target_goes_to_the_higher_fuzzy_score() {
    let outcome = engine()
        .match_fields(
            &[source("BANKLXYZ", ""), source("BANKLX", "")],
            &[target("BANKL", "")],
        )
        .unwrap();

    let winner = outcome.decision_for("BANKLX").unwrap();
    assert_eq!(winner.status, MatchStatus::Mapped);
    assert_eq!(winner.match_type, MatchType::Fuzzy);
    assert_eq!(winner.target_name.as_deref(), Some("BANKL"));

    let loser = outcome.decision_for("BANKLXYZ").unwrap();
    assert_eq!(loser.status, MatchStatus::Unmapped);
    assert!(winner.confidence > outcome.audit_decisions().next().unwrap().confidence);
}

#[test]
fn fuzzy_threshold_is_inclusive() {
    let src = source("BANKLXYZ", "");
    let tgt = target("BANKL", "");
    let score = FieldScorer::new(&ScoreWeights::default())
        .score_keys(&FieldKeys::of_source(&src), &FieldKeys::of_target(&tgt))
        .combined;
    assert!(score > 0.0 && score < 1.0);

    let at = MatchEngine::new(MatchOptions::default().with_threshold(score)).unwrap();
    let outcome = at.match_fields(&[src.clone()], &[tgt.clone()]).unwrap();
    let decision = outcome.decision_for("BANKLXYZ").unwrap();
    assert_eq!(decision.match_type, MatchType::Fuzzy);
    assert_eq!(decision.confidence, score);

    let above = MatchEngine::new(MatchOptions::default().with_threshold(score.next_up())).unwrap();
    let outcome = above.match_fields(&[src], &[tgt]).unwrap();
    assert_eq!(
        outcome.decision_for("BANKLXYZ").map(|d| d.status),
        Some(MatchStatus::Unmapped)
    );
}

#[test]
fn fuzzy_decision_lists_ranked_alternatives() {
    let targets = [target("BANKA", ""), target("BANKB", ""), target("BANKC", "")];
    let outcome = engine()
        .match_fields(&[source("BANKZ", "")], &targets)
        .unwrap();
    let decision = outcome.decision_for("BANKZ").unwrap();
    assert_eq!(decision.target_name.as_deref(), Some("BANKA"));
    let names: Vec<_> = decision
        .alternatives
        .iter()
        .map(|s| s.target_name.as_str())
        .collect();
    assert_eq!(names, vec!["BANKA", "BANKB", "BANKC"]);
    assert_eq!(decision.alternatives[0].score, decision.confidence);

    let capped = MatchEngine::new(MatchOptions::default().with_max_suggestions(2)).unwrap();
    let outcome = capped.match_fields(&[source("BANKZ", "")], &targets).unwrap();
    assert_eq!(outcome.decision_for("BANKZ").unwrap().alternatives.len(), 2);
}

#[test]
fn audit_records_are_capped_per_source() {
    let sources = [
        source("BANKA", ""),
        source("BANKB", ""),
        source("BANKC", ""),
        source("BANKZ", ""),
    ];
    let targets = [target("BANKA", ""), target("BANKB", ""), target("BANKC", "")];
    let engine = MatchEngine::new(MatchOptions::default().with_max_suggestions(2)).unwrap();
    let outcome = engine.match_fields(&sources, &targets).unwrap();

    let audit_targets: Vec<_> = outcome
        .audit_decisions()
        .filter_map(|d| d.target_name.as_deref())
        .collect();
    assert_eq!(audit_targets, vec!["BANKA", "BANKB"]);
    assert_eq!(outcome.statistics.count(MatchType::Exact), 3);
}

#[test]
fn disabling_fuzzy_keeps_synonyms_and_skips_audit() {
    let engine = MatchEngine::new(MatchOptions::default().with_fuzzy(false)).unwrap();
    let outcome = engine
        .match_fields(
            &[source("KLANT", ""), source("BANKLX", "")],
            &[target("CUSTOMER", ""), target("BANKL", "")],
        )
        .unwrap();

    assert_eq!(
        outcome.decision_for("KLANT").map(|d| d.match_type),
        Some(MatchType::Synonym)
    );
    assert_eq!(
        outcome.decision_for("BANKLX").map(|d| d.status),
        Some(MatchStatus::Unmapped)
    );
    assert_eq!(outcome.audit_decisions().count(), 0);
}

#[test]
fn qualified_targets_compare_on_field_part() {
    let outcome = engine()
        .match_fields(
            &[source("BANKS", "Bank Country")],
            &[
                target("S_BNKA.BANKL", "Bank Key"),
                target("S_BNKA.BANKS", "Bank Country"),
            ],
        )
        .unwrap();
    let decision = outcome.decision_for("BANKS").unwrap();
    assert_eq!(decision.match_type, MatchType::Exact);
    assert_eq!(decision.target_name.as_deref(), Some("S_BNKA.BANKS"));
    assert_eq!(outcome.statistics.unmapped_targets, vec!["S_BNKA.BANKL"]);
}

#[test]
fn table_rules_and_custom_synonyms_flow_through_a_run() {
    let mut memory = CentralMemory {
        global_skip_fields: vec![skip_rule("MANDT", "client")],
        global_manual_mappings: vec![ManualMapping {
            source_description: "Bank country key".to_string(),
            ..manual("LAND", "S_BNKA.BANKS")
        }],
        ..CentralMemory::default()
    };
    memory
        .synonyms
        .insert("bankleitzahl".to_string(), vec!["blz".to_string()]);
    memory.table_specific.insert(
        table_key("m140", "bnka"),
        TableRules {
            skip_fields: vec![SkipRule {
                skip: false,
                ..skip_rule("MANDT", "migrated for this table")
            }],
            manual_mappings: Vec::new(),
        },
    );

    let engine = engine().with_central_memory(&memory);
    let rules = ResolvedRules::resolve(&memory, Some(&table_key("m140", "bnka")));
    let sources = [source("MANDT", ""), source("LAND", ""), source("BLZ", "")];
    let targets = [
        target("S_BNKA.MANDT", "Client"),
        target("S_BNKA.BANKS", "Bank Country"),
        target("S_BNKA.BANKLEITZAHL", ""),
    ];
    let outcome = engine.run(&sources, &targets, &rules).unwrap();

    let mandt = outcome.decision_for("MANDT").unwrap();
    assert_eq!(mandt.match_type, MatchType::Exact);

    let land = outcome.decision_for("LAND").unwrap();
    assert_eq!(land.match_type, MatchType::CentralManual);
    assert_eq!(land.source_description, "Bank country key");
    assert_eq!(land.target_name.as_deref(), Some("S_BNKA.BANKS"));

    let blz = outcome.decision_for("BLZ").unwrap();
    assert_eq!(blz.match_type, MatchType::Synonym);
    assert_eq!(blz.target_name.as_deref(), Some("S_BNKA.BANKLEITZAHL"));

    assert_eq!(outcome.statistics.mapped, 3);
    assert_eq!(outcome.statistics.count(MatchType::CentralManual), 1);
}

#[test]
fn empty_synonym_table_disables_synonym_matches() {
    let engine = engine().with_synonyms(SynonymTable::new());
    let outcome = engine
        .match_fields(&[source("KLANT", "")], &[target("CUSTOMER", "")])
        .unwrap();
    assert_ne!(
        outcome.decision_for("KLANT").map(|d| d.match_type),
        Some(MatchType::Synonym)
    );
}

#[test]
fn conflicting_manual_mappings_abort_the_run() {
    let memory = CentralMemory {
        global_manual_mappings: vec![manual("A", "T1"), manual("B", "T1")],
        ..CentralMemory::default()
    };
    let rules = ResolvedRules::resolve(&memory, None);
    let err = engine()
        .run(&[source("A", ""), source("B", "")], &[target("T1", "")], &rules)
        .unwrap_err();
    assert_eq!(
        err,
        MatchError::Configuration(ConfigurationError::ConflictingManualTarget {
            target: "T1".to_string(),
            first_source: "A".to_string(),
            second_source: "B".to_string(),
        })
    );
}

#[test]
fn invalid_options_are_rejected_up_front() {
    let err = MatchEngine::new(MatchOptions::default().with_threshold(1.5)).unwrap_err();
    assert_eq!(err, ConfigurationError::InvalidThreshold(1.5));
}

#[test]
fn malformed_batches_are_rejected_before_matching() {
    let blank = SourceField {
        name: "  ".to_string(),
        ..source("X", "")
    };
    let err = engine()
        .match_fields(&[source("A", ""), blank], &[])
        .unwrap_err();
    assert_eq!(
        err,
        MatchError::Validation(ValidationError::MissingSourceName { index: 1 })
    );

    let err = engine()
        .match_fields(&[], &[target("T1", ""), target("T1", "other")])
        .unwrap_err();
    assert_eq!(
        err,
        MatchError::Validation(ValidationError::DuplicateTarget {
            name: "T1".to_string(),
            first: 0,
            second: 1,
        })
    );
}

#[test]
fn empty_inputs_are_a_valid_degenerate_run() {
    let outcome = engine().match_fields(&[], &[target("T1", "")]).unwrap();
    assert!(outcome.decisions.is_empty());
    assert_eq!(outcome.statistics.total_targets, 1);
    assert_eq!(outcome.statistics.coverage_percentage, 0.0);

    let outcome = engine().match_fields(&[source("A", "")], &[]).unwrap();
    assert_eq!(outcome.statistics.unmapped, 1);
}

#[test]
fn primary_decisions_follow_source_order() {
    let sources = [
        source("ZZZ", ""),
        source("BANKL", "Bank Key"),
        source("KLANT", ""),
    ];
    let targets = [target("CUSTOMER", ""), target("BANKL", "Bank Key")];
    let outcome = engine().match_fields(&sources, &targets).unwrap();
    let names: Vec<_> = outcome
        .primary_decisions()
        .map(|d| d.source_name.as_str())
        .collect();
    assert_eq!(names, vec!["ZZZ", "BANKL", "KLANT"]);
}
