use std::fs;
use std::path::{Path, PathBuf};

use tmm_cli::commands::{MapRequest, lookup_synonyms, resolve_options, run_map};
use tmm_model::{MatchStatus, MatchType};

fn unique_temp_dir(name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "tmm-cli-{}-{}-{}",
        name,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

const BATCH: &str = r#"
object = "m140"
variant = "bnka"

[[sources]]
name = "BANKL"
description = "Bank Key"

[[sources]]
name = "KLANT"
description = ""

[[sources]]
name = "ZRES1"
description = "Reserved"

[[sources]]
name = "IBAN_RULE"

[[targets]]
name = "S_BNKA.BANKL"
description = "Bank Key"
mandatory = true

[[targets]]
name = "S_BNKA.CUSTOMER"

[[targets]]
name = "S_BNKA.BANKS"
description = "Bank Country"
mandatory = true
"#;

const RULES: &str = r#"
[table_specific.m140_bnka]
skip_fields = [{ source_field = "ZRES1", comment = "reserved" }]
"#;

#[test]
fn map_runs_batch_with_table_rules() {
    let dir = unique_temp_dir("map");
    let batch = dir.join("batch.toml");
    let rules = dir.join("central.toml");
    write(&batch, BATCH);
    write(&rules, RULES);

    let report = run_map(&MapRequest {
        batch,
        rules: Some(rules),
        config: Some(dir.join("tmm.toml")),
        ..MapRequest::default()
    })
    .expect("map batch");

    assert_eq!(report.table.as_deref(), Some("m140_bnka"));
    let status_of = |name: &str| {
        report
            .decisions
            .iter()
            .find(|d| d.source_name == name && d.status.is_primary())
            .map(|d| (d.status, d.match_type))
    };
    assert_eq!(status_of("BANKL"), Some((MatchStatus::Mapped, MatchType::Exact)));
    assert_eq!(status_of("KLANT"), Some((MatchStatus::Mapped, MatchType::Synonym)));
    assert_eq!(
        status_of("ZRES1"),
        Some((MatchStatus::Skipped, MatchType::CentralSkip))
    );
    assert_eq!(
        status_of("IBAN_RULE"),
        Some((MatchStatus::Unmapped, MatchType::None))
    );
    assert_eq!(report.statistics.unmapped_mandatory_targets, vec!["S_BNKA.BANKS"]);

    let json = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(json["table"], "m140_bnka");
    assert_eq!(json["statistics"]["mapped"], 2);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn cli_overrides_take_precedence_over_config_file() {
    let dir = unique_temp_dir("options");
    let config = dir.join("tmm.toml");
    write(&config, "fuzzy_threshold = 0.9\nmax_suggestions = 5\n");

    let request = MapRequest {
        config: Some(config),
        threshold: Some(0.7),
        disable_fuzzy: true,
        ..MapRequest::default()
    };
    let options = resolve_options(&request).expect("resolve options");
    assert_eq!(options.fuzzy_threshold, 0.7);
    assert_eq!(options.max_suggestions, 5);
    assert!(!options.fuzzy_enabled);

    let invalid = MapRequest {
        threshold: Some(-0.1),
        ..MapRequest::default()
    };
    assert!(resolve_options(&invalid).is_err());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_batch_file_is_reported() {
    let dir = unique_temp_dir("missing");
    let err = run_map(&MapRequest {
        batch: dir.join("absent.toml"),
        ..MapRequest::default()
    })
    .unwrap_err();
    assert!(format!("{err:#}").contains("absent.toml"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn synonym_lookup_includes_custom_groups() {
    let builtin = lookup_synonyms("klant", None).expect("builtin lookup");
    assert!(builtin.contains(&"customer".to_string()));

    let dir = unique_temp_dir("synonyms");
    let rules = dir.join("central.toml");
    write(&rules, "[synonyms]\nbankleitzahl = [\"blz\", \"routing\"]\n");
    let custom = lookup_synonyms("BLZ", Some(&rules)).expect("custom lookup");
    assert_eq!(custom, vec!["bankleitzahl", "routing"]);
    let _ = fs::remove_dir_all(&dir);
}
