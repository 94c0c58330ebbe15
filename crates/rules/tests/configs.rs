//! Integration tests that parse the example rule files in
//! `data/rules/examples/` and the snapshot in `data/configs/`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use vigil_rules::check::{self, TenantStatus};
use vigil_rules::{Config, ConfigId, RuleFormatVersion, RuleKind, RulesConfig, RulesError, View};

/// Resolve a data directory relative to the workspace root.
/// Integration tests run from the crate directory, so we go up two levels.
fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn example(filename: &str) -> String {
    let path = data_dir().join("rules/examples").join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

fn config_of(version: RuleFormatVersion, files: &[&str]) -> RulesConfig {
    RulesConfig::new(version, files.iter().map(|name| (name.to_string(), example(name))))
}

// ── V2 examples ─────────────────────────────────────────────

#[test]
fn parse_v2_examples() {
    let groups = config_of(RuleFormatVersion::V2, &["api.yml", "node.yml"]).parse().unwrap();

    let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["api;api.yml", "api;node.yml", "node;node.yml"]);

    let api = &groups["api;api.yml"];
    let kinds: Vec<RuleKind> = api.iter().map(|r| r.kind()).collect();
    assert_eq!(kinds, vec![RuleKind::Recording, RuleKind::Recording, RuleKind::Alerting]);

    let alert = api[2].as_alerting().unwrap();
    assert_eq!(alert.name, "HighErrorRate");
    assert_eq!(alert.hold_duration, Duration::from_secs(600));
    assert_eq!(alert.annotations.len(), 2);

    let node = &groups["node;node.yml"];
    assert_eq!(node[0].name(), "InstanceDown");
    assert_eq!(node[1].name(), "instance:node_cpu:rate1m");
}

#[test]
fn broken_file_fails_whole_config() {
    let cfg = config_of(RuleFormatVersion::V2, &["api.yml", "broken.yml", "node.yml"]);
    match cfg.parse() {
        Err(RulesError::FileParse { file, .. }) => assert_eq!(file, "broken.yml"),
        other => panic!("expected file parse error, got {:?}", other),
    }
}

// ── V1 examples ─────────────────────────────────────────────

#[test]
fn parse_v1_example() {
    let groups = config_of(RuleFormatVersion::V1, &["api.rules"]).parse().unwrap();
    assert_eq!(groups.len(), 1);

    let rules = &groups["api.rules"];
    let names: Vec<&str> = rules.iter().map(|r| r.name()).collect();
    assert_eq!(
        names,
        vec!["job:http_requests:rate5m", "job:http_errors:ratio5m", "HighErrorRate"]
    );

    let alert = rules[2].as_alerting().unwrap();
    assert_eq!(alert.hold_duration, Duration::from_secs(600));
    assert_eq!(alert.labels.get("severity"), Some("page"));
    assert_eq!(
        alert.annotations.get("runbook"),
        Some("https://runbooks.example.com/high-error-rate")
    );
}

#[test]
fn legacy_and_yaml_examples_agree() {
    let v1 = config_of(RuleFormatVersion::V1, &["api.rules"]).parse().unwrap();
    let v2 = config_of(RuleFormatVersion::V2, &["api.yml"]).parse().unwrap();
    assert_eq!(v1["api.rules"], v2["api;api.yml"]);
}

#[test]
fn legacy_only_constructs_are_rejected() {
    let err = config_of(RuleFormatVersion::V1, &["keep-common.rules"]).parse().unwrap_err();
    assert!(matches!(err, RulesError::Expression(_)), "{:?}", err);
}

#[test]
fn format_version_selects_grammar() {
    let err = config_of(RuleFormatVersion::V2, &["api.rules"]).parse().unwrap_err();
    assert!(matches!(err, RulesError::FileParse { ref file, .. } if file == "api.rules"));

    let err = config_of(RuleFormatVersion::V1, &["api.yml"]).parse().unwrap_err();
    assert!(matches!(err, RulesError::FileParse { ref file, .. } if file == "api.yml"));
}

// ── Stored views ────────────────────────────────────────────

#[test]
fn stored_blob_flows_into_rules() {
    let blob = serde_json::json!({
        "id": 5,
        "config": {
            "rules_files": {"api.rules": example("api.rules")},
            "alertmanager_config": "",
        },
    });
    let view: View = serde_json::from_value(blob).unwrap();
    assert_eq!(view.config.rules_config.format_version, RuleFormatVersion::V1);

    let versioned = view.versioned_rules_config().unwrap();
    assert_eq!(versioned.id, ConfigId::new(5));
    assert!(!versioned.is_deleted());
    assert_eq!(versioned.config.parse().unwrap()["api.rules"].len(), 3);
}

#[test]
fn config_round_trips_through_compat_shape() {
    let cfg = Config::new(config_of(RuleFormatVersion::V2, &["api.yml", "node.yml"]), "route: {}");
    let json = serde_json::to_string(&cfg).unwrap();
    let back: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn check_snapshot() {
    let views = check::load_views(&data_dir().join("configs/snapshot.json")).unwrap();
    let reports = check::check_all(&views, true);

    let statuses: Vec<(&str, &TenantStatus)> =
        reports.iter().map(|r| (r.tenant.as_str(), &r.status)).collect();
    assert_eq!(statuses.len(), 4);

    let parsed_with = |status: &TenantStatus, key: &str| {
        matches!(status, TenantStatus::Parsed { groups } if groups.contains_key(key))
    };
    assert_eq!(statuses[0].0, "acme");
    assert!(parsed_with(statuses[0].1, "api;api.yml"));
    assert_eq!(statuses[1].0, "globex");
    assert!(parsed_with(statuses[1].1, "recording.rules"));
    assert_eq!(statuses[2], ("initech", &TenantStatus::NoRules));
    assert_eq!(statuses[3], ("umbrella", &TenantStatus::Deleted));
    assert!(reports.iter().all(|r| !r.is_failure()));
    assert_eq!(reports[1].format_version, "v1");
}
