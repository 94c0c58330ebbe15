//! Tests for rule-file structure.

use super::*;

const GOOD: &str = r#"
groups:
  - name: api
    interval: 30s
    rules:
      - record: job:http_requests:rate5m
        expr: sum by (job) (rate(http_requests_total[5m]))
        labels:
          source: recording
      - alert: HighErrorRate
        expr: job:http_errors:ratio5m > 0.05
        for: 10m
        labels:
          severity: page
        annotations:
          summary: "High error rate on {{ $labels.job }}"
  - name: node
    rules:
      - alert: InstanceDown
        expr: up == 0
"#;

fn errors(content: &str) -> Vec<RuleFileError> {
    match parse(content) {
        Ok(groups) => panic!("expected errors, got {:?}", groups),
        Err(errs) => errs,
    }
}

#[test]
fn parses_groups_in_order() {
    let parsed = parse(GOOD).unwrap();
    assert_eq!(parsed.groups.len(), 2);

    let api = &parsed.groups[0];
    assert_eq!(api.name, "api");
    assert_eq!(api.interval, Some(RuleDuration(Duration::from_secs(30))));
    assert_eq!(api.rules.len(), 2);
    assert_eq!(api.rules[0].record.as_deref(), Some("job:http_requests:rate5m"));
    assert_eq!(api.rules[0].labels.get("source").map(String::as_str), Some("recording"));

    let alert = &api.rules[1];
    assert_eq!(alert.name(), "HighErrorRate");
    assert_eq!(alert.hold_duration(), Duration::from_secs(600));
    assert!(alert.annotations.contains_key("summary"));

    let node = &parsed.groups[1];
    assert!(node.interval.is_none());
    assert_eq!(node.rules[0].hold_duration(), Duration::ZERO);
}

#[test]
fn blank_content_has_no_groups() {
    assert!(parse("").unwrap().groups.is_empty());
    assert!(parse("  \n\t\n").unwrap().groups.is_empty());
}

#[test]
fn expressions_are_not_checked() {
    let parsed =
        parse("groups:\n  - name: g\n    rules:\n      - record: r\n        expr: 'sum(('\n")
            .unwrap();
    assert_eq!(parsed.groups[0].rules[0].expr, "sum((");
}

#[test]
fn unknown_fields_are_rejected() {
    let errs = errors("groups:\n  - name: g\n    rulez: []\n");
    assert_eq!(errs.len(), 1);
    assert!(matches!(errs[0], RuleFileError::Yaml(_)));
    assert!(errs[0].to_string().contains("rulez"), "{}", errs[0]);
}

#[test]
fn unterminated_rule_block_is_a_yaml_error() {
    let errs = errors("groups:\n  - name: g\n    rules:\n      - record: r\n        expr: [up\n");
    assert!(matches!(errs[0], RuleFileError::Yaml(_)));
}

#[test]
fn bad_duration_is_a_yaml_error() {
    let errs = errors(concat!(
        "groups:\n  - name: g\n    rules:\n",
        "      - alert: a\n        expr: up\n        for: 5 minutes\n",
    ));
    assert!(errs[0].to_string().contains("not a valid duration string"), "{}", errs[0]);
}

#[test]
fn structural_errors_are_collected() {
    let content = r#"
groups:
  - name: ""
    rules: []
  - name: dup
    rules:
      - expr: up
      - record: r
        alert: a
        expr: up
  - name: dup
    rules:
      - record: "bad name"
        expr: up
        for: 5m
        annotations:
          summary: nope
      - alert: a
        expr: ""
        labels:
          "0bad": x
"#;
    let errs = errors(content);
    let rendered: Vec<String> = errs.iter().map(ToString::to_string).collect();

    assert!(matches!(errs[0], RuleFileError::EmptyGroupName));
    assert_eq!(rendered[1], "group \"dup\", rule 1, \"\": one of 'record' or 'alert' must be set");
    assert_eq!(
        rendered[2],
        "group \"dup\", rule 2, \"a\": only one of 'record' and 'alert' must be set"
    );
    assert!(matches!(errs[3], RuleFileError::DuplicateGroup(ref name) if name == "dup"));
    assert_eq!(
        rendered[4],
        "group \"dup\", rule 1, \"bad name\": invalid field 'for' in recording rule"
    );
    assert!(rendered[5].ends_with("invalid field 'annotations' in recording rule"));
    assert!(rendered[6].ends_with("invalid recording rule name: bad name"));
    assert!(rendered[7].ends_with("field 'expr' must be set in rule"));
    assert!(rendered[8].ends_with("invalid label name: 0bad"));
    assert_eq!(errs.len(), 9);
}

#[test]
fn durations_serialize_compactly() {
    let node = RuleNode {
        alert: Some("a".to_string()),
        expr: "up".to_string(),
        hold: Some(RuleDuration(Duration::from_secs(5_400))),
        ..Default::default()
    };
    let yaml = serde_yaml::to_string(&node).unwrap();
    assert!(yaml.contains("for: 1h30m"), "{}", yaml);
    assert!(!yaml.contains("labels"), "{}", yaml);
}
