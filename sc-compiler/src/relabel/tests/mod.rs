use insta::assert_snapshot;
use rstest::*;

use super::*;

fn render(stage: RelabelStage) -> String {
    serde_yaml::to_string(stage.as_map()).unwrap()
}

fn rule_from_json(json: &str) -> RelabelRule {
    serde_json::from_str(json).unwrap()
}

#[rstest]
#[case::canonical(r#"{"sourceLabels": ["__address__"], "targetLabel": "address", "action": "replace"}"#)]
#[case::legacy(r#"{"source_labels": ["__address__"], "target_label": "address", "action": "replace"}"#)]
fn test_normalize_spellings_are_equivalent(#[case] json: &str) {
    let stage: RelabelStage = normalize(&rule_from_json(json)).into();
    assert_eq!(render(stage), "source_labels:\n- __address__\ntarget_label: address\naction: replace\n");
}

#[rstest]
fn test_normalize_graphite_labels_sorted() {
    let rule = rule_from_json(
        r#"{"source_labels": ["__address__"], "target_label": "address", "action": "graphite",
            "labels": {"job": "$1", "instance": "${2}:8080"}, "match": "foo.*.*.bar"}"#,
    );
    let stage: RelabelStage = normalize(&rule).into();

    assert_snapshot!(render(stage), @r"
source_labels:
- __address__
target_label: address
action: graphite
match: foo.*.*.bar
labels:
  instance: ${2}:8080
  job: $1
");
}

#[rstest]
fn test_normalize_legacy_wins_when_both_set() {
    let rule = rule_from_json(
        r#"{"sourceLabels": ["canonical"], "source_labels": ["legacy"],
            "targetLabel": "canonical_target", "target_label": "legacy_target"}"#,
    );
    let canonical = normalize(&rule);

    assert_eq!(canonical.source_labels, vec!["legacy".to_string()]);
    assert_eq!(canonical.target_label.as_deref(), Some("legacy_target"));
}

#[rstest]
fn test_normalize_empty_legacy_target_falls_back() {
    let rule = rule_from_json(r#"{"targetLabel": "canonical_target", "target_label": ""}"#);
    assert_eq!(normalize(&rule).target_label.as_deref(), Some("canonical_target"));
}

#[rstest]
fn test_normalize_omits_unset_fields() {
    let stage: RelabelStage = normalize(&rule_from_json(r#"{"action": "labeldrop", "regex": "tmp_.*"}"#)).into();
    assert_eq!(stage.as_map().keys().collect::<Vec<_>>(), vec!["action", "regex"]);
}

#[rstest]
fn test_user_stages_preserve_order() {
    let rules = vec![
        rule_from_json(r#"{"action": "drop", "sourceLabels": ["a"]}"#),
        rule_from_json(r#"{"action": "keep", "sourceLabels": ["b"]}"#),
    ];
    let stages = user_stages(&rules);

    assert_eq!(stages.len(), 2);
    assert_eq!(stages[0].as_map().get("action"), Some(&Value::from("drop")));
    assert_eq!(stages[1].as_map().get("action"), Some(&Value::from("keep")));
}

#[rstest]
fn test_builder_keeps_call_order() {
    let stage = RelabelStage::new()
        .source_labels(["__meta_kubernetes_endpoint_address_target_kind", "__meta_kubernetes_endpoint_address_target_name"])
        .separator(";")
        .regex("Node;(.*)")
        .replacement("${1}")
        .target_label("node");

    assert_eq!(
        stage.as_map().keys().collect::<Vec<_>>(),
        vec!["source_labels", "separator", "regex", "replacement", "target_label"]
    );
}

#[rstest]
fn test_quoted_numeric_regex() {
    assert_eq!(
        render(RelabelStage::keep("__meta_kubernetes_endpoint_port_name", "8085")),
        "action: keep\nsource_labels:\n- __meta_kubernetes_endpoint_port_name\nregex: '8085'\n"
    );
}
