//! Translates a label selector into relabel stages that filter discovered targets.
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use sc_core::k8s::sanitize_label_name;
use tracing::warn;

use crate::relabel::RelabelStage;

/// Relabel stages equivalent to `selector`, for targets discovered under `role` (`pod`,
/// `service`, `node`).
///
/// `matchLabels` come first, in key order, then `matchExpressions` in declaration order.
/// Requirements with an unknown operator produce no stage.
pub fn selector_stages(selector: &LabelSelector, role: &str) -> Vec<RelabelStage> {
    let mut stages = vec![];

    for (key, value) in selector.match_labels.iter().flatten() {
        stages.push(RelabelStage::keep(&label_meta(role, key), value));
    }

    for expr in selector.match_expressions.iter().flatten() {
        let values = expr.values.as_deref().unwrap_or_default().join("|");
        let stage = match expr.operator.as_str() {
            "In" => RelabelStage::keep(&label_meta(role, &expr.key), &values),
            "NotIn" => RelabelStage::drop(&label_meta(role, &expr.key), &values),
            "Exists" => RelabelStage::keep(&label_present_meta(role, &expr.key), "true"),
            "DoesNotExist" => RelabelStage::drop(&label_present_meta(role, &expr.key), "true"),
            op => {
                warn!(key = %expr.key, operator = op, "unknown selector operator, skipping");
                continue;
            },
        };
        stages.push(stage);
    }

    stages
}

fn label_meta(role: &str, key: &str) -> String {
    format!("__meta_kubernetes_{role}_label_{}", sanitize_label_name(key))
}

fn label_present_meta(role: &str, key: &str) -> String {
    format!("__meta_kubernetes_{role}_labelpresent_{}", sanitize_label_name(key))
}
