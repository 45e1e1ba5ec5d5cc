//! Relabel stages: the automatic ones the compiler generates, and the user-supplied ones after
//! normalization.
use std::collections::BTreeMap;

use sc_api::RelabelRule;

use crate::yaml::{
    MapSlice,
    Value,
};

/// One entry of a `relabel_configs` list. Keys serialize in the order the builder methods were
/// called, so each generator controls its own layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelabelStage(MapSlice);

impl RelabelStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{action: keep, source_labels: [source], regex}`
    pub fn keep(source: &str, regex: &str) -> Self {
        Self::new().action("keep").source_labels([source]).regex(regex)
    }

    /// `{action: drop, source_labels: [source], regex}`
    pub fn drop(source: &str, regex: &str) -> Self {
        Self::new().action("drop").source_labels([source]).regex(regex)
    }

    /// Copies a meta label verbatim.
    pub fn copy(source: &str, target: &str) -> Self {
        Self::new().source_labels([source]).target_label(target)
    }

    /// Copies a meta label only when it is non-empty.
    pub fn copy_non_empty(source: &str, target: &str) -> Self {
        Self::copy(source, target).regex("(.+)").replacement("${1}")
    }

    /// Sets `target` to a constant.
    pub fn set(target: &str, value: &str) -> Self {
        Self::new().target_label(target).replacement(value)
    }

    pub fn action(self, action: &str) -> Self {
        self.with("action", action)
    }

    pub fn source_labels<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with("source_labels", labels.into_iter().map(Into::into).collect::<Vec<String>>())
    }

    pub fn target_label(self, label: &str) -> Self {
        self.with("target_label", label)
    }

    pub fn regex(self, regex: &str) -> Self {
        self.with("regex", regex)
    }

    pub fn separator(self, separator: &str) -> Self {
        self.with("separator", separator)
    }

    pub fn replacement(self, replacement: &str) -> Self {
        self.with("replacement", replacement)
    }

    fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.push(key, value);
        self
    }

    pub fn as_map(&self) -> &MapSlice {
        &self.0
    }
}

impl From<RelabelStage> for Value {
    fn from(value: RelabelStage) -> Self {
        Value::Map(value.0)
    }
}

/// A user relabel rule with the legacy spellings folded away.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalRule {
    pub source_labels: Vec<String>,
    pub target_label: Option<String>,
    pub action: Option<String>,
    pub match_expr: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub regex: Option<String>,
    pub separator: Option<String>,
    pub replacement: Option<String>,
}

/// Collapse the two spellings of the source and target fields.
///
/// When a rule sets both, the snake_case spelling is used unless it is empty.
pub fn normalize(rule: &RelabelRule) -> CanonicalRule {
    let source_labels = if rule.legacy_source_labels.is_empty() {
        rule.source_labels.clone()
    } else {
        rule.legacy_source_labels.clone()
    };

    CanonicalRule {
        source_labels,
        target_label: rule
            .legacy_target_label
            .clone()
            .filter(|l| !l.is_empty())
            .or_else(|| rule.target_label.clone()),
        action: rule.action.clone(),
        match_expr: rule.match_expr.clone(),
        labels: rule.labels.clone(),
        regex: rule.regex.clone(),
        separator: rule.separator.clone(),
        replacement: rule.replacement.clone(),
    }
}

impl From<CanonicalRule> for RelabelStage {
    fn from(rule: CanonicalRule) -> Self {
        let mut m = MapSlice::new();
        if !rule.source_labels.is_empty() {
            m.push("source_labels", rule.source_labels);
        }
        m.push_opt("target_label", rule.target_label);
        m.push_opt("action", rule.action);
        m.push_opt("match", rule.match_expr);
        if !rule.labels.is_empty() {
            m.push("labels", &rule.labels);
        }
        m.push_opt("regex", rule.regex);
        m.push_opt("separator", rule.separator);
        m.push_opt("replacement", rule.replacement);
        RelabelStage(m)
    }
}

/// Normalize and render a list of user rules, preserving their order.
pub fn user_stages(rules: &[RelabelRule]) -> Vec<RelabelStage> {
    rules.iter().map(|r| normalize(r).into()).collect()
}

#[cfg(test)]
mod tests;
