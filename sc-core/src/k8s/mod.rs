//! Small helpers for dealing with Kubernetes naming rules.

/// Replace every character that is not valid in a Prometheus label name with `_`.
///
/// Kubernetes label keys may contain `.`, `/` and `-`; the discovery meta labels derived from
/// them use the sanitized form.
pub fn sanitize_label_name(name: &str) -> String {
    name.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect()
}

/// `namespace/name`
pub fn namespaced_name(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}
