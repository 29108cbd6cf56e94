//! Path template helpers shared by the scanner, the registrar and the radix tree.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigurationError;

#[allow(clippy::expect_used)] // literal pattern
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{([A-Za-z_][A-Za-z0-9_\-]*)\}$").expect("placeholder regex compiles")
});

/// Collapse repeated `/`, force a leading `/` and drop the trailing one.
///
/// ```rust
/// use declarouter::router::sanitize;
///
/// assert_eq!(sanitize("//api///hello/"), "/api/hello");
/// assert_eq!(sanitize(""), "/");
/// ```
#[must_use]
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 1);
    for segment in raw.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Full template of a route: group prefix, type prefix, then the local path.
#[must_use]
pub fn compose(group_prefix: &str, type_prefix: &str, local: &str) -> String {
    sanitize(&format!("/{group_prefix}/{type_prefix}/{local}"))
}

/// Placeholder name of a segment, if it is exactly `{name}`.
pub(crate) fn placeholder_name(segment: &str) -> Option<&str> {
    PLACEHOLDER
        .captures(segment)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Placeholder names of a template in order of appearance.
///
/// Segments mixing literal text and braces, and repeated names, are rejected.
pub fn placeholders(template: &str) -> Result<Vec<String>, ConfigurationError> {
    let mut names: Vec<String> = Vec::new();
    for segment in segments(template) {
        if !segment.contains('{') && !segment.contains('}') {
            continue;
        }
        let Some(name) = placeholder_name(segment) else {
            return Err(ConfigurationError::InvalidPath {
                template: template.to_string(),
                reason: format!("malformed segment '{segment}'"),
            });
        };
        if names.iter().any(|n| n == name) {
            return Err(ConfigurationError::InvalidPath {
                template: template.to_string(),
                reason: format!("duplicate placeholder '{name}'"),
            });
        }
        names.push(name.to_string());
    }
    Ok(names)
}

/// Template with every placeholder replaced by `{}`; equal shapes match the same paths.
#[must_use]
pub fn shape(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    for segment in segments(template) {
        out.push('/');
        if placeholder_name(segment).is_some() {
            out.push_str("{}");
        } else {
            out.push_str(segment);
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_joins_prefixes() {
        assert_eq!(compose("api", "", "/hello"), "/api/hello");
        assert_eq!(compose("", "", "/"), "/");
        assert_eq!(compose("/api/", "/users/", "{id}/"), "/api/users/{id}");
    }

    #[test]
    fn placeholders_in_order() {
        assert_eq!(
            placeholders("/orgs/{org_id}/users/{user-id}").ok(),
            Some(vec!["org_id".to_string(), "user-id".to_string()])
        );
        assert_eq!(placeholders("/plain").ok(), Some(Vec::new()));
    }

    #[test]
    fn malformed_placeholders_are_rejected() {
        assert!(matches!(
            placeholders("/files/{name}.txt"),
            Err(ConfigurationError::InvalidPath { .. })
        ));
        assert!(matches!(
            placeholders("/a/{1st}"),
            Err(ConfigurationError::InvalidPath { .. })
        ));
        assert!(matches!(
            placeholders("/a/{id}/b/{id}"),
            Err(ConfigurationError::InvalidPath { .. })
        ));
    }

    #[test]
    fn shape_ignores_placeholder_names() {
        assert_eq!(shape("/users/{id}/posts"), shape("/users/{user_id}/posts"));
        assert_ne!(shape("/users/{id}"), shape("/users/me"));
        assert_eq!(shape("/"), "/");
    }
}
