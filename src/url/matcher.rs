/// Checks if a hostname matches a blocklist pattern
///
/// Two kinds of patterns are supported:
/// 1. Exact: "instance-data" matches only "instance-data"
/// 2. Wildcard: "*.corp.example" matches "corp.example" and every host below it
///
/// Comparison ignores ASCII case and a trailing root dot on the candidate,
/// so "LOCALHOST." is caught by a "localhost" entry.
///
/// # Examples
///
/// ```
/// use link_scout::url::matches_wildcard;
///
/// assert!(matches_wildcard("*.localhost", "localhost"));
/// assert!(matches_wildcard("*.localhost", "api.localhost"));
/// assert!(matches_wildcard("instance-data", "Instance-Data"));
/// assert!(!matches_wildcard("*.corp.example", "notcorp.example"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    let candidate = candidate.strip_suffix('.').unwrap_or(candidate);

    if let Some(base) = pattern.strip_prefix("*.") {
        if candidate.eq_ignore_ascii_case(base) {
            return true;
        }
        // Subdomain match needs a label boundary right before the base
        candidate.len() > base.len()
            && candidate.is_char_boundary(candidate.len() - base.len())
            && candidate[candidate.len() - base.len()..].eq_ignore_ascii_case(base)
            && candidate.as_bytes()[candidate.len() - base.len() - 1] == b'.'
    } else {
        candidate.eq_ignore_ascii_case(pattern)
    }
}

/// Returns true when any pattern in the list matches the hostname
pub fn matches_any<S: AsRef<str>>(patterns: &[S], candidate: &str) -> bool {
    patterns
        .iter()
        .any(|pattern| matches_wildcard(pattern.as_ref(), candidate))
}
