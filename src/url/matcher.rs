/// Checks if a host matches a blocklist pattern
///
/// Two kinds of patterns are supported:
/// 1. Exact match: "facebook.com" matches only "facebook.com"
/// 2. Wildcard match: "*.wikipedia.org" matches the bare domain and every
///    subdomain ("de.wikipedia.org", "de.m.wikipedia.org")
///
/// Both sides are expected to be lowercase.
///
/// # Examples
///
/// ```
/// use roster_scout::url::matches_wildcard;
///
/// assert!(matches_wildcard("*.wikipedia.org", "de.wikipedia.org"));
/// assert!(matches_wildcard("*.wikipedia.org", "wikipedia.org"));
/// assert!(!matches_wildcard("*.wikipedia.org", "notwikipedia.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}
