//! URL helpers for Roster-Scout
//!
//! Host extraction, same-site comparison and blocklist matching.

mod domain;
mod matcher;

pub use domain::{extract_domain, parse_http_url, site_domain};
pub use matcher::matches_wildcard;

use url::Url;

/// Returns true if the URL's host matches any blocklist pattern
///
/// URLs without a host are treated as blocked.
pub fn is_blocked(url: &Url, blocklist: &[String]) -> bool {
    match extract_domain(url) {
        Some(host) => blocklist
            .iter()
            .any(|pattern| matches_wildcard(&pattern.to_lowercase(), &host)),
        None => true,
    }
}

/// Returns true if both URLs belong to the same site
pub fn same_site(a: &Url, b: &Url) -> bool {
    match (site_domain(a), site_domain(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
