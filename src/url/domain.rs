use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use roster_scout::url::extract_domain;
///
/// let url = Url::parse("https://WWW.Musterschule.de/leitbild").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.musterschule.de".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Extracts the host used for same-site comparisons
///
/// A leading "www." is dropped so that `www.example.de` and `example.de`
/// count as the same site.
pub fn site_domain(url: &Url) -> Option<String> {
    extract_domain(url).map(|host| match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    })
}

/// Parses a string as an absolute http(s) URL
pub fn parse_http_url(input: &str) -> Option<Url> {
    let url = Url::parse(input.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url),
        _ => None,
    }
}
