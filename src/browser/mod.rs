//! Browser sessions and page fetching
//!
//! A [`BrowserSession`] is the single navigation context reused for every
//! page of a batch run. Two backends exist: headless Chromium for sites that
//! render client-side, and plain HTTP with static HTML parsing. The
//! [`PageFetcher`] layers the settle delay and hard timeout on top and
//! absorbs every failure into an empty page.

mod chrome;
mod fetcher;
mod http;

pub use chrome::ChromeSession;
pub use fetcher::{FetchedPage, PageFetcher};
pub use http::{build_http_client, HttpSession};

use crate::config::{BrowserBackend, BrowserSettings};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised by a browser session
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Navigation to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Unsupported content type '{content_type}' at {url}")]
    ContentMismatch { url: String, content_type: String },

    #[error("Failed to extract page content: {0}")]
    Extraction(String),

    #[error("No page loaded")]
    NoPage,
}

/// An outbound link with its lower-cased visible text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Absolute http(s) URL
    pub href: String,
    pub text: String,
}

impl Anchor {
    pub fn new(href: impl Into<String>, text: &str) -> Self {
        Self {
            href: href.into(),
            text: normalize_anchor_text(text),
        }
    }
}

/// A reusable navigation context
///
/// Every extraction method reads from the page loaded by the most recent
/// successful `navigate` call.
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError>;

    async fn page_title(&mut self) -> Result<String, FetchError>;

    /// Visible text of the document body
    async fn body_text(&mut self) -> Result<String, FetchError>;

    async fn all_anchors(&mut self) -> Result<Vec<Anchor>, FetchError>;

    /// Sets the per-navigation timeout
    fn set_timeout(&mut self, timeout: Duration);

    async fn close(&mut self) -> Result<(), FetchError>;
}

/// Opens the session configured by `settings`
pub async fn open_session(
    settings: &BrowserSettings,
) -> Result<Box<dyn BrowserSession>, FetchError> {
    let timeout = Duration::from_secs(settings.page_timeout_secs);
    let mut session: Box<dyn BrowserSession> = match settings.backend {
        BrowserBackend::Chrome => Box::new(ChromeSession::launch(settings).await?),
        BrowserBackend::Http => Box::new(HttpSession::new(settings)?),
    };
    session.set_timeout(timeout);
    tracing::info!("Opened {:?} browser session", settings.backend);
    Ok(session)
}

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None for script, mail, phone and data links, for same-page
/// fragments and for anything that does not resolve to http(s).
pub(crate) fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }
    absolute.set_fragment(None);
    Some(absolute.to_string())
}

/// Collapses whitespace and lower-cases anchor text
fn normalize_anchor_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://musterschule.de/start/index.html").unwrap()
    }

    #[test]
    fn test_resolve_relative_links() {
        assert_eq!(
            resolve_link("/leitbild", &base_url()),
            Some("https://musterschule.de/leitbild".to_string())
        );
        assert_eq!(
            resolve_link("profil.html", &base_url()),
            Some("https://musterschule.de/start/profil.html".to_string())
        );
    }

    #[test]
    fn test_resolve_strips_fragment() {
        assert_eq!(
            resolve_link("/konzept#ganztag", &base_url()),
            Some("https://musterschule.de/konzept".to_string())
        );
    }

    #[test]
    fn test_skip_non_navigational_links() {
        assert_eq!(resolve_link("javascript:void(0)", &base_url()), None);
        assert_eq!(resolve_link("MAILTO:info@musterschule.de", &base_url()), None);
        assert_eq!(resolve_link("tel:+49301234", &base_url()), None);
        assert_eq!(resolve_link("data:text/html,x", &base_url()), None);
        assert_eq!(resolve_link("#top", &base_url()), None);
        assert_eq!(resolve_link("  ", &base_url()), None);
        assert_eq!(resolve_link("ftp://files.musterschule.de", &base_url()), None);
    }

    #[test]
    fn test_anchor_text_is_normalized() {
        let anchor = Anchor::new("https://x.de", "  Unser\n  LEITBILD ");
        assert_eq!(anchor.text, "unser leitbild");
    }
}
