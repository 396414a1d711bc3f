//! Static HTML session over reqwest
//!
//! No script execution happens here; the visible text is whatever the server
//! renders. Useful where no Chromium binary is available and for tests.

use crate::browser::{resolve_link, Anchor, BrowserSession, FetchError};
use crate::config::BrowserSettings;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

/// Elements whose text never reaches the reader
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Builds an HTTP client with the session's user agent
///
/// # Example
///
/// ```no_run
/// use roster_scout::browser::build_http_client;
///
/// let client = build_http_client("Mozilla/5.0 (compatible)").unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Document held after a successful navigation
struct LoadedDocument {
    url: Url,
    html: String,
}

/// Browser session backed by plain HTTP requests
pub struct HttpSession {
    client: Client,
    timeout: Duration,
    current: Option<LoadedDocument>,
}

impl HttpSession {
    pub fn new(settings: &BrowserSettings) -> Result<Self, FetchError> {
        let client = build_http_client(&settings.user_agent)
            .map_err(|e| FetchError::Launch(e.to_string()))?;
        Ok(Self::with_client(
            client,
            Duration::from_secs(settings.page_timeout_secs),
        ))
    }

    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            current: None,
        }
    }

    fn document(&self) -> Result<&LoadedDocument, FetchError> {
        self.current.as_ref().ok_or(FetchError::NoPage)
    }
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        self.current = None;

        let navigation_error = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(navigation_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(FetchError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(navigation_error)?;

        self.current = Some(LoadedDocument {
            url: final_url,
            html,
        });
        Ok(())
    }

    async fn page_title(&mut self) -> Result<String, FetchError> {
        let document = self.document()?;
        Ok(extract_title(&document.html))
    }

    async fn body_text(&mut self) -> Result<String, FetchError> {
        let document = self.document()?;
        Ok(extract_visible_text(&document.html))
    }

    async fn all_anchors(&mut self) -> Result<Vec<Anchor>, FetchError> {
        let document = self.document()?;
        Ok(extract_anchors(&document.html, &document.url))
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        self.current = None;
        Ok(())
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Extracts the trimmed `<title>` text, or an empty string
pub(crate) fn extract_title(html: &str) -> String {
    let document = Html::parse_document(html);
    let Some(title_selector) = selector("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Extracts the body's visible text, one text node per line
pub(crate) fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Some(body_selector) = selector("body") else {
        return String::new();
    };
    let Some(body) = document.select(&body_selector).next() else {
        return String::new();
    };

    let mut parts = Vec::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        let text = text.trim();
        if !text.is_empty() {
            parts.push(text.to_string());
        }
    }
    parts.join("\n")
}

/// Extracts every followable anchor in document order
pub(crate) fn extract_anchors(html: &str, base_url: &Url) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let Some(a_selector) = selector("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let absolute = resolve_link(href, base_url)?;
            Some(Anchor::new(absolute, &anchor_text(&element)))
        })
        .collect()
}

/// Visible text of an anchor, falling back to its title attribute
fn anchor_text(element: &ElementRef) -> String {
    let text = element.text().collect::<Vec<_>>().join(" ");
    if text.trim().is_empty() {
        element.value().attr("title").unwrap_or("").to_string()
    } else {
        text
    }
}
