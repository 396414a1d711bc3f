//! Homepage resolution through a web search backend

mod duckduckgo;

pub use duckduckgo::DuckDuckGoBackend;

use crate::config::SearchSettings;
use crate::url::{is_blocked, parse_http_url};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a search backend
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Search backend returned HTTP {0}")]
    Status(u16),

    #[error("Invalid search endpoint: {0}")]
    Endpoint(String),
}

/// One organic search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// A region-scoped web search
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Returns results in ranking order
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError>;
}

/// Turns a query into the first acceptable result URL
///
/// Only transport failures are retried. A successful search without an
/// acceptable hit is a final answer.
pub struct SearchResolver {
    backend: Box<dyn SearchBackend>,
    blocklist: Vec<String>,
    max_attempts: u32,
    backoff: Duration,
}

impl SearchResolver {
    pub fn new(backend: Box<dyn SearchBackend>, settings: &SearchSettings) -> Self {
        Self {
            backend,
            blocklist: settings.blocklist.clone(),
            max_attempts: settings.max_attempts.max(1),
            backoff: Duration::from_millis(settings.backoff_ms),
        }
    }

    /// Returns the first non-blocklisted result URL, if any
    pub async fn resolve(&self, query: &str) -> Option<String> {
        for attempt in 1..=self.max_attempts {
            match self.backend.search(query).await {
                Ok(hits) => {
                    let found = self.first_acceptable(&hits);
                    match &found {
                        Some(url) => tracing::debug!("Resolved '{}' to {}", query, url),
                        None => tracing::debug!(
                            "No acceptable result for '{}' among {} hits",
                            query,
                            hits.len()
                        ),
                    }
                    return found;
                }
                Err(e) => {
                    tracing::warn!(
                        "Search attempt {}/{} for '{}' failed: {}",
                        attempt,
                        self.max_attempts,
                        query,
                        e
                    );
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }
        None
    }

    fn first_acceptable(&self, hits: &[SearchHit]) -> Option<String> {
        hits.iter().find_map(|hit| {
            let url = parse_http_url(&hit.url)?;
            if is_blocked(&url, &self.blocklist) {
                tracing::trace!("Skipping blocklisted result {}", hit.url);
                None
            } else {
                Some(hit.url.trim().to_string())
            }
        })
    }
}
