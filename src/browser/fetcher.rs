//! Page fetching with settle delay and hard timeout

use crate::browser::{Anchor, BrowserSession, FetchError};
use crate::config::BrowserSettings;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Everything extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub title: String,
    pub body_text: String,
    pub links: Vec<Anchor>,
}

impl FetchedPage {
    /// A page with no extracted content
    pub fn empty(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    /// True when the page yielded no visible text
    pub fn is_empty(&self) -> bool {
        self.body_text.trim().is_empty()
    }

    /// Title and body joined for type matching
    pub fn title_and_body(&self) -> String {
        format!("{} {}", self.title, self.body_text)
    }
}

/// Drives a [`BrowserSession`] through one navigate-settle-extract cycle
#[derive(Debug, Clone)]
pub struct PageFetcher {
    settle: Duration,
    timeout: Duration,
}

impl PageFetcher {
    pub fn new(settle: Duration, timeout: Duration) -> Self {
        Self { settle, timeout }
    }

    pub fn from_settings(settings: &BrowserSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.settle_ms),
            Duration::from_secs(settings.page_timeout_secs),
        )
    }

    /// Fetches a page, reporting the failure kind
    pub async fn try_fetch(
        &self,
        session: &mut dyn BrowserSession,
        url: &str,
    ) -> Result<FetchedPage, FetchError> {
        let timed_out = || FetchError::Timeout {
            url: url.to_string(),
        };

        timeout(self.timeout, session.navigate(url))
            .await
            .map_err(|_| timed_out())??;

        if !self.settle.is_zero() {
            sleep(self.settle).await;
        }

        let extraction = async {
            let title = session.page_title().await?;
            let body_text = session.body_text().await?;
            let links = session.all_anchors().await?;
            Ok::<_, FetchError>(FetchedPage {
                url: url.to_string(),
                title,
                body_text,
                links,
            })
        };

        timeout(self.timeout, extraction)
            .await
            .map_err(|_| timed_out())?
    }

    /// Fetches a page, returning an empty page on any failure
    pub async fn fetch(&self, session: &mut dyn BrowserSession, url: &str) -> FetchedPage {
        match self.try_fetch(session, url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::debug!("Fetch failed for {}: {}", url, e);
                FetchedPage::empty(url)
            }
        }
    }
}
