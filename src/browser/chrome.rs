//! Headless Chromium session over the DevTools protocol

use crate::browser::{resolve_link, Anchor, BrowserSession, FetchError};
use crate::config::BrowserSettings;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

const BODY_TEXT_SCRIPT: &str = "document.body ? document.body.innerText : ''";

const ANCHORS_SCRIPT: &str = "Array.from(document.querySelectorAll('a[href]'))\
    .filter(a => !a.hasAttribute('download'))\
    .map(a => [a.href, (a.innerText || a.title || '')])";

/// Browser session driving one reused Chromium tab
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    timeout: Duration,
    current_url: Option<Url>,
}

impl ChromeSession {
    /// Launches a headless Chromium and opens a blank tab
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, FetchError> {
        let timeout = Duration::from_secs(settings.page_timeout_secs);
        let config = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", settings.user_agent))
            .build()
            .map_err(FetchError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        // The handler must be polled for the browser to make progress
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(FetchError::Launch(e.to_string()));
            }
        };

        Ok(Self {
            browser,
            page,
            handler,
            timeout,
            current_url: None,
        })
    }

    fn extraction_error(e: impl std::fmt::Display) -> FetchError {
        FetchError::Extraction(e.to_string())
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        self.current_url = None;

        match tokio::time::timeout(self.timeout, self.page.goto(url)).await {
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
            Ok(Err(e)) => {
                return Err(FetchError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
            Ok(Ok(_)) => {}
        }

        let landed = self
            .page
            .url()
            .await
            .map_err(Self::extraction_error)?
            .unwrap_or_else(|| url.to_string());

        self.current_url = Some(Url::parse(&landed).map_err(|e| FetchError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?);
        Ok(())
    }

    async fn page_title(&mut self) -> Result<String, FetchError> {
        if self.current_url.is_none() {
            return Err(FetchError::NoPage);
        }
        let title = self
            .page
            .get_title()
            .await
            .map_err(Self::extraction_error)?;
        Ok(title.unwrap_or_default().trim().to_string())
    }

    async fn body_text(&mut self) -> Result<String, FetchError> {
        if self.current_url.is_none() {
            return Err(FetchError::NoPage);
        }
        self.page
            .evaluate(BODY_TEXT_SCRIPT)
            .await
            .map_err(Self::extraction_error)?
            .into_value::<String>()
            .map_err(Self::extraction_error)
    }

    async fn all_anchors(&mut self) -> Result<Vec<Anchor>, FetchError> {
        let Some(base_url) = self.current_url.clone() else {
            return Err(FetchError::NoPage);
        };

        let raw: Vec<(String, String)> = self
            .page
            .evaluate(ANCHORS_SCRIPT)
            .await
            .map_err(Self::extraction_error)?
            .into_value()
            .map_err(Self::extraction_error)?;

        Ok(raw
            .into_iter()
            .filter_map(|(href, text)| {
                resolve_link(&href, &base_url).map(|absolute| Anchor::new(absolute, &text))
            })
            .collect())
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
        closed.map(|_| ()).map_err(|e| FetchError::Extraction(e.to_string()))
    }
}
