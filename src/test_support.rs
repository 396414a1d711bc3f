//! In-memory stand-ins for the browser, search backend and providers

use crate::browser::{Anchor, BrowserSession, FetchError};
use crate::search::{SearchBackend, SearchError, SearchHit};
use crate::summary::{CompletionProvider, ProviderError, ProviderId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
struct FakePage {
    title: String,
    body: String,
    links: Vec<Anchor>,
}

/// Browser session serving canned pages by URL
#[derive(Debug, Default)]
pub struct FakeSession {
    pages: HashMap<String, FakePage>,
    hanging: HashSet<String>,
    current: Option<FakePage>,
    pub visits: Vec<String>,
    pub closed: bool,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, title: &str, body: &str, links: &[(&str, &str)]) -> Self {
        self.pages.insert(
            url.to_string(),
            FakePage {
                title: title.to_string(),
                body: body.to_string(),
                links: links
                    .iter()
                    .map(|(href, text)| Anchor::new(*href, text))
                    .collect(),
            },
        );
        self
    }

    /// Navigation to `url` never completes
    pub fn hanging(mut self, url: &str) -> Self {
        self.hanging.insert(url.to_string());
        self
    }

    fn current(&self) -> Result<&FakePage, FetchError> {
        self.current.as_ref().ok_or(FetchError::NoPage)
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        self.visits.push(url.to_string());
        self.current = None;

        if self.hanging.contains(url) {
            futures::future::pending::<()>().await;
        }

        match self.pages.get(url) {
            Some(page) => {
                self.current = Some(page.clone());
                Ok(())
            }
            None => Err(FetchError::Navigation {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }

    async fn page_title(&mut self) -> Result<String, FetchError> {
        Ok(self.current()?.title.clone())
    }

    async fn body_text(&mut self) -> Result<String, FetchError> {
        Ok(self.current()?.body.clone())
    }

    async fn all_anchors(&mut self) -> Result<Vec<Anchor>, FetchError> {
        Ok(self.current()?.links.clone())
    }

    fn set_timeout(&mut self, _timeout: Duration) {}

    async fn close(&mut self) -> Result<(), FetchError> {
        self.closed = true;
        Ok(())
    }
}

/// Search backend returning fixed hits and counting calls
#[derive(Debug, Clone, Default)]
pub struct FakeSearch {
    hits: Vec<SearchHit>,
    fail_first: usize,
    always_fail: bool,
    calls: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl FakeSearch {
    pub fn with_hits(urls: &[&str]) -> Self {
        Self {
            hits: urls
                .iter()
                .map(|url| SearchHit {
                    url: url.to_string(),
                    title: String::new(),
                    snippet: String::new(),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            always_fail: true,
            ..Self::default()
        }
    }

    /// The first `n` calls fail with a transport error
    pub fn failing_first(mut self, n: usize) -> Self {
        self.fail_first = n;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SearchBackend for FakeSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        if self.always_fail || call < self.fail_first {
            return Err(SearchError::Status(503));
        }
        Ok(self.hits.clone())
    }
}

/// Shared view of a [`FakeProvider`]'s traffic
#[derive(Debug, Clone, Default)]
pub struct ProviderLog {
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ProviderLog {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

/// Provider that answers with fixed text or always fails
pub struct FakeProvider {
    id: ProviderId,
    answer: Option<String>,
    log: ProviderLog,
}

impl FakeProvider {
    pub fn answering(id: ProviderId, answer: &str) -> Self {
        Self {
            id,
            answer: Some(answer.to_string()),
            log: ProviderLog::default(),
        }
    }

    pub fn failing(id: ProviderId) -> Self {
        Self {
            id,
            answer: None,
            log: ProviderLog::default(),
        }
    }

    pub fn calls_handle(&self) -> ProviderLog {
        self.log.clone()
    }

    pub fn prompts_handle(&self) -> ProviderLog {
        self.log.clone()
    }
}

#[async_trait]
impl CompletionProvider for FakeProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.log.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.log.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        match &self.answer {
            Some(answer) => Ok(answer.clone()),
            None => Err(ProviderError::Api {
                status: 429,
                body: "quota exceeded".to_string(),
            }),
        }
    }
}
