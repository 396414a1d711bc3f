//! Batch coordinator - the sequential enrichment loop
//!
//! One browser session is driven through every record in turn. Each record
//! is crawled, summarized and written back; the record set is persisted
//! periodically, on interrupt and at the end of the batch.

use crate::browser::{BrowserSession, PageFetcher};
use crate::config::Config;
use crate::crawler::interrupt::Interrupt;
use crate::crawler::orchestrator::{CrawlOutcome, Crawler};
use crate::record::{Record, Sentinel, TagSet};
use crate::search::{DuckDuckGoBackend, SearchResolver};
use crate::storage::{open_store, RecordStore};
use crate::summary::{summarize, ProviderRegistry};
use crate::ScoutError;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Which records a batch run visits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanScope {
    /// Only records whose summary is missing, short or an error marker
    Pending,
    /// Every record
    All,
}

/// Counters describing one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub summarized: usize,
    pub persistence_failures: usize,
    pub interrupted: bool,
}

/// Main batch coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    crawler: Crawler,
    registry: ProviderRegistry,
    store: Box<dyn RecordStore>,
}

impl Coordinator {
    pub fn new(
        config: Arc<Config>,
        crawler: Crawler,
        registry: ProviderRegistry,
        store: Box<dyn RecordStore>,
    ) -> Self {
        Self {
            config,
            crawler,
            registry,
            store,
        }
    }

    /// Wires up the production search backend, provider clients and CSV store
    pub fn from_config(config: Arc<Config>) -> Result<Self, ScoutError> {
        let backend = DuckDuckGoBackend::new(&config.search, &config.browser.user_agent)?;
        let resolver = SearchResolver::new(Box::new(backend), &config.search);
        let fetcher = PageFetcher::from_settings(&config.browser);
        let crawler = Crawler::new(Arc::clone(&config), resolver, fetcher)?;
        let registry = ProviderRegistry::from_env(&config.providers)?;
        if registry.is_empty() {
            tracing::warn!("No provider credentials found, summaries will be marked AIError");
        }
        let store = Box::new(open_store(Path::new(&config.storage.records_path)));

        Ok(Self::new(config, crawler, registry, store))
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Runs the batch loop over `records`
    ///
    /// Per-record failures end up as sentinels in the record. Persistence
    /// failures are counted and logged; they never stop the loop.
    pub async fn run(
        &self,
        session: &mut dyn BrowserSession,
        records: &mut [Record],
        scope: ScanScope,
        interrupt: &mut Interrupt,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let start_time = Instant::now();
        let total = records.len();
        let mut unsaved = 0;

        tracing::info!("Starting batch over {} records ({:?})", total, scope);

        for index in 0..total {
            if interrupt.is_triggered() {
                report.interrupted = true;
                break;
            }

            if scope == ScanScope::Pending
                && !records[index].needs_processing(&self.config.error_markers)
            {
                report.skipped += 1;
                continue;
            }

            let current = records[index].clone();
            let enriched = tokio::select! {
                biased;
                _ = interrupt.triggered() => None,
                enriched = self.process(&mut *session, &current, None, true) => Some(enriched),
            };

            let Some((updated, summarized)) = enriched else {
                tracing::warn!("Abandoned '{}' after interrupt", current.name);
                report.interrupted = true;
                break;
            };

            records[index] = updated;
            report.processed += 1;
            if summarized {
                report.summarized += 1;
            }

            unsaved += 1;
            if unsaved >= self.config.storage.save_every {
                if !self.persist(records) {
                    report.persistence_failures += 1;
                }
                unsaved = 0;
            }

            if report.processed % 10 == 0 {
                let elapsed = start_time.elapsed().as_secs_f64().max(f64::EPSILON);
                tracing::info!(
                    "Progress: {}/{} records, {} skipped, {:.2} records/min",
                    index + 1,
                    total,
                    report.skipped,
                    report.processed as f64 * 60.0 / elapsed
                );
            }
        }

        if (unsaved > 0 || report.interrupted) && !self.persist(records) {
            report.persistence_failures += 1;
        }

        tracing::info!(
            "Batch finished: {} processed, {} skipped, {} summarized{}",
            report.processed,
            report.skipped,
            report.summarized,
            if report.interrupted {
                " (interrupted)"
            } else {
                ""
            }
        );

        report
    }

    /// Re-runs a single record by name and saves the record set
    ///
    /// With `manual_url` the crawl starts at that URL instead of searching.
    /// Unlike a batch pass, any non-empty context is summarized even when no
    /// vocabulary entry matched.
    pub async fn enrich_one(
        &self,
        session: &mut dyn BrowserSession,
        records: &mut [Record],
        name: &str,
        manual_url: Option<&str>,
    ) -> Result<(), ScoutError> {
        let record = records
            .iter_mut()
            .find(|record| record.name == name)
            .ok_or_else(|| ScoutError::RecordNotFound(name.to_string()))?;

        let (updated, _) = self.process(session, record, manual_url, false).await;
        *record = updated;

        self.store.save(records)?;
        Ok(())
    }

    /// Crawls and summarizes one record, returning the updated copy
    async fn process(
        &self,
        session: &mut dyn BrowserSession,
        record: &Record,
        manual_url: Option<&str>,
        require_tags: bool,
    ) -> (Record, bool) {
        let input = manual_url.unwrap_or(record.name.as_str());
        let outcome = self.crawler.crawl(session, input, &record.locality).await;

        let mut updated = record.clone();
        updated.website = outcome.website();

        let (type_tags, keyword_tags, context) = match outcome {
            CrawlOutcome::Crawled(report) => {
                (report.type_tags, report.keyword_tags, report.context)
            }
            _ => (TagSet::new(), TagSet::new(), String::new()),
        };

        let has_tags = !type_tags.is_empty() || !keyword_tags.is_empty();
        let mut summarized = false;
        updated.summary = if (has_tags || !require_tags) && !context.trim().is_empty() {
            let summary = summarize(&context, &self.config, &self.registry).await;
            summarized = summary.is_summary();
            summary.to_string()
        } else {
            Sentinel::InsufficientContext.to_string()
        };
        updated.type_tags = type_tags;
        updated.keyword_tags = keyword_tags;

        tracing::info!(
            "{}: {} | types [{}] | keywords [{}]",
            updated.name,
            updated.website,
            updated.type_tags,
            updated.keyword_tags
        );

        (updated, summarized)
    }

    fn persist(&self, records: &[Record]) -> bool {
        match self.store.save(records) {
            Ok(()) => {
                tracing::debug!("Saved {} records", records.len());
                true
            }
            Err(e) => {
                tracing::warn!("Failed to save records: {}", e);
                false
            }
        }
    }
}
