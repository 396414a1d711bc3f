//! The per-record crawl
//!
//! Resolves a start URL, validates and classifies the front page, then walks
//! phrase-matched same-site links breadth first down to the configured depth.

use crate::browser::{BrowserSession, FetchedPage, PageFetcher};
use crate::config::{Config, Sensitivity};
use crate::crawler::classifier::Classifier;
use crate::crawler::links::{CrawlMode, LinkPrioritizer};
use crate::crawler::truncate_chars;
use crate::crawler::validator::ContentValidator;
use crate::record::{TagSet, Website};
use crate::search::SearchResolver;
use crate::url::parse_http_url;
use std::collections::HashSet;
use std::sync::Arc;

/// Label of the chunk taken from the start page
pub const FRONT_PAGE_LABEL: &str = "front page";

/// Labeled text chunks collected during one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlContext {
    chunk_chars: usize,
    chunks: Vec<(String, String)>,
}

impl CrawlContext {
    pub fn new(chunk_chars: usize) -> Self {
        Self {
            chunk_chars,
            chunks: Vec::new(),
        }
    }

    /// Appends a chunk, keeping at most `chunk_chars` characters of text
    pub fn push(&mut self, label: &str, text: &str) {
        let text = truncate_chars(text.trim(), self.chunk_chars).trim_end();
        if !text.is_empty() {
            self.chunks.push((label.to_string(), text.to_string()));
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Joins every chunk under its label, separated by blank lines
    pub fn render(&self) -> String {
        self.chunks
            .iter()
            .map(|(label, text)| format!("--- {} ---\n{}", label, text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Everything learned from a crawl that reached content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub url: String,
    pub type_tags: TagSet,
    pub keyword_tags: TagSet,
    pub context: String,
}

/// Result of one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// No start URL could be resolved
    NotFound,
    /// The start page returned no text
    Unreachable { url: String },
    /// Strict validation rejected the start page; the URL is kept
    Rejected { url: String },
    Crawled(CrawlReport),
}

impl CrawlOutcome {
    /// Website value to store on the record
    pub fn website(&self) -> Website {
        match self {
            Self::NotFound => Website::NotFound,
            Self::Unreachable { .. } => Website::Unreachable,
            Self::Rejected { url } => Website::Url(url.clone()),
            Self::Crawled(report) => Website::Url(report.url.clone()),
        }
    }

    /// Flattens into (website, joined type tags, joined keyword tags, context)
    pub fn into_fields(self) -> (String, String, String, String) {
        let website = self.website().to_string();
        match self {
            Self::Crawled(report) => (
                website,
                report.type_tags.joined(),
                report.keyword_tags.joined(),
                report.context,
            ),
            _ => (website, String::new(), String::new(), String::new()),
        }
    }
}

/// Composes resolution, fetching, validation, tagging and link selection
pub struct Crawler {
    config: Arc<Config>,
    resolver: SearchResolver,
    fetcher: PageFetcher,
    validator: ContentValidator,
    classifier: Classifier,
    prioritizer: LinkPrioritizer,
}

impl Crawler {
    pub fn new(
        config: Arc<Config>,
        resolver: SearchResolver,
        fetcher: PageFetcher,
    ) -> Result<Self, regex::Error> {
        let validator = ContentValidator::new()?;
        let classifier = Classifier::new(&config)?;
        let prioritizer = LinkPrioritizer::new(&config.crawl.navigation_blocklist);
        Ok(Self {
            config,
            resolver,
            fetcher,
            validator,
            classifier,
            prioritizer,
        })
    }

    /// Query sent to search for an organization's homepage
    pub fn search_query(&self, name: &str, locality: &str) -> String {
        [name, locality, self.config.crawl.search_suffix.as_str()]
            .iter()
            .flat_map(|part| part.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Crawls one organization
    ///
    /// `input` is either the organization's name or an explicit start URL.
    /// Failures never escape; they are reported through the outcome.
    pub async fn crawl(
        &self,
        session: &mut dyn BrowserSession,
        input: &str,
        locality: &str,
    ) -> CrawlOutcome {
        let (start_url, mode) = match parse_http_url(input) {
            Some(_) => (input.trim().to_string(), CrawlMode::Manual),
            None => {
                let query = self.search_query(input, locality);
                match self.resolver.resolve(&query).await {
                    Some(url) => (url, CrawlMode::Automatic),
                    None => {
                        tracing::debug!("No homepage found for '{}'", input);
                        return CrawlOutcome::NotFound;
                    }
                }
            }
        };

        let front = self.fetcher.fetch(session, &start_url).await;
        if front.is_empty() {
            return CrawlOutcome::Unreachable { url: start_url };
        }

        if self.config.sensitivity == Sensitivity::Strict
            && mode == CrawlMode::Automatic
            && !self.validator.is_official_page(&front.body_text)
        {
            tracing::debug!("Strict validation rejected {}", start_url);
            return CrawlOutcome::Rejected { url: start_url };
        }

        let Some(site) = parse_http_url(&start_url) else {
            return CrawlOutcome::Unreachable { url: start_url };
        };

        let mut type_tags = self.classifier.extract_type_tags(&front.title_and_body());
        let mut keyword_tags = TagSet::new();
        self.classifier
            .scan_keywords(&front.body_text, &mut keyword_tags);

        let mut context = CrawlContext::new(self.config.crawl.chunk_chars);
        context.push(FRONT_PAGE_LABEL, &front.body_text);

        // Anchor hrefs arrive normalized, so the parsed form counts as visited too
        let mut visited: HashSet<String> =
            HashSet::from([start_url.clone(), site.to_string(), front.url.clone()]);
        let mut frontier = vec![front];

        for depth in 1..=self.config.crawl.max_depth {
            // Deeper levels only run while automatic crawls still lack keywords
            if depth > 1 && (mode == CrawlMode::Manual || !keyword_tags.is_empty()) {
                break;
            }

            let phrases = self.config.phrases_for_depth(depth);
            let cap = self.link_cap(depth, mode);
            let mut next_level = Vec::new();

            for parent in &frontier {
                let candidates =
                    self.prioritizer
                        .select_candidates(&parent.links, &site, phrases, mode, cap);

                for url in candidates {
                    if !visited.insert(url.clone()) {
                        continue;
                    }

                    let page = self.fetcher.fetch(session, &url).await;
                    if page.is_empty() {
                        continue;
                    }

                    self.classifier
                        .scan_keywords(&page.body_text, &mut keyword_tags);
                    context.push(chunk_label(&page), &page.body_text);
                    if type_tags.is_empty() {
                        type_tags = self.classifier.extract_type_tags(&page.title_and_body());
                    }
                    next_level.push(page);
                }
            }

            tracing::trace!(
                "Depth {} of {} fetched {} pages",
                depth,
                start_url,
                next_level.len()
            );
            if next_level.is_empty() {
                break;
            }
            frontier = next_level;
        }

        if type_tags.is_empty() && mode == CrawlMode::Automatic {
            self.directory_fallback(session, input, locality, &mut type_tags, &mut context)
                .await;
        }

        CrawlOutcome::Crawled(CrawlReport {
            url: start_url,
            type_tags,
            keyword_tags,
            context: context.render(),
        })
    }

    fn link_cap(&self, depth: u32, mode: CrawlMode) -> usize {
        let crawl = &self.config.crawl;
        match (depth, mode) {
            (1, CrawlMode::Manual) => crawl.tier1_cap_manual,
            (1, CrawlMode::Automatic) => crawl.tier1_cap_auto,
            _ => crawl.tier2_cap,
        }
    }

    /// Looks the organization up on the configured directory site
    async fn directory_fallback(
        &self,
        session: &mut dyn BrowserSession,
        name: &str,
        locality: &str,
        type_tags: &mut TagSet,
        context: &mut CrawlContext,
    ) {
        let Some(directory) = &self.config.crawl.directory_fallback_site else {
            return;
        };

        let query = format!("site:{} {} {}", directory, name, locality);
        let Some(url) = self.resolver.resolve(query.trim()).await else {
            return;
        };

        let page = self.fetcher.fetch(session, &url).await;
        if page.is_empty() {
            return;
        }

        let found = self.classifier.extract_type_tags(&page.title_and_body());
        if !found.is_empty() {
            tracing::debug!("Directory {} supplied types {}", directory, found);
            type_tags.extend(&found);
            context.push(directory, &page.body_text);
        }
    }
}

fn chunk_label(page: &FetchedPage) -> &str {
    if page.title.trim().is_empty() {
        &page.url
    } else {
        page.title.trim()
    }
}
