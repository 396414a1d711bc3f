//! Selection of outbound links worth following

use crate::browser::Anchor;
use crate::url::{parse_http_url, same_site};
use std::collections::HashSet;
use url::Url;

/// Anchor texts this short never qualify through the manual-mode rule
const MIN_MANUAL_ANCHOR_CHARS: usize = 2;

/// How the crawl's start URL was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Resolved from the organization's name through search
    Automatic,
    /// Supplied directly as a URL
    Manual,
}

/// Picks same-site links whose anchor text matches a phrase tier
#[derive(Debug, Clone)]
pub struct LinkPrioritizer {
    navigation_blocklist: Vec<String>,
}

impl LinkPrioritizer {
    pub fn new(navigation_blocklist: &[String]) -> Self {
        Self {
            navigation_blocklist: navigation_blocklist
                .iter()
                .map(|entry| entry.to_lowercase())
                .collect(),
        }
    }

    /// Returns up to `cap` qualifying link targets in first-seen order
    ///
    /// A link qualifies when it stays on `site` and its anchor text contains
    /// one of `phrases`. In manual mode any other non-trivial anchor text
    /// also qualifies unless it names a navigational page.
    pub fn select_candidates(
        &self,
        links: &[Anchor],
        site: &Url,
        phrases: &[String],
        mode: CrawlMode,
        cap: usize,
    ) -> Vec<String> {
        let phrases: Vec<String> = phrases.iter().map(|p| p.to_lowercase()).collect();
        let mut seen = HashSet::new();
        let mut selected = Vec::new();

        for link in links {
            if selected.len() >= cap {
                break;
            }

            let Some(target) = parse_http_url(&link.href) else {
                continue;
            };
            if !same_site(site, &target) {
                continue;
            }

            let text = link.text.to_lowercase();
            let qualifies = phrases.iter().any(|phrase| text.contains(phrase.as_str()))
                || (mode == CrawlMode::Manual && self.is_plain_content_link(&text));

            if qualifies && seen.insert(link.href.clone()) {
                selected.push(link.href.clone());
            }
        }

        selected
    }

    fn is_plain_content_link(&self, text: &str) -> bool {
        text.trim().chars().count() > MIN_MANUAL_ANCHOR_CHARS
            && !self
                .navigation_blocklist
                .iter()
                .any(|entry| text.contains(entry.as_str()))
    }
}
