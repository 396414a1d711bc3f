//! Crawler module for per-record crawling and batch coordination
//!
//! This module contains the core enrichment logic, including:
//! - Strict-mode content validation
//! - Vocabulary tagging
//! - Priority link selection
//! - The two-tier crawl itself
//! - Overall batch coordination

mod classifier;
mod coordinator;
pub mod interrupt;
mod links;
mod orchestrator;
mod validator;

pub use classifier::Classifier;
pub use coordinator::{BatchReport, Coordinator, ScanScope};
pub use interrupt::{Interrupt, InterruptHandle};
pub use links::{CrawlMode, LinkPrioritizer};
pub use orchestrator::{CrawlContext, CrawlOutcome, CrawlReport, Crawler, FRONT_PAGE_LABEL};
pub use validator::ContentValidator;

/// Returns at most the first `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
