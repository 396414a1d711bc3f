//! Statistics over an enriched record set
//!
//! This module provides functionality for summarizing the record file
//! and displaying the result for `--stats`.

use crate::record::{Record, Website};
use crate::summary::ProviderId;
use std::collections::{BTreeMap, BTreeSet};

/// Record set statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterStatistics {
    /// Total number of records
    pub total: usize,

    /// Records carrying a provider summary
    pub enriched: usize,

    /// Records the next pending-only batch would visit
    pub pending: usize,

    pub not_found: usize,
    pub unreachable: usize,

    /// Summaries per producing provider
    pub summaries_by_provider: BTreeMap<ProviderId, usize>,

    /// Occurrences of each type tag
    pub type_tag_counts: BTreeMap<String, usize>,
}

impl RosterStatistics {
    /// Computes statistics for `records` under the given error markers
    pub fn from_records(records: &[Record], error_markers: &BTreeSet<String>) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            match record.website {
                Website::NotFound => stats.not_found += 1,
                Website::Unreachable => stats.unreachable += 1,
                Website::Url(_) => {}
            }

            if record.needs_processing(error_markers) {
                stats.pending += 1;
            }

            if let Some(provider) = summary_provider(&record.summary) {
                stats.enriched += 1;
                *stats.summaries_by_provider.entry(provider).or_default() += 1;
            }

            for tag in record.type_tags.iter() {
                *stats.type_tag_counts.entry(tag.clone()).or_default() += 1;
            }
        }

        stats
    }
}

/// Returns the provider whose tag prefixes the summary
fn summary_provider(summary: &str) -> Option<ProviderId> {
    ProviderId::ALL
        .into_iter()
        .find(|id| summary.starts_with(&format!("[{}]: ", id.tag())))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RosterStatistics) {
    println!("=== Roster Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", stats.total);
    println!(
        "  Enriched: {} ({:.1}%)",
        stats.enriched,
        percentage(stats.enriched, stats.total)
    );
    println!("  Pending: {}", stats.pending);
    println!("  Website not found: {}", stats.not_found);
    println!("  Website unreachable: {}", stats.unreachable);
    println!();

    if !stats.summaries_by_provider.is_empty() {
        println!("Summaries by Provider:");
        for (provider, count) in &stats.summaries_by_provider {
            println!("  {}: {}", provider.tag(), count);
        }
        println!();
    }

    if !stats.type_tag_counts.is_empty() {
        println!("Type Tags:");
        // Sort tags by count (descending), then by name
        let mut tag_counts: Vec<_> = stats.type_tag_counts.iter().collect();
        tag_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (tag, count) in tag_counts {
            println!("  {}: {}", tag, count);
        }
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
