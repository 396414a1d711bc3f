//! Roster-Scout: website, tag and summary enrichment for organization rosters
//!
//! This crate resolves each organization's homepage, walks a few priority
//! links on the same site, tags the organization from configurable
//! vocabularies and asks a language-model provider chain for a short summary.
//! Results are kept in a CSV record file with backup rotation.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod search;
pub mod storage;
pub mod summary;
pub mod url;

#[cfg(test)]
pub(crate) mod test_support;

use thiserror::Error;

/// Main error type for Roster-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::FetchError),

    #[error("Search error: {0}")]
    Search(#[from] search::SearchError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Roster error: {0}")]
    Roster(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Roster-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, Sensitivity};
pub use crawler::{Coordinator, CrawlOutcome, Crawler, Interrupt, ScanScope};
pub use record::{Record, Sentinel, TagSet, Website};
pub use storage::{CsvRecordStore, RecordStore};
pub use summary::{summarize, ProviderId, ProviderRegistry, SummaryOutcome};
