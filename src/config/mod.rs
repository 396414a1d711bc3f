//! Configuration module for Roster-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A missing file or missing keys fall back to built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use roster_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will follow links up to depth {}", config.crawl.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserBackend, BrowserSettings, Config, CrawlSettings, ProviderOverrides, ProviderSettings,
    ProvidersConfig, RosterSettings, SearchSettings, Sensitivity, StorageSettings,
    SummarySettings,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_or_default, load_config_with_hash, parse_config,
};
pub use validation::{validate, PROMPT_PLACEHOLDER};
