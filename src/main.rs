//! Roster-Scout main entry point
//!
//! This is the command-line interface for the Roster-Scout enrichment pipeline.

use anyhow::Context;
use clap::Parser;
use roster_scout::browser::open_session;
use roster_scout::config::{load_config_or_default, Config};
use roster_scout::crawler::{Coordinator, Interrupt, ScanScope};
use roster_scout::output::{print_statistics, RosterStatistics};
use roster_scout::record::{merge_roster, Record};
use roster_scout::storage::RecordStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Roster-Scout: website, tag and summary enrichment for organization rosters
///
/// Roster-Scout resolves each organization's homepage, follows a few
/// priority links on the same site, tags it from configurable vocabularies
/// and asks a chain of language-model providers for a short summary.
#[derive(Parser, Debug)]
#[command(name = "roster-scout")]
#[command(version = "1.0.0")]
#[command(about = "Roster enrichment crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults if missing)
    #[arg(value_name = "CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Merge new organizations from a roster CSV before running
    #[arg(long, value_name = "ROSTER")]
    import: Option<PathBuf>,

    /// Process every record, not only pending ones
    #[arg(long)]
    rescan: bool,

    /// Re-run a single record by name
    #[arg(long, value_name = "NAME")]
    only: Option<String>,

    /// Start URL for --only instead of searching
    #[arg(long, value_name = "URL", requires = "only")]
    url: Option<String>,

    /// Validate config and show what would be processed without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the record file and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_or_default(&cli.config) {
        Ok((config, hash)) => {
            if let Some(hash) = hash {
                tracing::info!("Configuration loaded successfully (hash: {})", hash);
            }
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    let config = Arc::new(config);

    let coordinator = Coordinator::from_config(Arc::clone(&config))
        .context("Failed to initialize pipeline")?;
    let mut records = coordinator
        .store()
        .load()
        .with_context(|| format!("Failed to load {}", config.storage.records_path))?;
    tracing::info!("Loaded {} records", records.len());

    if let Some(roster) = &cli.import {
        handle_import(&coordinator, &config, &mut records, roster)?;
    }

    // Handle different modes
    if cli.stats {
        handle_stats(&config, &records);
    } else if cli.dry_run {
        handle_dry_run(&config, &records, cli.rescan);
    } else {
        handle_run(&coordinator, &config, &mut records, &cli).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("roster_scout=info,warn"),
            1 => EnvFilter::new("roster_scout=debug,info"),
            2 => EnvFilter::new("roster_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --import: merges a roster CSV and saves the grown record set
fn handle_import(
    coordinator: &Coordinator,
    config: &Config,
    records: &mut Vec<Record>,
    roster: &Path,
) -> anyhow::Result<()> {
    let added = merge_roster(records, roster, &config.roster)
        .with_context(|| format!("Failed to import roster {}", roster.display()))?;
    if added > 0 {
        coordinator.store().save(records)?;
    }
    println!("Imported {} new records from {}", added, roster.display());
    Ok(())
}

/// Handles the --stats mode: shows statistics from the record file
fn handle_stats(config: &Config, records: &[Record]) {
    println!("Records: {}\n", config.storage.records_path);
    let stats = RosterStatistics::from_records(records, &config.error_markers);
    print_statistics(&stats);
}

/// Handles the --dry-run mode: validates config and shows what would be processed
fn handle_dry_run(config: &Config, records: &[Record], rescan: bool) {
    println!("=== Roster-Scout Dry Run ===\n");

    println!("Crawl Configuration:");
    println!("  Max depth: {}", config.crawl.max_depth);
    println!(
        "  Tier-1 caps: {} (search) / {} (manual URL)",
        config.crawl.tier1_cap_auto, config.crawl.tier1_cap_manual
    );
    println!("  Tier-2 cap: {}", config.crawl.tier2_cap);
    println!("  Sensitivity: {:?}", config.sensitivity);
    if let Some(site) = &config.crawl.directory_fallback_site {
        println!("  Directory fallback: {}", site);
    }

    println!("\nBrowser:");
    println!("  Backend: {:?}", config.browser.backend);
    println!("  Page timeout: {}s", config.browser.page_timeout_secs);

    println!("\nVocabularies:");
    println!("  Types: {}", config.type_vocabulary.len());
    println!("  Keywords: {}", config.keyword_vocabulary.len());

    println!("\nProvider priority:");
    for id in &config.provider_priority {
        let settings = config.providers.settings(*id);
        let configured = std::env::var(&settings.api_key_env).is_ok();
        println!(
            "  - {} ({}){}",
            id.tag(),
            settings.model,
            if configured { "" } else { " [no credential]" }
        );
    }

    let pending: Vec<&Record> = records
        .iter()
        .filter(|record| rescan || record.needs_processing(&config.error_markers))
        .collect();

    println!("\nRecords: {}", config.storage.records_path);
    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would process {} of {} records",
        pending.len(),
        records.len()
    );
    for record in pending.iter().take(20) {
        println!("  * {} ({})", record.name, record.locality);
    }
    if pending.len() > 20 {
        println!("  ... and {} more", pending.len() - 20);
    }
}

/// Runs the batch (or a single record) with one browser session
async fn handle_run(
    coordinator: &Coordinator,
    config: &Config,
    records: &mut [Record],
    cli: &Cli,
) -> anyhow::Result<()> {
    let mut session = open_session(&config.browser)
        .await
        .context("Failed to open browser session")?;

    let result = match &cli.only {
        Some(name) => coordinator
            .enrich_one(session.as_mut(), records, name, cli.url.as_deref())
            .await
            .map_err(anyhow::Error::from),
        None => {
            let scope = if cli.rescan {
                ScanScope::All
            } else {
                ScanScope::Pending
            };
            let mut interrupt = Interrupt::on_ctrl_c();
            let report = coordinator
                .run(session.as_mut(), records, scope, &mut interrupt)
                .await;
            if report.persistence_failures > 0 {
                tracing::warn!(
                    "{} saves failed; check {}",
                    report.persistence_failures,
                    config.storage.records_path
                );
            }
            Ok(())
        }
    };

    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close browser session: {}", e);
    }

    result
}
