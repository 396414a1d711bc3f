use crate::config::types::{
    BrowserSettings, Config, CrawlSettings, ProvidersConfig, SearchSettings, StorageSettings,
    SummarySettings,
};
use crate::ConfigError;
use url::Url;

/// Placeholder substituted with the crawl context when rendering the prompt
pub const PROMPT_PLACEHOLDER: &str = "{text}";

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_prompt_template(&config.prompt_template)?;
    validate_vocabulary("type-vocabulary", &config.type_vocabulary)?;
    validate_vocabulary("keyword-vocabulary", &config.keyword_vocabulary)?;
    validate_vocabulary("priority-phrases-tier1", &config.priority_phrases_tier1)?;
    validate_vocabulary("priority-phrases-tier2", &config.priority_phrases_tier2)?;
    validate_crawl_settings(&config.crawl)?;
    validate_search_settings(&config.search)?;
    validate_browser_settings(&config.browser)?;
    validate_summary_settings(&config.summary)?;
    validate_providers(&config.providers)?;
    validate_storage_settings(&config.storage)?;
    Ok(())
}

/// The template must contain exactly one substitution point
fn validate_prompt_template(template: &str) -> Result<(), ConfigError> {
    let count = template.matches(PROMPT_PLACEHOLDER).count();
    if count != 1 {
        return Err(ConfigError::Validation(format!(
            "prompt-template must contain exactly one {} placeholder, found {}",
            PROMPT_PLACEHOLDER, count
        )));
    }
    Ok(())
}

/// Vocabulary entries must be non-blank
fn validate_vocabulary(key: &str, entries: &[String]) -> Result<(), ConfigError> {
    if entries.iter().any(|entry| entry.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "{} cannot contain empty entries",
            key
        )));
    }
    Ok(())
}

fn validate_crawl_settings(crawl: &CrawlSettings) -> Result<(), ConfigError> {
    if crawl.max_depth < 1 {
        return Err(ConfigError::Validation(
            "crawl.max-depth must be >= 1".to_string(),
        ));
    }

    for (key, cap) in [
        ("tier1-cap-auto", crawl.tier1_cap_auto),
        ("tier1-cap-manual", crawl.tier1_cap_manual),
        ("tier2-cap", crawl.tier2_cap),
    ] {
        if cap < 1 {
            return Err(ConfigError::Validation(format!(
                "crawl.{} must be >= 1, got {}",
                key, cap
            )));
        }
    }

    if crawl.chunk_chars < 1 {
        return Err(ConfigError::Validation(
            "crawl.chunk-chars must be >= 1".to_string(),
        ));
    }

    if let Some(site) = &crawl.directory_fallback_site {
        validate_domain_pattern(site)?;
    }

    Ok(())
}

fn validate_search_settings(search: &SearchSettings) -> Result<(), ConfigError> {
    Url::parse(&search.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search.endpoint: {}", e)))?;

    if search.max_attempts < 1 || search.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "search.max-attempts must be between 1 and 10, got {}",
            search.max_attempts
        )));
    }

    if search.max_results < 1 {
        return Err(ConfigError::Validation(
            "search.max-results must be >= 1".to_string(),
        ));
    }

    for pattern in &search.blocklist {
        validate_domain_pattern(pattern)?;
    }

    Ok(())
}

fn validate_browser_settings(browser: &BrowserSettings) -> Result<(), ConfigError> {
    if !(15..=25).contains(&browser.page_timeout_secs) {
        return Err(ConfigError::Validation(format!(
            "browser.page-timeout-secs must be between 15 and 25, got {}",
            browser.page_timeout_secs
        )));
    }

    if browser.settle_ms > 10_000 {
        return Err(ConfigError::Validation(format!(
            "browser.settle-ms must be <= 10000ms, got {}ms",
            browser.settle_ms
        )));
    }

    Ok(())
}

fn validate_summary_settings(summary: &SummarySettings) -> Result<(), ConfigError> {
    if summary.max_context_chars < summary.min_context_chars {
        return Err(ConfigError::Validation(format!(
            "summary.max-context-chars ({}) must be >= summary.min-context-chars ({})",
            summary.max_context_chars, summary.min_context_chars
        )));
    }
    Ok(())
}

fn validate_providers(providers: &ProvidersConfig) -> Result<(), ConfigError> {
    for (id, settings) in providers.all() {
        Url::parse(&settings.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base-url for provider {}: {}", id, e))
        })?;

        if settings.model.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "model for provider {} cannot be empty",
                id
            )));
        }
    }
    Ok(())
}

fn validate_storage_settings(storage: &StorageSettings) -> Result<(), ConfigError> {
    if storage.records_path.is_empty() {
        return Err(ConfigError::Validation(
            "storage.records-path cannot be empty".to_string(),
        ));
    }

    if storage.save_every < 1 {
        return Err(ConfigError::Validation(format!(
            "storage.save-every must be >= 1, got {}",
            storage.save_every
        )));
    }

    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    if let Some(domain) = pattern.strip_prefix("*.") {
        validate_domain_string(domain)
    } else {
        validate_domain_string(pattern)
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
