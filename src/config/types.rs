use crate::summary::ProviderId;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// Main configuration structure for Roster-Scout
///
/// The top-level keys form the classification snapshot that stays read-only
/// for a whole pipeline run. The nested tables tune the crawl, search,
/// browser, summary, provider, storage and roster layers. Every key is
/// optional and unknown keys are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Organization types matched by substring against title and body
    pub type_vocabulary: Vec<String>,

    /// Keywords matched with a leading word boundary
    pub keyword_vocabulary: Vec<String>,

    /// Anchor-text phrases that qualify a link on the front page
    pub priority_phrases_tier1: Vec<String>,

    /// Anchor-text phrases that qualify a link on tier-1 pages
    pub priority_phrases_tier2: Vec<String>,

    /// Providers tried in order until one returns a completion
    pub provider_priority: Vec<ProviderId>,

    /// Prompt with a single `{text}` substitution point
    pub prompt_template: String,

    pub sensitivity: Sensitivity,

    /// Summary values that mark a record as needing another pass
    pub error_markers: BTreeSet<String>,

    pub crawl: CrawlSettings,
    pub search: SearchSettings,
    pub browser: BrowserSettings,
    pub summary: SummarySettings,
    pub providers: ProvidersConfig,
    pub storage: StorageSettings,
    pub roster: RosterSettings,
}

/// Content validation mode applied to resolved front pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    #[default]
    Normal,
    Strict,
}

/// Link traversal settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlSettings {
    /// Number of link levels followed below the front page
    pub max_depth: u32,

    /// Tier-1 link cap when the input was resolved through search
    pub tier1_cap_auto: usize,

    /// Tier-1 link cap when the input was an explicit URL
    pub tier1_cap_manual: usize,

    /// Links followed per parent page at depth two and below
    pub tier2_cap: usize,

    /// Characters kept from each page for the summary context
    pub chunk_chars: usize,

    /// Appended to "name locality" when building the search query
    pub search_suffix: String,

    /// Anchor-text fragments never followed in manual mode
    pub navigation_blocklist: Vec<String>,

    /// Directory site searched when no type tag was found
    pub directory_fallback_site: Option<String>,
}

/// Search backend settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchSettings {
    /// HTML search endpoint
    pub endpoint: String,

    /// Region code passed to the backend (e.g. "de-de")
    pub region: String,

    /// Number of results considered per query
    pub max_results: usize,

    /// Attempts on transport failure
    pub max_attempts: u32,

    /// Fixed delay between attempts (milliseconds)
    pub backoff_ms: u64,

    /// Domains never accepted as a homepage (supports "*." wildcards)
    pub blocklist: Vec<String>,
}

/// Page fetcher backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserBackend {
    /// Headless Chromium with client-side rendering
    #[default]
    Chrome,
    /// Plain HTTP with static HTML parsing
    Http,
}

/// Browser session settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserSettings {
    pub backend: BrowserBackend,

    /// Hard per-navigation timeout (seconds)
    pub page_timeout_secs: u64,

    /// Wait after navigation so client-side rendering can finish (milliseconds)
    pub settle_ms: u64,

    pub user_agent: String,
}

/// Summary dispatch settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SummarySettings {
    /// Contexts shorter than this are never sent to a provider
    pub min_context_chars: usize,

    /// Context characters substituted into the prompt
    pub max_context_chars: usize,
}

/// Resolved per-provider connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub model: String,
    pub base_url: String,

    /// Environment variable holding the credential
    pub api_key_env: String,
}

/// Optional overrides for one provider; unset keys keep the provider's defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProviderOverrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key_env: Option<String>,
}

/// Connection overrides for every known provider
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: ProviderOverrides,
    pub gemini: ProviderOverrides,
    pub groq: ProviderOverrides,
    pub openrouter: ProviderOverrides,
}

/// Record file settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageSettings {
    /// Primary CSV file; the backup lives next to it with a `.bak` suffix
    pub records_path: String,

    /// Processed records between periodic saves
    pub save_every: usize,
}

/// External roster import settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RosterSettings {
    pub name_column: usize,
    pub locality_column: usize,

    /// Names must be longer than this many characters
    pub min_name_length: usize,

    /// Case-insensitive fragment every accepted name must contain
    pub required_substring: Option<String>,

    pub has_headers: bool,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            type_vocabulary: strings(&[
                "Grundschule",
                "Hauptschule",
                "Realschule",
                "Gymnasium",
                "Gesamtschule",
                "Förderschule",
                "Berufsschule",
                "Verbundschule",
                "Mittelstufenschule",
                "Oberstufengymnasium",
            ]),
            keyword_vocabulary: strings(&[
                "MINT",
                "Sport",
                "Musik",
                "Gesellschaftswissenschaften",
                "Sprachen",
                "bilingual",
                "themenorientiert",
                "Makerspace",
                "Charakter",
                "Montessori",
                "Waldorf",
                "Jenaplan",
                "jahrgangsübergreifend",
                "altersübergreifend",
                "Ganztag",
            ]),
            priority_phrases_tier1: strings(&[
                "Schulprofil",
                "Schulprogramm",
                "Leitbild",
                "Über uns",
                "Unsere Schule",
                "Wir über uns",
            ]),
            priority_phrases_tier2: strings(&[
                "Leitbild",
                "Konzept",
                "Pädagogik",
                "Schwerpunkte",
                "Ganztag",
                "Angebote",
                "AGs",
                "Förderung",
            ]),
            provider_priority: vec![
                ProviderId::OpenAi,
                ProviderId::Gemini,
                ProviderId::Groq,
                ProviderId::OpenRouter,
            ],
            prompt_template: "You are analysing excerpts from an organization's website.\n\
                 Summarize its educational concept.\n\
                 Ignore navigation text.\n\
                 At most 3 sentences.\n\n\
                 Text:\n{text}"
                .to_string(),
            sensitivity: Sensitivity::Normal,
            error_markers: [
                "NotFound",
                "Unreachable",
                "NoData",
                "AIError",
                "InsufficientContext",
                "QUOTA",
                "Error",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            crawl: CrawlSettings::default(),
            search: SearchSettings::default(),
            browser: BrowserSettings::default(),
            summary: SummarySettings::default(),
            providers: ProvidersConfig::default(),
            storage: StorageSettings::default(),
            roster: RosterSettings::default(),
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_depth: 2,
            tier1_cap_auto: 2,
            tier1_cap_manual: 3,
            tier2_cap: 2,
            chunk_chars: 2500,
            search_suffix: "homepage".to_string(),
            navigation_blocklist: strings(&[
                "impressum",
                "datenschutz",
                "privacy",
                "login",
                "anmelden",
                "kontakt",
                "contact",
                "sitemap",
            ]),
            directory_fallback_site: None,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
            region: "de-de".to_string(),
            max_results: 5,
            max_attempts: 3,
            backoff_ms: 1500,
            blocklist: strings(&["*.wikipedia.org", "*.facebook.com", "*.instagram.com"]),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            backend: BrowserBackend::Chrome,
            page_timeout_secs: 25,
            settle_ms: 1500,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            min_context_chars: 50,
            max_context_chars: 15_000,
        }
    }
}

impl ProvidersConfig {
    fn overrides(&self, id: ProviderId) -> &ProviderOverrides {
        match id {
            ProviderId::OpenAi => &self.openai,
            ProviderId::Gemini => &self.gemini,
            ProviderId::Groq => &self.groq,
            ProviderId::OpenRouter => &self.openrouter,
        }
    }

    /// Returns the effective settings for one provider
    pub fn settings(&self, id: ProviderId) -> ProviderSettings {
        let defaults = id.default_settings();
        let overrides = self.overrides(id);
        ProviderSettings {
            model: overrides.model.clone().unwrap_or(defaults.model),
            base_url: overrides.base_url.clone().unwrap_or(defaults.base_url),
            api_key_env: overrides.api_key_env.clone().unwrap_or(defaults.api_key_env),
        }
    }

    /// Returns every provider's effective settings keyed by id
    pub fn all(&self) -> BTreeMap<ProviderId, ProviderSettings> {
        ProviderId::ALL
            .iter()
            .map(|id| (*id, self.settings(*id)))
            .collect()
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            records_path: "records.csv".to_string(),
            save_every: 5,
        }
    }
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            name_column: 0,
            locality_column: 2,
            min_name_length: 3,
            required_substring: None,
            has_headers: false,
        }
    }
}

impl Config {
    /// Returns the phrase tier used to qualify links at the given depth
    ///
    /// Depth 1 uses tier 1, every deeper level uses tier 2.
    pub fn phrases_for_depth(&self, depth: u32) -> &[String] {
        if depth <= 1 {
            &self.priority_phrases_tier1
        } else {
            &self.priority_phrases_tier2
        }
    }
}
