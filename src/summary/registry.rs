//! Provider clients built once at startup

use crate::config::{ProviderSettings, ProvidersConfig};
use crate::summary::gemini::GeminiProvider;
use crate::summary::openai::OpenAiCompatibleProvider;
use crate::summary::providers::{CompletionProvider, ProviderId};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// Completion clients keyed by provider
///
/// A provider is present only if a credential was supplied for it.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Box<dyn CompletionProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a client for every provider whose credential variable is set
    pub fn from_env(config: &ProvidersConfig) -> Result<Self, reqwest::Error> {
        let credentials: HashMap<ProviderId, String> = ProviderId::ALL
            .iter()
            .filter_map(|id| {
                let settings = config.settings(*id);
                std::env::var(&settings.api_key_env)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
                    .map(|key| (*id, key))
            })
            .collect();
        Self::from_credentials(config, &credentials)
    }

    /// Builds a client for every provider with an entry in `credentials`
    pub fn from_credentials(
        config: &ProvidersConfig,
        credentials: &HashMap<ProviderId, String>,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let mut registry = Self::new();
        for id in ProviderId::ALL {
            if let Some(key) = credentials.get(&id) {
                let settings = config.settings(id);
                registry.insert(build_provider(id, http_client.clone(), key, &settings));
            }
        }

        tracing::info!("Configured providers: {:?}", registry.configured());
        Ok(registry)
    }

    /// Adds or replaces the client for the provider's id
    pub fn insert(&mut self, provider: Box<dyn CompletionProvider>) {
        self.providers.insert(provider.id(), provider);
    }

    pub fn get(&self, id: ProviderId) -> Option<&dyn CompletionProvider> {
        self.providers.get(&id).map(|p| p.as_ref())
    }

    /// Configured provider ids in canonical order
    pub fn configured(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| self.providers.contains_key(id))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Builds the client implementation matching the provider's protocol
pub fn build_provider(
    id: ProviderId,
    http_client: Client,
    api_key: &str,
    settings: &ProviderSettings,
) -> Box<dyn CompletionProvider> {
    match id {
        ProviderId::Gemini => Box::new(GeminiProvider::new(http_client, api_key, settings)),
        ProviderId::OpenAi | ProviderId::Groq | ProviderId::OpenRouter => Box::new(
            OpenAiCompatibleProvider::new(id, http_client, api_key, settings),
        ),
    }
}
