//! Provider identities and the completion interface

use crate::config::ProviderSettings;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Known language-model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum ProviderId {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "groq")]
    Groq,
    #[serde(rename = "openrouter")]
    OpenRouter,
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [
        ProviderId::OpenAi,
        ProviderId::Gemini,
        ProviderId::Groq,
        ProviderId::OpenRouter,
    ];

    /// Configuration key of the provider
    pub fn key(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Groq => "groq",
            Self::OpenRouter => "openrouter",
        }
    }

    /// Label prefixed to every summary the provider produces
    pub fn tag(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Gemini => "Gemini",
            Self::Groq => "Groq",
            Self::OpenRouter => "OpenRouter",
        }
    }

    /// Built-in connection settings
    pub fn default_settings(&self) -> ProviderSettings {
        let (model, base_url, api_key_env) = match self {
            Self::OpenAi => ("gpt-4o-mini", "https://api.openai.com/v1", "OPENAI_API_KEY"),
            Self::Gemini => (
                "gemini-2.0-flash-exp",
                "https://generativelanguage.googleapis.com/v1beta",
                "GEMINI_API_KEY",
            ),
            Self::Groq => (
                "llama-3.3-70b-versatile",
                "https://api.groq.com/openai/v1",
                "GROQ_API_KEY",
            ),
            Self::OpenRouter => (
                "meta-llama/llama-3.3-70b-instruct",
                "https://openrouter.ai/api/v1",
                "OPENROUTER_API_KEY",
            ),
        };
        ProviderSettings {
            model: model.to_string(),
            base_url: base_url.to_string(),
            api_key_env: api_key_env.to_string(),
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Errors raised by a completion call
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection failed or timed out
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response (auth, quota, invalid request)
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Provider returned an empty completion")]
    Empty,
}

/// One language-model provider
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Sends a single-turn prompt and returns the completion text
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}
