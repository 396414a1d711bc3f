//! Chat-completions client shared by OpenAI, Groq and OpenRouter

use crate::config::ProviderSettings;
use crate::summary::providers::{CompletionProvider, ProviderError, ProviderId};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// Client for any endpoint speaking the OpenAI chat-completions protocol
pub struct OpenAiCompatibleProvider {
    id: ProviderId,
    http_client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        id: ProviderId,
        http_client: Client,
        api_key: impl Into<String>,
        settings: &ProviderSettings,
    ) -> Self {
        Self {
            id,
            http_client,
            api_key: api_key.into(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let start = std::time::Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut builder = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request);

        if self.id == ProviderId::OpenRouter {
            builder = builder
                .header("HTTP-Referer", "https://github.com/roster-scout")
                .header("X-Title", "Roster-Scout");
        }

        let response = builder.send().await.map_err(|e| {
            warn!(provider = %self.id, error = %e, "Completion request failed");
            ProviderError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(provider = %self.id, status = %status, "Completion API error");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(ProviderError::Empty)?;

        debug!(
            provider = %self.id,
            model = %self.model,
            duration_ms = start.elapsed().as_millis(),
            "Chat completion"
        );
        Ok(content)
    }
}
