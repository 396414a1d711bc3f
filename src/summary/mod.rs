//! Summary dispatch over a provider priority chain
//!
//! Providers are tried strictly one after another in the configured order.
//! The first completion wins; every failure moves on to the next provider.

mod gemini;
mod openai;
mod providers;
mod registry;

pub use gemini::GeminiProvider;
pub use openai::OpenAiCompatibleProvider;
pub use providers::{CompletionProvider, ProviderError, ProviderId};
pub use registry::{build_provider, ProviderRegistry};

use crate::config::{Config, PROMPT_PLACEHOLDER};
use crate::crawler::truncate_chars;
use crate::record::Sentinel;
use std::fmt;

/// Result of one summary dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// A provider produced a completion
    Summary { provider: ProviderId, text: String },
    /// The context was too short to send anywhere
    NoData,
    /// No configured provider returned a completion
    ProviderExhausted,
}

impl SummaryOutcome {
    pub fn is_summary(&self) -> bool {
        matches!(self, Self::Summary { .. })
    }
}

impl fmt::Display for SummaryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary { provider, text } => write!(f, "[{}]: {}", provider.tag(), text),
            Self::NoData => f.write_str(Sentinel::NoData.as_str()),
            Self::ProviderExhausted => f.write_str(Sentinel::AIError.as_str()),
        }
    }
}

/// Substitutes the (truncated) context into the prompt template
pub fn render_prompt(template: &str, context: &str, max_context_chars: usize) -> String {
    template.replacen(
        PROMPT_PLACEHOLDER,
        truncate_chars(context, max_context_chars),
        1,
    )
}

/// Summarizes `context` with the first provider that succeeds
pub async fn summarize(
    context: &str,
    config: &Config,
    registry: &ProviderRegistry,
) -> SummaryOutcome {
    if context.trim().chars().count() < config.summary.min_context_chars {
        return SummaryOutcome::NoData;
    }

    let prompt = render_prompt(
        &config.prompt_template,
        context,
        config.summary.max_context_chars,
    );

    for id in &config.provider_priority {
        let Some(provider) = registry.get(*id) else {
            tracing::trace!("Provider {} has no credential, skipping", id);
            continue;
        };

        match provider.complete(&prompt).await {
            Ok(text) => {
                tracing::debug!("Summary produced by {}", id);
                return SummaryOutcome::Summary {
                    provider: *id,
                    text,
                };
            }
            Err(e) => {
                tracing::warn!("Provider {} failed, trying next: {}", id, e);
            }
        }
    }

    SummaryOutcome::ProviderExhausted
}
