//! Integration tests for the provider clients and the fallback chain

use roster_scout::config::{Config, ProviderOverrides, ProviderSettings};
use roster_scout::summary::{
    summarize, CompletionProvider, GeminiProvider, OpenAiCompatibleProvider, ProviderError,
    ProviderId, ProviderRegistry, SummaryOutcome,
};
use std::collections::HashMap;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTEXT: &str = "--- front page ---\nWir sind eine Grundschule mit Ganztag und jahrgangsübergreifendem Unterricht.";

fn settings(server: &MockServer, prefix: &str, model: &str) -> ProviderSettings {
    ProviderSettings {
        model: model.to_string(),
        base_url: format!("{}{}", server.uri(), prefix),
        api_key_env: "UNUSED".to_string(),
    }
}

fn chat_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": text } }]
    }))
}

#[tokio::test]
async fn test_openai_compatible_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-test",
            "messages": [{ "role": "user", "content": "Hallo" }]
        })))
        .respond_with(chat_response("  Eine kurze Antwort.  "))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiCompatibleProvider::new(
        ProviderId::OpenAi,
        reqwest::Client::new(),
        "sk-test",
        &settings(&server, "/v1", "gpt-test"),
    );

    assert_eq!(
        provider.complete("Hallo").await.unwrap(),
        "Eine kurze Antwort."
    );
}

#[tokio::test]
async fn test_openrouter_sends_attribution_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("x-title", "Roster-Scout"))
        .and(header("http-referer", "https://github.com/roster-scout"))
        .respond_with(chat_response("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiCompatibleProvider::new(
        ProviderId::OpenRouter,
        reqwest::Client::new(),
        "or-test",
        &settings(&server, "/api/v1", "meta-llama/test"),
    );

    assert_eq!(provider.complete("Hallo").await.unwrap(), "ok");
}

#[tokio::test]
async fn test_api_errors_are_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let provider = OpenAiCompatibleProvider::new(
        ProviderId::Groq,
        reqwest::Client::new(),
        "gsk-test",
        &settings(&server, "/openai/v1", "llama-test"),
    );

    match provider.complete("Hallo").await {
        Err(ProviderError::Api { status, body }) => {
            assert_eq!(status, 429);
            assert_eq!(body, "quota exceeded");
        }
        other => panic!("Expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gemini_empty_candidates_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .and(header("x-goog-api-key", "g-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(
        reqwest::Client::new(),
        "g-test",
        &settings(&server, "/v1beta", "gemini-test"),
    );

    assert!(matches!(
        provider.complete("Hallo").await,
        Err(ProviderError::Empty)
    ));
}

#[tokio::test]
async fn test_fallback_chain_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(chat_response("Eine Grundschule mit Ganztag."))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config {
        provider_priority: vec![
            ProviderId::Groq,
            ProviderId::Gemini,
            ProviderId::OpenRouter,
            ProviderId::OpenAi,
        ],
        ..Config::default()
    };
    let overrides = |prefix: &str, model: &str| ProviderOverrides {
        model: Some(model.to_string()),
        base_url: Some(format!("{}{}", server.uri(), prefix)),
        api_key_env: None,
    };
    config.providers.groq = overrides("/openai/v1", "llama-test");
    config.providers.gemini = overrides("/v1beta", "gemini-test");
    config.providers.openrouter = overrides("/api/v1", "meta-llama/test");

    // OpenAI has no credential and is never contacted
    let credentials = HashMap::from([
        (ProviderId::Groq, "gsk-test".to_string()),
        (ProviderId::Gemini, "g-test".to_string()),
        (ProviderId::OpenRouter, "or-test".to_string()),
    ]);
    let registry = ProviderRegistry::from_credentials(&config.providers, &credentials).unwrap();
    assert_eq!(
        registry.configured(),
        vec![ProviderId::Gemini, ProviderId::Groq, ProviderId::OpenRouter]
    );

    let outcome = summarize(CONTEXT, &config, &registry).await;
    assert_eq!(
        outcome,
        SummaryOutcome::Summary {
            provider: ProviderId::OpenRouter,
            text: "Eine Grundschule mit Ganztag.".to_string(),
        }
    );
    assert_eq!(
        outcome.to_string(),
        "[OpenRouter]: Eine Grundschule mit Ganztag."
    );
}
