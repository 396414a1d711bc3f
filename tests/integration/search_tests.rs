//! Integration tests for homepage resolution through the HTML search backend

use roster_scout::browser::build_http_client;
use roster_scout::config::SearchSettings;
use roster_scout::search::{DuckDuckGoBackend, SearchBackend, SearchError, SearchResolver};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESULTS_PAGE: &str = r#"<html><body>
    <div class="result results_links">
        <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fde.wikipedia.org%2Fwiki%2FMusterschule&amp;rut=1">Musterschule – Wikipedia</a>
    </div>
    <div class="result results_links">
        <a class="result__a" href="https://www.facebook.com/musterschule">Musterschule | Facebook</a>
    </div>
    <div class="result results_links">
        <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.musterschule-berlin.de%2F&amp;rut=2">Musterschule Berlin</a>
        <a class="result__snippet">Gymnasium in Berlin</a>
    </div>
</body></html>"#;

fn settings(server: &MockServer) -> SearchSettings {
    SearchSettings {
        endpoint: format!("{}/html/", server.uri()),
        backoff_ms: 0,
        ..SearchSettings::default()
    }
}

fn backend(settings: &SearchSettings) -> DuckDuckGoBackend {
    let client = build_http_client("roster-scout-test").expect("Failed to build client");
    DuckDuckGoBackend::with_client(client, settings).expect("Invalid endpoint")
}

#[tokio::test]
async fn test_resolver_skips_blocklisted_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html/"))
        .and(query_param("q", "Musterschule Berlin homepage"))
        .and(query_param("kl", "de-de"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(RESULTS_PAGE.as_bytes().to_vec(), "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings(&server);
    let resolver = SearchResolver::new(Box::new(backend(&settings)), &settings);

    assert_eq!(
        resolver.resolve("Musterschule Berlin homepage").await,
        Some("https://www.musterschule-berlin.de/".to_string())
    );
}

#[tokio::test]
async fn test_backend_caps_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(RESULTS_PAGE.as_bytes().to_vec(), "text/html"),
        )
        .mount(&server)
        .await;

    let settings = SearchSettings {
        max_results: 2,
        ..settings(&server)
    };
    let hits = backend(&settings).search("Musterschule").await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].url, "https://de.wikipedia.org/wiki/Musterschule");
    assert_eq!(hits[1].title, "Musterschule | Facebook");
}

#[tokio::test]
async fn test_throttled_search_is_retried_then_gives_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(202).set_body_string("challenge"))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings(&server);
    assert!(matches!(
        backend(&settings).search("Musterschule").await,
        Err(SearchError::Status(202))
    ));

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(202).set_body_string("challenge"))
        .expect(3)
        .mount(&server)
        .await;

    let resolver = SearchResolver::new(Box::new(backend(&settings)), &settings);
    assert_eq!(resolver.resolve("Musterschule Berlin homepage").await, None);
}

#[tokio::test]
async fn test_empty_results_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"<html><body>No results.</body></html>".to_vec(), "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings(&server);
    let resolver = SearchResolver::new(Box::new(backend(&settings)), &settings);
    assert_eq!(resolver.resolve("Unbekannte Schule").await, None);
}
