//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small organization website and a
//! language-model endpoint, and run the full batch cycle end-to-end over a
//! plain HTTP browser session.

use async_trait::async_trait;
use roster_scout::browser::{build_http_client, HttpSession, PageFetcher};
use roster_scout::config::{Config, ProviderOverrides};
use roster_scout::crawler::{Coordinator, CrawlOutcome, Crawler, Interrupt, ScanScope};
use roster_scout::record::{Record, Website};
use roster_scout::search::{SearchBackend, SearchError, SearchHit, SearchResolver};
use roster_scout::storage::{CsvRecordStore, RecordStore};
use roster_scout::summary::{ProviderId, ProviderRegistry};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Search backend that answers every query with one fixed URL
struct FixedSearch(String);

#[async_trait]
impl SearchBackend for FixedSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, SearchError> {
        Ok(vec![SearchHit {
            url: self.0.clone(),
            title: "Musterschule".to_string(),
            snippet: String::new(),
        }])
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html; charset=utf-8")
}

/// Mounts a front page linking to a mission statement and an imprint
async fn mount_school_site(server: &MockServer) {
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><head><title>Musterschule Berlin</title></head><body>
            <nav>
                <a href="{base}/leitbild">Unser Leitbild</a>
                <a href="{base}/impressum">Impressum</a>
                <a href="https://elsewhere.example.org/leitbild">Leitbild des Trägers</a>
            </nav>
            <h1>Willkommen an der Musterschule</h1>
            <p>Aktuelles aus dem Schulleben.</p>
            </body></html>"#
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/leitbild"))
        .respond_with(html(
            r#"<html><head><title>Leitbild</title></head><body>
            <p>Wir sind ein Gymnasium mit MINT-Schwerpunkt und offenem Ganztag.</p>
            <script>var ignored = "Musik";</script>
            </body></html>"#
                .to_string(),
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/impressum"))
        .respond_with(html(
            "<html><body>Impressum: Sport und Musik</body></html>".to_string(),
        ))
        .mount(server)
        .await;
}

fn test_config(records_path: &str) -> Config {
    let mut config = Config {
        provider_priority: vec![ProviderId::OpenAi, ProviderId::Gemini],
        ..Config::default()
    };
    config.search.backoff_ms = 0;
    config.browser.settle_ms = 0;
    config.storage.records_path = records_path.to_string();
    config
}

fn http_session() -> HttpSession {
    let client = build_http_client("roster-scout-test").expect("Failed to build client");
    HttpSession::with_client(client, Duration::from_secs(5))
}

fn crawler(config: &Arc<Config>, start_url: &str) -> Crawler {
    let resolver = SearchResolver::new(
        Box::new(FixedSearch(start_url.to_string())),
        &config.search,
    );
    let fetcher = PageFetcher::new(Duration::ZERO, Duration::from_secs(5));
    Crawler::new(Arc::clone(config), resolver, fetcher).expect("Failed to build crawler")
}

#[tokio::test]
async fn test_crawl_follows_priority_link_on_same_site() {
    let site = MockServer::start().await;
    mount_school_site(&site).await;
    let start_url = format!("{}/", site.uri());

    let config = Arc::new(test_config("unused.csv"));
    let outcome = crawler(&config, &start_url)
        .crawl(&mut http_session(), "Musterschule", "Berlin")
        .await;

    let CrawlOutcome::Crawled(report) = outcome else {
        panic!("Expected a crawled outcome, got {:?}", outcome);
    };
    assert_eq!(report.url, start_url);
    assert_eq!(report.type_tags.joined(), "Gymnasium");
    assert_eq!(report.keyword_tags.joined(), "Ganztag, MINT");
    assert!(report.context.starts_with("--- front page ---\n"));
    assert!(report.context.contains("--- Leitbild ---\n"));

    // The imprint link has no priority phrase and is never requested
    let requests = site.received_requests().await.unwrap_or_default();
    assert!(requests.iter().all(|r| r.url.path() != "/impressum"));
}

#[tokio::test]
async fn test_manual_url_admits_plain_content_links() {
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><body>
            <a href="{base}/paedagogik">Wie wir lernen</a>
            <a href="{base}/datenschutz">Datenschutz</a>
            <a href="{base}/x">Go</a>
            <p>Startseite der Beispielschule</p>
            </body></html>"#
        )))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/paedagogik"))
        .respond_with(html(
            "<html><body>Eine Grundschule nach Montessori.</body></html>".to_string(),
        ))
        .expect(1)
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/datenschutz"))
        .respond_with(html("<html><body>Datenschutz</body></html>".to_string()))
        .expect(0)
        .mount(&site)
        .await;

    let config = Arc::new(test_config("unused.csv"));
    let start_url = format!("{}/", base);
    let outcome = crawler(&config, "https://never-searched.example.org/")
        .crawl(&mut http_session(), &start_url, "")
        .await;

    let (website, types, keywords, _) = outcome.into_fields();
    assert_eq!(website, start_url);
    assert_eq!(types, "Grundschule");
    assert_eq!(keywords, "Montessori");
}

#[tokio::test]
async fn test_unreachable_front_page() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&site)
        .await;

    let config = Arc::new(test_config("unused.csv"));
    let outcome = crawler(&config, &format!("{}/", site.uri()))
        .crawl(&mut http_session(), "Musterschule", "Berlin")
        .await;

    assert_eq!(outcome.website(), Website::Unreachable);
}

#[tokio::test]
async fn test_full_batch_with_gemini_fallback() {
    let site = MockServer::start().await;
    mount_school_site(&site).await;

    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Ein Gymnasium mit MINT-Profil." }] }
            }]
        })))
        .expect(1)
        .mount(&llm)
        .await;

    let dir = TempDir::new().unwrap();
    let records_path = dir.path().join("records.csv");
    let mut config = test_config(&records_path.to_string_lossy());
    config.providers.gemini = ProviderOverrides {
        model: Some("gemini-test".to_string()),
        base_url: Some(format!("{}/v1beta", llm.uri())),
        api_key_env: None,
    };
    let config = Arc::new(config);

    // Only Gemini has a credential; OpenAI comes first and is skipped
    let credentials = HashMap::from([(ProviderId::Gemini, "test-key".to_string())]);
    let registry = ProviderRegistry::from_credentials(&config.providers, &credentials).unwrap();

    let start_url = format!("{}/", site.uri());
    let coordinator = Coordinator::new(
        Arc::clone(&config),
        crawler(&config, &start_url),
        registry,
        Box::new(CsvRecordStore::new(&records_path)),
    );

    let mut records = vec![Record::new("Musterschule", "Berlin")];
    let report = coordinator
        .run(
            &mut http_session(),
            &mut records,
            ScanScope::Pending,
            &mut Interrupt::never(),
        )
        .await;

    assert_eq!(report.processed, 1);
    assert_eq!(report.summarized, 1);
    assert_eq!(report.persistence_failures, 0);

    let record = &records[0];
    assert_eq!(record.website, Website::Url(start_url));
    assert_eq!(record.type_tags.joined(), "Gymnasium");
    assert_eq!(record.summary, "[Gemini]: Ein Gymnasium mit MINT-Profil.");

    // The saved file reloads to the same records, and a second pending run
    // has nothing left to do
    let saved = CsvRecordStore::new(&records_path).load().unwrap();
    assert_eq!(saved, records);

    let mut reloaded = saved;
    let report = coordinator
        .run(
            &mut http_session(),
            &mut reloaded,
            ScanScope::Pending,
            &mut Interrupt::never(),
        )
        .await;
    assert_eq!(report.skipped, 1);
    assert_eq!(report.processed, 0);
}
