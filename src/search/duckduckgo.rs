//! DuckDuckGo HTML endpoint backend

use crate::browser::build_http_client;
use crate::config::SearchSettings;
use crate::search::{SearchBackend, SearchError, SearchHit};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// Search backend scraping the JavaScript-free DuckDuckGo results page
pub struct DuckDuckGoBackend {
    client: Client,
    endpoint: Url,
    region: String,
    max_results: usize,
}

impl DuckDuckGoBackend {
    pub fn new(settings: &SearchSettings, user_agent: &str) -> Result<Self, SearchError> {
        let client = build_http_client(user_agent)?;
        Self::with_client(client, settings)
    }

    pub fn with_client(client: Client, settings: &SearchSettings) -> Result<Self, SearchError> {
        let endpoint = Url::parse(&settings.endpoint)
            .map_err(|e| SearchError::Endpoint(format!("{}: {}", settings.endpoint, e)))?;
        Ok(Self {
            client,
            endpoint,
            region: settings.region.clone(),
            max_results: settings.max_results,
        })
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoBackend {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", query), ("kl", self.region.as_str())])
            .send()
            .await?;

        // Throttled requests come back as 202 with a challenge page
        if response.status() != reqwest::StatusCode::OK {
            return Err(SearchError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let mut hits = parse_results(&body);
        hits.truncate(self.max_results);
        Ok(hits)
    }
}

/// Extracts organic results from a results page, skipping ads
pub(crate) fn parse_results(html: &str) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    let (Ok(result_selector), Ok(link_selector), Ok(snippet_selector)) = (
        Selector::parse("div.result"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    document
        .select(&result_selector)
        .filter(|result| {
            !result
                .value()
                .classes()
                .any(|class| class == "result--ad")
        })
        .filter_map(|result| {
            let link = result.select(&link_selector).next()?;
            let url = decode_result_href(link.value().attr("href")?)?;
            let title = link.text().collect::<String>().trim().to_string();
            let snippet = result
                .select(&snippet_selector)
                .next()
                .map(|s| s.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            Some(SearchHit {
                url,
                title,
                snippet,
            })
        })
        .collect()
}

/// Unwraps the redirect link DuckDuckGo puts around each result
fn decode_result_href(href: &str) -> Option<String> {
    let base = Url::parse("https://duckduckgo.com/").ok()?;
    let url = base.join(href.trim()).ok()?;

    if url.host_str() == Some("duckduckgo.com") && url.path().starts_with("/l/") {
        return url
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, target)| target.into_owned());
    }

    match url.scheme() {
        "http" | "https" => Some(href.trim().to_string()),
        _ => None,
    }
}
