//! Tavily search API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{SearchError, SearchHit, SearchOptions, SearchProvider};

/// Default Tavily endpoint.
pub const TAVILY_BASE_URL: &str = "https://api.tavily.com";

const EXCLUDE_DOMAINS: &[&str] = &["reddit.com", "quora.com", "youtube.com"];

/// Tavily `/search` client.
#[derive(Clone)]
pub struct TavilyClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for TavilyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    search_depth: &'static str,
    include_images: bool,
    include_answer: bool,
    include_raw_content: bool,
    max_results: u32,
    include_domains: &'static [&'static str],
    exclude_domains: &'static [&'static str],
}

impl<'a> SearchBody<'a> {
    fn new(query: &'a str, options: SearchOptions) -> Self {
        Self {
            query,
            search_depth: "advanced",
            include_images: false,
            include_answer: true,
            include_raw_content: true,
            max_results: options.max_results,
            include_domains: options.include_domains,
            exclude_domains: EXCLUDE_DOMAINS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl TavilyClient {
    /// Create a client for `api_key`, optionally against another endpoint.
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Result<Self, SearchError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.unwrap_or_else(|| TAVILY_BASE_URL.to_string()),
        })
    }

    fn api_url(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(&self.api_key)
            .json(&SearchBody::new(query, options))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_shape() {
        let json = serde_json::to_value(SearchBody::new(
            "\"Shopify\" funding",
            SearchOptions::default(),
        ))
        .unwrap();
        assert_eq!(json["query"], "\"Shopify\" funding");
        assert_eq!(json["search_depth"], "advanced");
        assert_eq!(json["max_results"], 8);
        assert_eq!(json["include_domains"].as_array().unwrap().len(), 8);
        assert_eq!(json["exclude_domains"][0], "reddit.com");

        let narrow = SearchBody::new("grants", SearchOptions::new(12, &["canada.ca"]));
        let json = serde_json::to_value(narrow).unwrap();
        assert_eq!(json["max_results"], 12);
        assert_eq!(json["include_domains"], serde_json::json!(["canada.ca"]));
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let parsed: SearchResponse = serde_json::from_value(serde_json::json!({
            "answer": "ignored",
            "results": [{ "title": "T", "url": "https://betakit.com/x" }]
        }))
        .unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert!(parsed.results[0].content.is_empty());

        let empty: SearchResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(empty.results.is_empty());
    }

    #[test]
    fn test_api_url_trims_slash() {
        let client = TavilyClient::new("tvly-test", Some("http://localhost:9000/".into())).unwrap();
        assert_eq!(client.api_url(), "http://localhost:9000/search");
        assert!(!format!("{client:?}").contains("tvly-test"));
    }
}
