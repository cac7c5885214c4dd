//! Web search relay, competitor-scan and market-intelligence synthesis.
//!
//! [`SearchProvider`] is the seam to the upstream search API;
//! [`tavily::TavilyClient`] implements it over HTTP. [`scan`] turns a batch
//! of search results into competitor insights and market trends, and
//! [`intel`] into a focused market-intelligence brief.

pub mod intel;
pub mod scan;
pub mod tavily;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use intel::{AnalysisType, IntelReport, IntelRequest, MarketAnalyst};
pub use scan::{CompetitorScanner, ScanReport, ScanRequest};
pub use tavily::TavilyClient;

/// Errors from a single search query.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Transport failure or undecodable body.
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("Tavily API error: {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for logs.
        body: String,
    },
}

/// What a query is looking for. Drives insight impact and action items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchCategory {
    Funding,
    Product,
    Partnership,
    Market,
    Hiring,
}

impl SearchCategory {
    /// Wire name of this category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Funding => "funding",
            Self::Product => "product",
            Self::Partnership => "partnership",
            Self::Market => "market",
            Self::Hiring => "hiring",
        }
    }
}

/// A planned search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub category: SearchCategory,
}

/// Business news and ecosystem sources searched by default.
pub const NEWS_DOMAINS: &[&str] = &[
    "techcrunch.com",
    "betakit.com",
    "crunchbase.com",
    "globeandmail.com",
    "financialpost.com",
    "innovation.canada.ca",
    "cvca.ca",
    "linkedin.com",
];

/// Per-query result limit and source filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub max_results: u32,
    pub include_domains: &'static [&'static str],
}

impl SearchOptions {
    #[must_use]
    pub const fn new(max_results: u32, include_domains: &'static [&'static str]) -> Self {
        Self {
            max_results,
            include_domains,
        }
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::new(8, NEWS_DOMAINS)
    }
}

/// One search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// Upstream web search.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one query.
    async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<SearchHit>, SearchError>;
}
