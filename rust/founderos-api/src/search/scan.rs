//! Competitor scan: query planning, concurrent execution and synthesis of
//! search results into insights and market trends.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    SearchCategory, SearchError, SearchHit, SearchOptions, SearchProvider, SearchQuery,
};
use crate::logging::OpTimer;

/// Spacing between query starts, to stay under upstream rate limits.
const DEFAULT_STAGGER: Duration = Duration::from_millis(200);

const MAX_INSIGHTS: usize = 10;
const MAX_TRENDS: usize = 5;
const SUMMARY_CHARS: usize = 200;
const TREND_DESCRIPTION_CHARS: usize = 150;
const TREND_KEY_CHARS: usize = 50;
const DEFAULT_TREND_CONFIDENCE: u32 = 75;
const MAX_TREND_CONFIDENCE: u32 = 95;

const TREND_KEYWORDS: &[&str] = &["trend", "growth", "increase", "rise", "surge", "adoption"];
const POSITIVE_WORDS: &[&str] = &["success", "growth", "partnership", "expansion", "innovation"];
const NEGATIVE_WORDS: &[&str] = &["challenge", "loss", "decline", "competition", "threat"];

/// Competitor scan request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScanRequest {
    pub competitors: Vec<String>,
    pub industries: Vec<String>,
    pub regions: Vec<String>,
    pub timeframe: String,
}

/// Estimated effect of a competitor move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    const fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// Tone of a result towards the scanning company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// A competitor move found in search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorInsight {
    pub id: String,
    pub competitor: String,
    #[serde(rename = "type")]
    pub category: SearchCategory,
    pub title: String,
    pub summary: String,
    pub impact: Impact,
    pub source: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub sentiment: Sentiment,
    pub action_items: Vec<String>,
}

/// A market trend aggregated from one or more results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrend {
    pub trend: String,
    pub confidence: u32,
    pub description: String,
    pub impact_score: f64,
    pub sources: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanMetadata {
    /// Total results across all queries.
    pub sources: usize,
    pub scan_time: DateTime<Utc>,
    pub confidence: u32,
    pub queries_executed: usize,
    pub failed_queries: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Competitor scan response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub insights: Vec<CompetitorInsight>,
    pub market_trends: Vec<MarketTrend>,
    pub scan_metadata: ScanMetadata,
}

/// Results of one executed query. Failed queries carry no hits.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub query: SearchQuery,
    pub hits: Vec<SearchHit>,
    pub error: Option<String>,
}

/// Runs competitor scans against a [`SearchProvider`].
#[derive(Clone)]
pub struct CompetitorScanner {
    provider: Arc<dyn SearchProvider>,
    stagger: Duration,
}

impl std::fmt::Debug for CompetitorScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompetitorScanner")
            .field("stagger", &self.stagger)
            .finish_non_exhaustive()
    }
}

impl CompetitorScanner {
    /// Create a scanner with the default query stagger.
    #[must_use]
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            provider,
            stagger: DEFAULT_STAGGER,
        }
    }

    /// Override the delay between query starts.
    #[must_use]
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Plan, execute and synthesize a scan. Individual query failures are
    /// recorded in the metadata and never fail the scan.
    pub async fn scan(&self, request: &ScanRequest) -> ScanReport {
        let timer = OpTimer::new("search", "competitor_scan");
        let queries = plan_queries(request);

        let runs = queries.into_iter().enumerate().map(|(index, query)| {
            let delay = self.stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
            async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                self.run_query(query).await
            }
        });
        let outcomes = join_all(runs).await;

        let report = synthesize(&outcomes, &request.competitors, Utc::now());
        tracing::info!(
            queries = report.scan_metadata.queries_executed,
            failed = report.scan_metadata.failed_queries,
            insights = report.insights.len(),
            trends = report.market_trends.len(),
            "Competitor scan finished"
        );
        timer.finish();
        report
    }

    async fn run_query(&self, query: SearchQuery) -> QueryOutcome {
        match self
            .provider
            .search(&query.query, SearchOptions::default())
            .await
        {
            Ok(hits) => QueryOutcome {
                query,
                hits,
                error: None,
            },
            Err(e) => {
                log_query_failure(&query, &e);
                QueryOutcome {
                    query,
                    hits: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn log_query_failure(query: &SearchQuery, error: &SearchError) {
    match error {
        SearchError::Status { status, body } => tracing::warn!(
            query = %query.query,
            status,
            body = %body,
            "Search query failed"
        ),
        SearchError::Http(e) => tracing::warn!(
            query = %query.query,
            error = %e,
            "Search query failed"
        ),
    }
}

/// Queries for a request: per competitor funding, product and partnership;
/// per industry market; per competitor hiring.
#[must_use]
pub fn plan_queries(request: &ScanRequest) -> Vec<SearchQuery> {
    let ScanRequest {
        competitors,
        industries,
        regions,
        timeframe,
    } = request;
    let regions_or = regions.join(" OR ");
    let regions_or = regions_or.as_str();
    let regions_space = regions.join(" ");

    let competitor_queries = move |category: SearchCategory| {
        competitors.iter().map(move |comp| SearchQuery {
            query: match category {
                SearchCategory::Funding => {
                    format!("\"{comp}\" funding investment round {timeframe} {regions_or}")
                }
                SearchCategory::Product => {
                    format!("\"{comp}\" product launch new feature {timeframe}")
                }
                SearchCategory::Partnership => {
                    format!("\"{comp}\" partnership acquisition merger {timeframe}")
                }
                SearchCategory::Hiring | SearchCategory::Market => {
                    format!("\"{comp}\" hiring jobs career {regions_or} {timeframe}")
                }
            },
            category,
        })
    };

    let mut queries = Vec::new();
    queries.extend(competitor_queries(SearchCategory::Funding));
    queries.extend(competitor_queries(SearchCategory::Product));
    queries.extend(competitor_queries(SearchCategory::Partnership));
    queries.extend(industries.iter().map(|industry| SearchQuery {
        query: format!("{industry} market trends {regions_space} startup {timeframe}"),
        category: SearchCategory::Market,
    }));
    queries.extend(competitor_queries(SearchCategory::Hiring));
    queries
}

/// Build a report from executed queries.
#[must_use]
pub fn synthesize(
    outcomes: &[QueryOutcome],
    competitors: &[String],
    now: DateTime<Utc>,
) -> ScanReport {
    let mut insights = Vec::new();
    let mut trends = Vec::new();
    let mut total_sources = 0;

    for outcome in outcomes {
        total_sources += outcome.hits.len();
        for hit in &outcome.hits {
            if let Some(insight) = extract_insight(hit, outcome.query.category, competitors, now) {
                insights.push(insight);
            }
            if let Some(trend) = extract_trend(hit, outcome.query.category) {
                trends.push(trend);
            }
        }
    }

    insights.sort_by_key(|i| Reverse(i.impact.rank()));
    insights.truncate(MAX_INSIGHTS);

    ScanReport {
        scan_metadata: ScanMetadata {
            sources: total_sources,
            scan_time: now,
            confidence: confidence(&insights, total_sources),
            queries_executed: outcomes.len(),
            failed_queries: outcomes.iter().filter(|o| o.error.is_some()).count(),
            error: None,
        },
        insights,
        market_trends: consolidate_trends(trends),
    }
}

fn extract_insight(
    hit: &SearchHit,
    category: SearchCategory,
    competitors: &[String],
    now: DateTime<Utc>,
) -> Option<CompetitorInsight> {
    let content = format!("{} {}", hit.title, hit.content).to_lowercase();
    let competitor = competitors
        .iter()
        .find(|c| content.contains(&c.to_lowercase()))?;

    let impact = match category {
        SearchCategory::Funding if content.contains("million") || content.contains("billion") => {
            Impact::High
        }
        SearchCategory::Product if content.contains("launch") => Impact::Medium,
        SearchCategory::Partnership if content.contains("acquisition") => Impact::High,
        _ => Impact::Low,
    };

    Some(CompetitorInsight {
        id: format!("insight-{}", Uuid::new_v4().simple()),
        competitor: competitor.clone(),
        category,
        title: hit.title.clone(),
        summary: format!("{}...", truncate_chars(&hit.content, SUMMARY_CHARS)),
        impact,
        source: source_name(&hit.url),
        url: hit.url.clone(),
        timestamp: now,
        sentiment: sentiment(&content, category),
        action_items: action_items(category, competitor),
    })
}

fn extract_trend(hit: &SearchHit, category: SearchCategory) -> Option<MarketTrend> {
    if category != SearchCategory::Market {
        return None;
    }
    let content = format!("{} {}", hit.title, hit.content).to_lowercase();
    if !TREND_KEYWORDS.iter().any(|k| content.contains(k)) {
        return None;
    }

    Some(MarketTrend {
        trend: hit.title.clone(),
        confidence: first_percentage(&content)
            .map_or(DEFAULT_TREND_CONFIDENCE, |p| p.min(MAX_TREND_CONFIDENCE)),
        description: format!(
            "{}...",
            truncate_chars(&hit.content, TREND_DESCRIPTION_CHARS)
        ),
        impact_score: f64::from(trend_impact(&content)),
        sources: 1,
    })
}

/// Number before the first `%` that directly follows a digit. Values too
/// large for `u32` saturate.
fn first_percentage(content: &str) -> Option<u32> {
    let bytes = content.as_bytes();
    bytes.iter().enumerate().find_map(|(i, &b)| {
        if b != b'%' {
            return None;
        }
        let digits_start = bytes[..i]
            .iter()
            .rposition(|c| !c.is_ascii_digit())
            .map_or(0, |p| p + 1);
        if digits_start == i {
            return None;
        }
        Some(content[digits_start..i].parse().unwrap_or(u32::MAX))
    })
}

fn action_items(category: SearchCategory, competitor: &str) -> Vec<String> {
    match category {
        SearchCategory::Funding => vec![
            format!("Analyze {competitor}'s funding strategy and investor network"),
            "Update competitive positioning against funded competitor".to_string(),
            "Consider similar funding sources and timing".to_string(),
        ],
        SearchCategory::Product => vec![
            format!("Compare product features with {competitor}'s new launch"),
            "Identify differentiation opportunities".to_string(),
            "Update product roadmap based on competitive moves".to_string(),
        ],
        SearchCategory::Partnership => vec![
            format!("Evaluate impact of {competitor}'s partnership on market"),
            "Identify similar partnership opportunities".to_string(),
            "Adjust go-to-market strategy accordingly".to_string(),
        ],
        SearchCategory::Hiring => vec![
            "Monitor talent competition and salary benchmarks".to_string(),
            "Strengthen employer brand and recruitment".to_string(),
            "Consider competitive talent acquisition strategies".to_string(),
        ],
        SearchCategory::Market => vec![
            "Analyze market trend implications for product strategy".to_string(),
            "Update messaging and positioning".to_string(),
            "Consider market expansion opportunities".to_string(),
        ],
    }
}

/// Funding and product news about a competitor is never good news.
fn sentiment(content: &str, category: SearchCategory) -> Sentiment {
    let count = |words: &[&str]| words.iter().filter(|w| content.contains(*w)).count();
    let positive = count(POSITIVE_WORDS);
    let negative = count(NEGATIVE_WORDS);

    match category {
        SearchCategory::Funding | SearchCategory::Product => {
            if negative > positive {
                Sentiment::Negative
            } else {
                Sentiment::Neutral
            }
        }
        _ if positive > negative => Sentiment::Positive,
        _ if negative > positive => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

fn trend_impact(content: &str) -> u32 {
    let mut score = 5;
    if content.contains("billion") {
        score += 3;
    }
    if content.contains("million") {
        score += 2;
    }
    if content.contains("significant") || content.contains("major") {
        score += 2;
    }
    if content.contains("canada") || content.contains("canadian") {
        score += 1;
    }
    score.min(10)
}

/// Merge trends sharing a title prefix, keeping first-seen order before
/// ranking by confidence.
fn consolidate_trends(trends: Vec<MarketTrend>) -> Vec<MarketTrend> {
    let mut merged: Vec<MarketTrend> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for trend in trends {
        let key: String = trend.trend.to_lowercase().chars().take(TREND_KEY_CHARS).collect();
        match index.get(&key) {
            Some(&i) => {
                let existing = &mut merged[i];
                existing.confidence = existing.confidence.max(trend.confidence);
                existing.sources += trend.sources;
            }
            None => {
                index.insert(key, merged.len());
                merged.push(trend);
            }
        }
    }

    merged.sort_by_key(|t| Reverse(t.confidence));
    merged.truncate(MAX_TRENDS);
    merged
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "counts are small and the score is within 0..=100"
)]
fn confidence(insights: &[CompetitorInsight], total_sources: usize) -> u32 {
    if insights.is_empty() {
        return 0;
    }
    let high = insights.iter().filter(|i| i.impact == Impact::High).count();
    let source_quality = (total_sources as f64 * 5.0).min(95.0);
    let insight_quality = high as f64 / insights.len() as f64 * 100.0;
    ((source_quality + insight_quality) / 2.0).round() as u32
}

/// First label of the URL host without `www.`, e.g. `betakit` for
/// `https://www.betakit.com/x`.
fn source_name(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.replacen("www.", "", 1)))
        .and_then(|h| h.split('.').next().map(str::to_string))
        .unwrap_or_else(|| "Unknown Source".to_string())
}

pub(super) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Canned scan shown when no search provider is configured.
#[must_use]
pub fn demo_report(competitors: &[String], now: DateTime<Utc>) -> ScanReport {
    let hours_ago = |h: i64| now - chrono::Duration::hours(h);
    let items = |list: &[&str]| list.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();

    ScanReport {
        insights: vec![
            CompetitorInsight {
                id: "demo-insight-1".to_string(),
                competitor: competitors
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "Shopify".to_string()),
                category: SearchCategory::Product,
                title: "Shopify announces AI-powered checkout optimization".to_string(),
                summary: "New machine learning algorithms promise 15% conversion improvement, directly competing with similar fintech solutions in the Canadian market.".to_string(),
                impact: Impact::High,
                source: "TechCrunch".to_string(),
                url: "https://techcrunch.com/shopify-ai-checkout".to_string(),
                timestamp: hours_ago(3),
                sentiment: Sentiment::Negative,
                action_items: items(&[
                    "Analyze their AI checkout capabilities vs your solution",
                    "Identify unique differentiators in your approach",
                    "Consider strategic partnership or competitive positioning",
                ]),
            },
            CompetitorInsight {
                id: "demo-insight-2".to_string(),
                competitor: "Lightspeed".to_string(),
                category: SearchCategory::Funding,
                title: "Lightspeed secures $75M Series D for North American expansion".to_string(),
                summary: "Major funding round led by Canadian pension funds, focusing on AI-driven retail analytics across Canada and US markets.".to_string(),
                impact: Impact::High,
                source: "BetaKit".to_string(),
                url: "https://betakit.com/lightspeed-series-d".to_string(),
                timestamp: hours_ago(6),
                sentiment: Sentiment::Neutral,
                action_items: items(&[
                    "Study their expansion strategy and funding approach",
                    "Identify market segments they may be overlooking",
                    "Consider similar institutional investor outreach",
                ]),
            },
            CompetitorInsight {
                id: "demo-insight-3".to_string(),
                competitor: "Nuvei".to_string(),
                category: SearchCategory::Partnership,
                title: "Nuvei partners with Canadian banks for embedded finance".to_string(),
                summary: "Strategic partnerships with RBC and TD Bank to offer embedded payment solutions, potentially disrupting fintech startup space.".to_string(),
                impact: Impact::Medium,
                source: "Financial Post".to_string(),
                url: "https://financialpost.com/nuvei-bank-partnership".to_string(),
                timestamp: hours_ago(12),
                sentiment: Sentiment::Negative,
                action_items: items(&[
                    "Evaluate impact on fintech partnership landscape",
                    "Identify alternative bank partnership opportunities",
                    "Consider direct-to-consumer strategy pivots",
                ]),
            },
        ],
        market_trends: vec![
            MarketTrend {
                trend: "AI-powered fintech adoption in Canadian SMBs".to_string(),
                confidence: 89,
                description: "Small and medium businesses across Canada rapidly adopting AI-driven financial tools".to_string(),
                impact_score: 8.5,
                sources: 12,
            },
            MarketTrend {
                trend: "Government digital transformation funding surge".to_string(),
                confidence: 94,
                description: "Federal and provincial governments increasing digital innovation funding by 340%".to_string(),
                impact_score: 9.2,
                sources: 8,
            },
        ],
        scan_metadata: ScanMetadata {
            sources: 47,
            scan_time: now,
            confidence: 92,
            queries_executed: 15,
            failed_queries: 0,
            error: None,
        },
    }
}

/// Payload returned when a scan request cannot be processed at all.
#[must_use]
pub fn fallback_report(now: DateTime<Utc>) -> ScanReport {
    let mut report = demo_report(&["Demo Corp".to_string()], now);
    report.market_trends.clear();
    report.scan_metadata = ScanMetadata {
        sources: 0,
        scan_time: now,
        confidence: 0,
        queries_executed: 0,
        failed_queries: 0,
        error: Some("Demo mode - Tavily API unavailable".to_string()),
    };
    report
}
