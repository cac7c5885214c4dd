//! Market-intelligence briefs: targeted Canadian-ecosystem searches per
//! analysis type, condensed into insights, competitor profiles, funding
//! programs, trends and recommendations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use super::scan::{Impact, truncate_chars};
use super::{SearchError, SearchHit, SearchOptions, SearchProvider};
use crate::agent::Priority;
use crate::logging::OpTimer;

const MAX_INSIGHTS: usize = 10;
const INSIGHT_WINDOW: usize = 20;
const MAX_COMPETITORS: usize = 5;
const MAX_FUNDING: usize = 10;
const MAX_TRENDS: usize = 8;
const MIN_CONFIDENCE: f64 = 60.0;
const MAX_CONFIDENCE: f64 = 95.0;
const NO_DESCRIPTION: &str = "No description available";

const FUNDING_KEYWORDS: &[&str] = &[
    "grant",
    "funding",
    "investment",
    "accelerator",
    "incubator",
    "venture capital",
    "seed funding",
];
const TREND_KEYWORDS: &[&str] = &["trend", "growth", "market", "opportunity", "emerging"];
const HIGH_IMPACT_WORDS: &[&str] = &["significant", "major", "breakthrough", "revolutionary"];
const MEDIUM_IMPACT_WORDS: &[&str] = &["growing", "increasing", "emerging", "notable"];
const QUALITY_DOMAINS: &[&str] = &["crunchbase.com", "techcrunch.com", "canada.ca"];

/// Focus of a brief.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisType {
    #[default]
    Competitor,
    Funding,
    MarketTrends,
    Acquisition,
}

impl AnalysisType {
    /// Parse an analysis name, falling back to [`AnalysisType::Competitor`].
    #[must_use]
    pub fn parse_lenient(name: Option<&str>) -> Self {
        match name {
            Some("funding") => Self::Funding,
            Some("market-trends") => Self::MarketTrends,
            Some("acquisition") => Self::Acquisition,
            _ => Self::Competitor,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Competitor => "competitor",
            Self::Funding => "funding",
            Self::MarketTrends => "market-trends",
            Self::Acquisition => "acquisition",
        }
    }
}

/// Market-intelligence request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntelRequest {
    pub company_name: Option<String>,
    pub industry: Option<String>,
    /// Restrict funding programs to Canadian ones. Defaults to on.
    pub canadian_focus: Option<bool>,
    pub analysis_type: Option<String>,
}

impl IntelRequest {
    #[must_use]
    pub fn analysis(&self) -> AnalysisType {
        AnalysisType::parse_lenient(self.analysis_type.as_deref())
    }

    #[must_use]
    pub fn canadian_focus(&self) -> bool {
        self.canadian_focus.unwrap_or(true)
    }

    fn company(&self) -> &str {
        self.company_name.as_deref().unwrap_or_default()
    }

    fn industry(&self) -> &str {
        self.industry.as_deref().unwrap_or_default()
    }
}

/// Insight category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntelCategory {
    Competitor,
    Funding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelInsight {
    #[serde(rename = "type")]
    pub category: IntelCategory,
    pub title: String,
    pub insight: String,
    pub source: String,
    pub relevance_score: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorProfile {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub relevance: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingOpportunity {
    pub program: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub funding_type: String,
    pub eligibility: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelTrend {
    pub trend: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub impact: Impact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Competitive,
    Funding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub action: String,
    pub description: String,
}

/// Market-intelligence response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelReport {
    pub summary: String,
    pub insights: Vec<IntelInsight>,
    pub competitors: Vec<CompetitorProfile>,
    pub funding_opportunities: Vec<FundingOpportunity>,
    pub market_trends: Vec<IntelTrend>,
    pub recommendations: Vec<Recommendation>,
    /// Total results across all queries.
    pub sources: usize,
    pub canadian_focus: bool,
    pub last_updated: DateTime<Utc>,
    pub confidence: u32,
    /// Set when demo data stands in for a failed search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A query with its own result limit and source filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedQuery {
    pub query: String,
    pub options: SearchOptions,
}

/// Builds briefs against a [`SearchProvider`].
#[derive(Clone)]
pub struct MarketAnalyst {
    provider: Arc<dyn SearchProvider>,
}

impl std::fmt::Debug for MarketAnalyst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketAnalyst").finish_non_exhaustive()
    }
}

impl MarketAnalyst {
    #[must_use]
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    /// Run every planned query concurrently and synthesize the brief.
    ///
    /// # Errors
    ///
    /// Fails with the first query error; a partial brief is never returned.
    pub async fn analyze(
        &self,
        request: &IntelRequest,
        now: DateTime<Utc>,
    ) -> Result<IntelReport, SearchError> {
        let analysis = request.analysis();
        let canadian_focus = request.canadian_focus();
        let queries = plan_queries(
            analysis,
            request.company(),
            request.industry(),
            canadian_focus,
        );
        tracing::info!(
            analysis = analysis.as_str(),
            queries = queries.len(),
            canadian_focus,
            "Running market intelligence"
        );

        let timer = OpTimer::new("search", "market_intelligence");
        let searches = queries
            .iter()
            .map(|q| self.provider.search(&q.query, q.options));
        let result = try_join_all(searches).await;
        timer.finish_with_result(result.as_ref());

        let hits: Vec<SearchHit> = result?.into_iter().flatten().collect();
        Ok(synthesize(
            &hits,
            analysis,
            request.company(),
            canadian_focus,
            now,
        ))
    }
}

/// Space-joined non-empty terms.
fn terms(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Queries for one analysis type. Blank company or industry terms are
/// dropped rather than interpolated.
#[must_use]
pub fn plan_queries(
    analysis: AnalysisType,
    company: &str,
    industry: &str,
    canadian_focus: bool,
) -> Vec<PlannedQuery> {
    let canada = if canadian_focus { "Canada" } else { "" };
    let planned =
        |parts: &[&str], max_results: u32, domains: &'static [&'static str]| PlannedQuery {
            query: terms(parts),
            options: SearchOptions::new(max_results, domains),
        };

    match analysis {
        AnalysisType::Competitor => vec![
            planned(
                &[company, "competitors", industry, canada, "2024"],
                15,
                &["crunchbase.com", "techcrunch.com", "bdc.ca"],
            ),
            planned(
                &[industry, "startups funding rounds", canada, "recent"],
                10,
                &["techcrunch.com", "innovation.canada.ca"],
            ),
        ],
        AnalysisType::Funding => vec![
            planned(
                &["Canadian government grants", industry, "startups 2024"],
                12,
                &["canada.ca", "innovation.canada.ca", "bdc.ca"],
            ),
            planned(
                &[industry, "venture capital Canada funding trends 2024"],
                10,
                &["cvca.ca", "techcrunch.com", "betakit.com"],
            ),
        ],
        AnalysisType::MarketTrends => vec![planned(
            &[industry, "market trends Canada 2024 growth opportunities"],
            15,
            &["statcan.gc.ca", "deloitte.com"],
        )],
        AnalysisType::Acquisition => vec![planned(
            &[industry, "acquisitions mergers Canada 2024"],
            12,
            &["techcrunch.com", "globeandmail.com"],
        )],
    }
}

/// Condense raw hits into a brief.
#[must_use]
pub fn synthesize(
    hits: &[SearchHit],
    analysis: AnalysisType,
    company: &str,
    canadian_focus: bool,
    now: DateTime<Utc>,
) -> IntelReport {
    let insights = key_insights(hits, analysis);
    let competitors = competitor_profiles(hits, company);
    let funding = funding_opportunities(hits, canadian_focus);
    let trends: Vec<IntelTrend> = hits.iter().filter_map(trend).take(MAX_TRENDS).collect();
    let recommendations = recommendations(&competitors, &funding);

    IntelReport {
        summary: format!(
            "Comprehensive {} analysis for {}",
            analysis.as_str(),
            display_company(company)
        ),
        insights,
        competitors,
        funding_opportunities: funding,
        market_trends: trends,
        recommendations,
        sources: hits.len(),
        canadian_focus,
        last_updated: now,
        confidence: confidence(hits),
        note: None,
    }
}

fn display_company(company: &str) -> &str {
    if company.trim().is_empty() {
        "your startup"
    } else {
        company
    }
}

/// Only funding briefs produce insights, from the first results.
fn key_insights(hits: &[SearchHit], analysis: AnalysisType) -> Vec<IntelInsight> {
    if analysis != AnalysisType::Funding {
        return Vec::new();
    }

    let mut insights: Vec<IntelInsight> = hits
        .iter()
        .take(INSIGHT_WINDOW)
        .filter_map(|hit| {
            let text = format!("{} {}", hit.title, hit.content).to_lowercase();
            let relevant = ["funding", "investment", "grant"]
                .iter()
                .any(|k| text.contains(k));
            relevant.then(|| IntelInsight {
                category: IntelCategory::Funding,
                title: hit.title.clone(),
                insight: format!("{}...", truncate_chars(&hit.content, 200)),
                source: hit.url.clone(),
                relevance_score: relevance(&text, &["funding", "investment", "canada"]),
            })
        })
        .collect();

    insights.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    insights.truncate(MAX_INSIGHTS);
    insights
}

fn competitor_profiles(hits: &[SearchHit], company: &str) -> Vec<CompetitorProfile> {
    let mut profiles: Vec<CompetitorProfile> = hits
        .iter()
        .filter(|hit| {
            let content = hit.content.to_lowercase();
            hit.title.to_lowercase().contains("competitor")
                || content.contains("vs ")
                || content.contains("alternative")
        })
        .map(|hit| CompetitorProfile {
            name: hit
                .title
                .split_whitespace()
                .next()
                .unwrap_or("Unknown Company")
                .to_string(),
            description: excerpt(&hit.content, 150),
            source: Some(hit.url.clone()),
            relevance: relevance(&hit.content, &[company, "competitor"]),
        })
        .collect();

    profiles.sort_by(|a, b| b.relevance.cmp(&a.relevance));
    profiles.truncate(MAX_COMPETITORS);
    profiles
}

fn funding_opportunities(hits: &[SearchHit], canadian_focus: bool) -> Vec<FundingOpportunity> {
    hits.iter()
        .filter(|hit| {
            let content = hit.content.to_lowercase();
            FUNDING_KEYWORDS.iter().any(|k| content.contains(k))
                && (!canadian_focus || content.contains("canada"))
        })
        .map(|hit| FundingOpportunity {
            program: program_name(&hit.title),
            description: excerpt(&hit.content, 200),
            source: Some(hit.url.clone()),
            funding_type: funding_type(&hit.content).to_string(),
            eligibility: eligibility(&hit.content),
        })
        .take(MAX_FUNDING)
        .collect()
}

fn trend(hit: &SearchHit) -> Option<IntelTrend> {
    let content = hit.content.to_lowercase();
    if !TREND_KEYWORDS.iter().any(|k| content.contains(k)) {
        return None;
    }

    let impact = if HIGH_IMPACT_WORDS.iter().any(|w| content.contains(w)) {
        Impact::High
    } else if MEDIUM_IMPACT_WORDS.iter().any(|w| content.contains(w)) {
        Impact::Medium
    } else {
        Impact::Low
    };

    Some(IntelTrend {
        trend: if hit.title.is_empty() {
            "Unknown trend".to_string()
        } else {
            hit.title.clone()
        },
        description: excerpt(&hit.content, 180),
        source: Some(hit.url.clone()),
        impact,
    })
}

fn recommendations(
    competitors: &[CompetitorProfile],
    funding: &[FundingOpportunity],
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if let Some(top) = competitors.first() {
        out.push(Recommendation {
            kind: RecommendationKind::Competitive,
            priority: Priority::High,
            action: "Differentiation Strategy".to_string(),
            description: format!(
                "Based on competitor analysis, focus on unique value propositions that distinguish you from {}",
                top.name
            ),
        });
    }

    if !funding.is_empty() {
        let programs: Vec<&str> = funding.iter().take(3).map(|f| f.program.as_str()).collect();
        out.push(Recommendation {
            kind: RecommendationKind::Funding,
            priority: Priority::Medium,
            action: "Funding Pipeline".to_string(),
            description: format!(
                "Explore {} for strategic funding opportunities",
                programs.join(", ")
            ),
        });
    }

    out
}

/// Case-insensitive occurrence count of every non-blank keyword.
fn relevance(content: &str, keywords: &[&str]) -> usize {
    let content = content.to_lowercase();
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .map(|k| content.matches(k.as_str()).count())
        .sum()
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "result counts are small and the score is clamped to 60..=95"
)]
fn confidence(hits: &[SearchHit]) -> u32 {
    if hits.is_empty() {
        return MIN_CONFIDENCE as u32;
    }
    let quality = hits
        .iter()
        .filter(|h| QUALITY_DOMAINS.iter().any(|d| h.url.contains(d)))
        .count();
    let total = hits.len() as f64;
    let score = quality as f64 / total * 100.0 + total * 2.0;
    score.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE).round() as u32
}

fn excerpt(content: &str, max: usize) -> String {
    if content.is_empty() {
        NO_DESCRIPTION.to_string()
    } else {
        format!("{}...", truncate_chars(content, max))
    }
}

/// Text before the first `-`, e.g. `IRAP` for `IRAP - Industrial Research`.
fn program_name(title: &str) -> String {
    let head = title.split('-').next().map_or("", str::trim);
    if !head.is_empty() {
        head.to_string()
    } else if !title.trim().is_empty() {
        truncate_chars(title.trim(), 50)
    } else {
        "Unknown Program".to_string()
    }
}

fn funding_type(content: &str) -> &'static str {
    let content = content.to_lowercase();
    if content.contains("grant") {
        "Government Grant"
    } else if content.contains("venture") {
        "Venture Capital"
    } else if content.contains("accelerator") {
        "Accelerator Program"
    } else {
        "Other Funding"
    }
}

fn eligibility(content: &str) -> String {
    content
        .split('.')
        .find(|s| {
            let s = s.to_lowercase();
            s.contains("eligible") || s.contains("requirement")
        })
        .map_or_else(
            || "See source for details".to_string(),
            |s| format!("{}...", truncate_chars(s.trim(), 100)),
        )
}

/// Canned brief used when search is unconfigured or unavailable.
#[must_use]
pub fn demo_brief(
    analysis: AnalysisType,
    company: Option<&str>,
    now: DateTime<Utc>,
) -> IntelReport {
    IntelReport {
        summary: format!(
            "Mock {} analysis for {}",
            analysis.as_str(),
            display_company(company.unwrap_or_default())
        ),
        insights: vec![
            IntelInsight {
                category: IntelCategory::Competitor,
                title: "Shopify announces new developer tools".to_string(),
                insight: "New API integrations could impact your strategy...".to_string(),
                source: "TechCrunch (Demo)".to_string(),
                relevance_score: 85,
            },
            IntelInsight {
                category: IntelCategory::Funding,
                title: "Innovation Canada $50M clean tech fund".to_string(),
                insight: "New funding opportunity for sustainable startups...".to_string(),
                source: "Innovation Canada (Demo)".to_string(),
                relevance_score: 78,
            },
        ],
        competitors: vec![
            CompetitorProfile {
                name: "DemoCompetitor Inc.".to_string(),
                description: "Leading Canadian startup...".to_string(),
                source: None,
                relevance: 90,
            },
            CompetitorProfile {
                name: "TechRival Corp.".to_string(),
                description: "Emerging player in the space...".to_string(),
                source: None,
                relevance: 75,
            },
        ],
        funding_opportunities: vec![FundingOpportunity {
            program: "SR&ED Tax Credits".to_string(),
            description: "Up to $3M in R&D tax credits...".to_string(),
            source: None,
            funding_type: "Government Grant".to_string(),
            eligibility: "Canadian companies with R&D activities...".to_string(),
        }],
        market_trends: vec![IntelTrend {
            trend: "AI adoption surge".to_string(),
            description: "Canadian SMBs increasing AI adoption...".to_string(),
            source: None,
            impact: Impact::High,
        }],
        recommendations: vec![Recommendation {
            kind: RecommendationKind::Competitive,
            priority: Priority::High,
            action: "Differentiation Strategy".to_string(),
            description: "Focus on unique value propositions...".to_string(),
        }],
        sources: 25,
        canadian_focus: true,
        last_updated: now,
        confidence: 85,
        note: None,
    }
}
