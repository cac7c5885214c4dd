//! Insight records and the rules that derive them from task results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::report::TaskResult;
use super::task::Priority;

/// Networking opportunities above this count raise an insight.
const NETWORKING_THRESHOLD: u32 = 5;

/// Category of a generated insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    /// Competitor activity.
    CompetitiveIntelligence,
    /// Funding programs and deadlines.
    FundingOpportunity,
    /// Events and networking.
    Networking,
}

/// A user-facing notification derived from a task run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    #[serde(rename = "type")]
    pub category: InsightCategory,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub actionable: bool,
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
    /// Logical agent that produced the insight.
    pub source: String,
}

/// Insight counts per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    pub competitive: usize,
    pub funding: usize,
    pub networking: usize,
}

impl CategoryBreakdown {
    /// Count insights by category.
    pub fn tally<'a>(insights: impl IntoIterator<Item = &'a Insight>) -> Self {
        insights
            .into_iter()
            .fold(Self::default(), |mut acc, insight| {
                match insight.category {
                    InsightCategory::CompetitiveIntelligence => acc.competitive += 1,
                    InsightCategory::FundingOpportunity => acc.funding += 1,
                    InsightCategory::Networking => acc.networking += 1,
                }
                acc
            })
    }
}

/// Derive insights from one task result.
///
/// Pure apart from id generation: the same result always yields the same
/// number and kind of insights.
pub fn synthesize(result: &TaskResult, now: DateTime<Utc>) -> Vec<Insight> {
    let source = result.kind().agent_label();

    match result {
        TaskResult::MarketScan(report) if report.competitive_moves_detected > 0 => vec![Insight {
            id: insight_id("market"),
            category: InsightCategory::CompetitiveIntelligence,
            title: "Competitive Activity Detected".to_string(),
            description: format!(
                "Detected {} significant competitive moves in the Canadian market",
                report.competitive_moves_detected
            ),
            priority: Priority::High,
            actionable: true,
            recommendation: "Review competitor strategies and adjust positioning".to_string(),
            timestamp: now,
            source: source.to_string(),
        }],
        TaskResult::FundingWatch(report) if report.deadlines_approaching > 0 => vec![Insight {
            id: insight_id("funding"),
            category: InsightCategory::FundingOpportunity,
            title: "Funding Deadlines Approaching".to_string(),
            description: format!(
                "{} funding opportunities have deadlines within 30 days",
                report.deadlines_approaching
            ),
            priority: Priority::High,
            actionable: true,
            recommendation: "Prepare and submit applications immediately".to_string(),
            timestamp: now,
            source: source.to_string(),
        }],
        TaskResult::EcosystemMonitor(report)
            if report.networking_opportunities > NETWORKING_THRESHOLD =>
        {
            vec![Insight {
                id: insight_id("ecosystem"),
                category: InsightCategory::Networking,
                title: "High Networking Activity".to_string(),
                description: format!(
                    "{} networking opportunities available this month",
                    report.networking_opportunities
                ),
                priority: Priority::Medium,
                actionable: true,
                recommendation: "Schedule time for strategic networking events".to_string(),
                timestamp: now,
                source: source.to_string(),
            }]
        }
        TaskResult::MarketScan(_)
        | TaskResult::FundingWatch(_)
        | TaskResult::EcosystemMonitor(_)
        | TaskResult::CodeHealth(_) => Vec::new(),
    }
}

fn insight_id(tag: &str) -> String {
    format!("insight-{}-{tag}", Uuid::new_v4().simple())
}
