//! Result payloads produced by task executors.
//!
//! Each task kind carries its own report type. Field names stay snake_case on
//! the wire since the dashboard reads them verbatim.

use serde::{Deserialize, Serialize};

use super::task::TaskKind;

/// Payload of one task run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskResult {
    /// Output of a market scan.
    MarketScan(MarketScanReport),
    /// Output of a funding watch.
    FundingWatch(FundingWatchReport),
    /// Output of an ecosystem monitor.
    EcosystemMonitor(EcosystemReport),
    /// Output of a code health check.
    CodeHealth(CodeHealthReport),
}

impl TaskResult {
    /// Kind of task that produced this payload.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::MarketScan(_) => TaskKind::MarketScan,
            Self::FundingWatch(_) => TaskKind::FundingWatch,
            Self::EcosystemMonitor(_) => TaskKind::EcosystemMonitor,
            Self::CodeHealth(_) => TaskKind::CodeHealth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketScanReport {
    pub competitors_analyzed: u32,
    pub market_trends_identified: u32,
    pub competitive_moves_detected: u32,
    pub data: MarketScanData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketScanData {
    pub trends: Vec<String>,
    pub competitors: Vec<String>,
    pub alerts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingWatchReport {
    pub opportunities_found: u32,
    pub deadlines_approaching: u32,
    pub new_programs: u32,
    pub data: FundingWatchData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingWatchData {
    pub programs: Vec<FundingProgram>,
    pub grants_matched: u32,
    pub eligibility_score: u32,
}

/// A funding program with an application deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingProgram {
    pub name: String,
    pub deadline: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcosystemReport {
    pub accelerators_tracked: u32,
    pub events_upcoming: u32,
    pub networking_opportunities: u32,
    pub data: EcosystemData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcosystemData {
    pub events: Vec<String>,
    pub accelerators: Vec<String>,
    pub opportunities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeHealthReport {
    pub repositories_analyzed: u32,
    pub issues_found: u32,
    pub security_alerts: u32,
    pub performance_score: u32,
    pub data: CodeHealthData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeHealthData {
    pub technical_debt: String,
    pub vulnerabilities: Vec<String>,
    pub recommendations: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl MarketScanReport {
    /// Synthetic market scan output.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            competitors_analyzed: 5,
            market_trends_identified: 3,
            competitive_moves_detected: 2,
            data: MarketScanData {
                trends: strings(&[
                    "AI adoption surge",
                    "Canadian fintech growth",
                    "Remote work tools",
                ]),
                competitors: strings(&["Shopify", "Lightspeed", "Nuvei"]),
                alerts: strings(&["New funding announcement", "Product launch detected"]),
            },
        }
    }
}

impl FundingWatchReport {
    /// Synthetic funding watch output.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            opportunities_found: 7,
            deadlines_approaching: 2,
            new_programs: 1,
            data: FundingWatchData {
                programs: vec![
                    FundingProgram {
                        name: "Innovation Canada Clean Tech".to_string(),
                        deadline: "2024-03-15".to_string(),
                        amount: "$50M".to_string(),
                    },
                    FundingProgram {
                        name: "Ontario Digital Main Street".to_string(),
                        deadline: "2024-02-28".to_string(),
                        amount: "$25K".to_string(),
                    },
                ],
                grants_matched: 3,
                eligibility_score: 87,
            },
        }
    }
}

impl EcosystemReport {
    /// Synthetic ecosystem monitor output.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            accelerators_tracked: 12,
            events_upcoming: 5,
            networking_opportunities: 8,
            data: EcosystemData {
                events: strings(&["TechTO", "Startup Canada", "Vector Institute Demo Day"]),
                accelerators: strings(&["MaRS", "Techstars Toronto", "Real Ventures"]),
                opportunities: strings(&["Mentorship programs", "Demo day applications"]),
            },
        }
    }
}

impl CodeHealthReport {
    /// Synthetic code health output.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            repositories_analyzed: 3,
            issues_found: 12,
            security_alerts: 1,
            performance_score: 82,
            data: CodeHealthData {
                technical_debt: "Medium".to_string(),
                vulnerabilities: strings(&["Outdated dependency in package.json"]),
                recommendations: strings(&[
                    "Update Next.js",
                    "Implement caching",
                    "Add error boundaries",
                ]),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_kind() {
        assert_eq!(
            TaskResult::MarketScan(MarketScanReport::sample()).kind(),
            TaskKind::MarketScan
        );
        assert_eq!(
            TaskResult::CodeHealth(CodeHealthReport::sample()).kind(),
            TaskKind::CodeHealth
        );
    }

    #[test]
    fn test_untagged_payload_shape() {
        let json = serde_json::to_value(TaskResult::FundingWatch(FundingWatchReport::sample()))
            .unwrap();
        assert_eq!(json["deadlines_approaching"], 2);
        assert_eq!(json["data"]["programs"][0]["amount"], "$50M");

        let back: TaskResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), TaskKind::FundingWatch);
    }
}
