//! Task model for the ambient agent.
//!
//! A [`Task`] is a unit of recurring simulated monitoring work. Its kind is a
//! closed set ([`TaskKind`]), so adding a new kind forces every executor and
//! insight rule to handle it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::AgentError;
use super::insight::Insight;
use super::report::TaskResult;

/// Kind of monitoring work a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Competitor and market trend scan.
    MarketScan,
    /// Funding program and deadline watch.
    FundingWatch,
    /// Repository health check.
    CodeHealth,
    /// Accelerator, event and networking monitor.
    EcosystemMonitor,
}

impl TaskKind {
    /// Every task kind, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::MarketScan,
        Self::FundingWatch,
        Self::CodeHealth,
        Self::EcosystemMonitor,
    ];

    /// Wire name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MarketScan => "market_scan",
            Self::FundingWatch => "funding_watch",
            Self::CodeHealth => "code_health",
            Self::EcosystemMonitor => "ecosystem_monitor",
        }
    }

    /// Fixed recurrence interval between two runs of this kind.
    #[must_use]
    pub fn interval(&self) -> Duration {
        match self {
            Self::MarketScan => Duration::minutes(15),
            Self::FundingWatch => Duration::minutes(30),
            Self::EcosystemMonitor => Duration::minutes(60),
            Self::CodeHealth => Duration::minutes(120),
        }
    }

    /// Name of the logical agent that reports insights for this kind.
    #[must_use]
    pub const fn agent_label(&self) -> &'static str {
        match self {
            Self::MarketScan => "Market Scan Agent",
            Self::FundingWatch => "Funding Watch Agent",
            Self::CodeHealth => "Code Health Agent",
            Self::EcosystemMonitor => "Ecosystem Monitor Agent",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AgentError::UnknownTaskType(s.to_string()))
    }
}

/// Lifecycle status of a task.
///
/// Transitions are `Pending -> Running -> {Completed | Error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for `next_run`.
    Pending,
    /// Claimed by a cycle and executing.
    Running,
    /// Last run succeeded.
    Completed,
    /// Last run failed.
    Error,
}

impl TaskStatus {
    /// Wire name of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    /// Whether this status ends a run.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory priority. Stored and reported, never used for ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// High priority.
    High,
    /// Medium priority.
    #[default]
    Medium,
    /// Low priority.
    Low,
}

impl Priority {
    /// Wire name of this priority.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(AgentError::UnknownPriority(other.to_string())),
        }
    }
}

/// A recurring monitoring task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID.
    pub id: String,
    /// Task kind.
    #[serde(rename = "type")]
    pub kind: TaskKind,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Advisory priority.
    pub priority: Priority,
    /// Last completed run, or the Unix epoch if never run.
    pub last_run: DateTime<Utc>,
    /// Earliest time the task may run again.
    pub next_run: DateTime<Utc>,
    /// Payload of the last run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TaskResult>,
    /// Insights produced by the last run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Vec<Insight>>,
    /// Failure message of the last run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Task {
    /// Create a pending task.
    pub fn new(
        id: impl Into<String>,
        kind: TaskKind,
        priority: Priority,
        last_run: DateTime<Utc>,
        next_run: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            status: TaskStatus::Pending,
            priority,
            last_run,
            next_run,
            data: None,
            insights: None,
            error: None,
        }
    }

    /// Whether the task may be claimed by a cycle running at `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Pending && self.next_run <= now
    }

    /// Whether the task has never completed a run.
    #[must_use]
    pub fn never_run(&self) -> bool {
        self.last_run == DateTime::<Utc>::UNIX_EPOCH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_wire_name() {
        for kind in TaskKind::ALL {
            assert_eq!(kind.as_str().parse::<TaskKind>().unwrap(), kind);
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                serde_json::json!(kind.as_str())
            );
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = "weather_watch".parse::<TaskKind>().unwrap_err();
        assert_eq!(err, AgentError::UnknownTaskType("weather_watch".into()));
    }

    #[test]
    fn test_intervals() {
        assert_eq!(TaskKind::MarketScan.interval(), Duration::minutes(15));
        assert_eq!(TaskKind::FundingWatch.interval(), Duration::minutes(30));
        assert_eq!(TaskKind::EcosystemMonitor.interval(), Duration::minutes(60));
        assert_eq!(TaskKind::CodeHealth.interval(), Duration::minutes(120));
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_is_due_requires_pending() {
        let now = Utc::now();
        let mut task = Task::new(
            "t-1",
            TaskKind::MarketScan,
            Priority::High,
            DateTime::<Utc>::UNIX_EPOCH,
            now - Duration::seconds(1),
        );
        assert!(task.is_due(now));
        assert!(task.never_run());

        task.status = TaskStatus::Running;
        assert!(!task.is_due(now));

        task.status = TaskStatus::Pending;
        task.next_run = now + Duration::seconds(1);
        assert!(!task.is_due(now));
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let now = Utc::now();
        let task = Task::new("t-2", TaskKind::FundingWatch, Priority::Low, now, now);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["type"], "funding_watch");
        assert_eq!(json["status"], "pending");
        assert!(json.get("lastRun").is_some());
        assert!(json.get("nextRun").is_some());
        assert!(json.get("data").is_none());
    }
}
