//! Task executors.
//!
//! The scheduler only depends on the [`TaskExecutor`] trait. The default
//! [`SimulatedExecutor`] stands in for real monitoring work with a fixed delay
//! and a synthetic payload per kind.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::report::{
    CodeHealthReport, EcosystemReport, FundingWatchReport, MarketScanReport, TaskResult,
};
use super::task::{Task, TaskKind};

/// A failed task run. Isolated to the task that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} execution failed: {reason}")]
pub struct ExecutionError {
    /// Kind of the failing task.
    pub kind: TaskKind,
    /// Failure description.
    pub reason: String,
}

impl ExecutionError {
    /// Create an execution error for `kind`.
    pub fn new(kind: TaskKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

/// Strategy that performs the work of one task run.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Run `task` once and return its payload.
    async fn execute(&self, task: &Task) -> Result<TaskResult, ExecutionError>;
}

/// Executor producing fixed synthetic payloads after an artificial delay.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedExecutor {
    simulate_latency: bool,
}

impl SimulatedExecutor {
    /// Create an executor, optionally sleeping for each kind's latency.
    #[must_use]
    pub const fn new(simulate_latency: bool) -> Self {
        Self { simulate_latency }
    }

    /// Executor that returns immediately.
    #[must_use]
    pub const fn instant() -> Self {
        Self::new(false)
    }

    /// Artificial processing time for `kind`.
    #[must_use]
    pub const fn latency(kind: TaskKind) -> Duration {
        match kind {
            TaskKind::MarketScan => Duration::from_millis(1000),
            TaskKind::FundingWatch => Duration::from_millis(800),
            TaskKind::EcosystemMonitor => Duration::from_millis(600),
            TaskKind::CodeHealth => Duration::from_millis(400),
        }
    }

    /// Synthetic payload for `kind`.
    #[must_use]
    pub fn sample(kind: TaskKind) -> TaskResult {
        match kind {
            TaskKind::MarketScan => TaskResult::MarketScan(MarketScanReport::sample()),
            TaskKind::FundingWatch => TaskResult::FundingWatch(FundingWatchReport::sample()),
            TaskKind::EcosystemMonitor => TaskResult::EcosystemMonitor(EcosystemReport::sample()),
            TaskKind::CodeHealth => TaskResult::CodeHealth(CodeHealthReport::sample()),
        }
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl TaskExecutor for SimulatedExecutor {
    async fn execute(&self, task: &Task) -> Result<TaskResult, ExecutionError> {
        if self.simulate_latency {
            tokio::time::sleep(Self::latency(task.kind)).await;
        }
        tracing::debug!(task_id = %task.id, kind = %task.kind, "Simulated task run finished");
        Ok(Self::sample(task.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::agent::task::Priority;

    fn task(kind: TaskKind) -> Task {
        let now = Utc::now();
        Task::new("t", kind, Priority::Medium, now, now)
    }

    #[tokio::test]
    async fn test_payload_matches_kind() {
        let executor = SimulatedExecutor::instant();
        for kind in TaskKind::ALL {
            let result = executor.execute(&task(kind)).await.unwrap();
            assert_eq!(result.kind(), kind);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let executor = SimulatedExecutor::default();
        let started = tokio::time::Instant::now();
        executor.execute(&task(TaskKind::FundingWatch)).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(800));
    }

    #[test]
    fn test_latencies_within_range() {
        for kind in TaskKind::ALL {
            let latency = SimulatedExecutor::latency(kind);
            assert!(latency >= Duration::from_millis(400));
            assert!(latency <= Duration::from_millis(1000));
        }
    }

    #[test]
    fn test_error_message() {
        let err = ExecutionError::new(TaskKind::CodeHealth, "repository unreachable");
        assert_eq!(
            err.to_string(),
            "code_health execution failed: repository unreachable"
        );
    }
}
