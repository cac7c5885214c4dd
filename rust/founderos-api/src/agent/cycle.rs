//! Cycle driver and background cycle loop.

use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::AmbientAgent;
use super::error::{AgentError, AgentResult};
use super::insight::synthesize;
use super::task::TaskStatus;
use crate::logging::OpTimer;

/// Outcome of one executed task within a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub task_id: String,
    pub status: TaskStatus,
    /// Number of insights produced. Absent on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionRecord {
    fn completed(task_id: String, insights: usize) -> Self {
        Self {
            task_id,
            status: TaskStatus::Completed,
            insights: Some(insights),
            error: None,
        }
    }

    fn failed(task_id: String, error: String) -> Self {
        Self {
            task_id,
            status: TaskStatus::Error,
            insights: None,
            error: Some(error),
        }
    }
}

/// Result of [`AmbientAgent::run_cycle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum CycleOutcome {
    /// Nothing was due.
    NoTasksReady {
        /// Milliseconds until the next pending task, or -1.
        next_task_in: i64,
        active_tasks: usize,
    },
    /// At least one task ran.
    CycleCompleted {
        executed_tasks: usize,
        results: Vec<ExecutionRecord>,
        /// Milliseconds until the next pending task, or -1.
        next_cycle_in: i64,
        total_insights: usize,
    },
}

impl AmbientAgent {
    /// Execute every due task once.
    ///
    /// Due tasks are claimed under the state lock, executed concurrently
    /// without it, and their outcomes applied one by one under the lock.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NotActive`] without touching state when the
    /// agent is stopped.
    pub async fn run_cycle(&self) -> AgentResult<CycleOutcome> {
        let now = self.clock.now();

        let claimed = {
            let mut state = self.state.lock();
            if !state.is_active {
                return Err(AgentError::NotActive);
            }
            let claimed = state.claim_due(now);
            if claimed.is_empty() {
                return Ok(CycleOutcome::NoTasksReady {
                    next_task_in: state.next_task_delay(now),
                    active_tasks: state.active_tasks.len(),
                });
            }
            claimed
        };

        let timer = OpTimer::new("agent", "cycle");
        tracing::info!(due = claimed.len(), "Executing due tasks");

        let runs = claimed.into_iter().map(|task| async move {
            let outcome = self.executor.execute(&task).await;
            (task, outcome)
        });
        let finished = join_all(runs).await;
        // Re-arm from completion time, not from when the cycle started.
        let finished_at = self.clock.now();

        let mut results = Vec::with_capacity(finished.len());
        let mut state = self.state.lock();
        for (task, outcome) in finished {
            let task_id = task.id.clone();
            match outcome {
                Ok(result) => {
                    let insights = synthesize(&result, finished_at);
                    let count = insights.len();
                    tracing::info!(
                        task_id = %task_id,
                        kind = %task.kind,
                        status = %TaskStatus::Completed,
                        insights = count,
                        "Task completed"
                    );
                    state.record_success(task, result, insights, finished_at);
                    results.push(ExecutionRecord::completed(task_id, count));
                }
                Err(err) => {
                    tracing::warn!(
                        task_id = %task_id,
                        kind = %task.kind,
                        status = %TaskStatus::Error,
                        error = %err,
                        "Task failed"
                    );
                    state.record_failure(task, &err, finished_at);
                    results.push(ExecutionRecord::failed(task_id, err.to_string()));
                }
            }
        }

        let outcome = CycleOutcome::CycleCompleted {
            executed_tasks: results.len(),
            results,
            next_cycle_in: state.next_task_delay(finished_at),
            total_insights: state.insights.len(),
        };
        drop(state);

        timer.finish();
        Ok(outcome)
    }
}

/// Run `agent.run_cycle()` every `period` until `shutdown` is cancelled.
pub fn spawn_cycle_loop(
    agent: AmbientAgent,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(period_secs = period.as_secs(), "Cycle loop started");

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    tracing::info!("Cycle loop stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match agent.run_cycle().await {
                        Ok(CycleOutcome::CycleCompleted { executed_tasks, total_insights, .. }) => {
                            tracing::info!(executed_tasks, total_insights, "Cycle completed");
                        }
                        Ok(CycleOutcome::NoTasksReady { next_task_in, .. }) => {
                            tracing::debug!(next_task_in, "No tasks ready");
                        }
                        Err(AgentError::NotActive) => {
                            tracing::debug!("Agent inactive, skipping cycle");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Cycle failed");
                        }
                    }
                }
            }
        }
    })
}
