//! Ambient agent: recurring monitoring tasks, insight generation and the
//! control surface used by the HTTP layer.
//!
//! [`AmbientAgent`] is a cheap cloneable handle. All clones share one
//! scheduler state behind a mutex that is never held across an await.

pub mod clock;
pub mod cycle;
pub mod error;
pub mod executor;
pub mod history;
pub mod insight;
pub mod report;
pub mod state;
pub mod task;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cycle::{CycleOutcome, ExecutionRecord, spawn_cycle_loop};
pub use error::{AgentError, AgentResult};
pub use executor::{ExecutionError, SimulatedExecutor, TaskExecutor};
pub use insight::{CategoryBreakdown, Insight, InsightCategory};
pub use report::TaskResult;
pub use state::{AgentLimits, AgentMetrics};
pub use task::{Priority, Task, TaskKind, TaskStatus};

use crate::config::AgentConfig;
use state::AgentState;

/// Delay before a newly scheduled task becomes due.
const SCHEDULE_DELAY_MINUTES: i64 = 2;

/// Insights returned by [`AmbientAgent::insights`].
const DIGEST_INSIGHT_LIMIT: usize = 20;

/// Insights returned by [`AmbientAgent::heartbeat`].
const HEARTBEAT_INSIGHT_LIMIT: usize = 5;

/// Whether the agent accepts cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Inactive,
}

/// Liveness report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Heartbeat {
    pub status: AgentStatus,
    pub last_heartbeat: DateTime<Utc>,
    pub active_tasks: usize,
    /// Newest first.
    pub recent_insights: Vec<Insight>,
    /// Milliseconds since the agent was created.
    pub uptime: i64,
    pub metrics: AgentMetrics,
}

/// Recent insights with per-category counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightDigest {
    /// Newest first.
    pub insights: Vec<Insight>,
    /// Number of retained insights.
    pub total: usize,
    pub categories: CategoryBreakdown,
    pub last_updated: DateTime<Utc>,
}

/// A freshly scheduled task and the resulting active count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    pub task: Task,
    pub active_tasks: usize,
}

/// Point-in-time copy of the scheduler state.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSnapshot {
    pub is_active: bool,
    pub active_tasks: Vec<Task>,
    /// Oldest first.
    pub completed_tasks: Vec<Task>,
    /// Oldest first.
    pub insights: Vec<Insight>,
    pub metrics: AgentMetrics,
    pub last_heartbeat: DateTime<Utc>,
}

/// Handle to the ambient task scheduler.
#[derive(Clone)]
pub struct AmbientAgent {
    state: Arc<Mutex<AgentState>>,
    executor: Arc<dyn TaskExecutor>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for AmbientAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AmbientAgent")
            .field("is_active", &state.is_active)
            .field("active_tasks", &state.active_tasks.len())
            .field("completed_tasks", &state.completed_tasks.len())
            .field("insights", &state.insights.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl AmbientAgent {
    /// Create an active agent with no tasks, using the system clock.
    #[must_use]
    pub fn new(executor: Arc<dyn TaskExecutor>) -> Self {
        Self::with_parts(executor, Arc::new(SystemClock), AgentLimits::default())
    }

    /// Create an agent from explicit collaborators.
    #[must_use]
    pub fn with_parts(
        executor: Arc<dyn TaskExecutor>,
        clock: Arc<dyn Clock>,
        limits: AgentLimits,
    ) -> Self {
        let state = AgentState::new(clock.now(), limits);
        Self {
            state: Arc::new(Mutex::new(state)),
            executor,
            clock,
        }
    }

    /// Create an agent with a simulated executor configured from `config`.
    #[must_use]
    pub fn from_config(config: &AgentConfig) -> Self {
        let limits = AgentLimits {
            history_capacity: config.history_capacity,
            insight_capacity: config.insight_capacity,
        };
        Self::with_parts(
            Arc::new(SimulatedExecutor::new(config.simulate_latency)),
            Arc::new(SystemClock),
            limits,
        )
    }

    /// Current time according to the agent's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Whether cycles may execute.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.lock().is_active
    }

    /// Activate the agent and replace the active set with the default
    /// recurring tasks.
    pub fn start(&self) -> Vec<Task> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.is_active = true;
        state.last_heartbeat = now;
        state.active_tasks = AgentState::default_tasks(now);
        tracing::info!(active_tasks = state.active_tasks.len(), "Ambient agent started");
        state.active_tasks.clone()
    }

    /// Deactivate the agent and drop every active task. History and
    /// insights are kept.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        state.is_active = false;
        let dropped = std::mem::take(&mut state.active_tasks).len();
        tracing::info!(dropped_tasks = dropped, "Ambient agent stopped");
    }

    /// Append a pending task due in two minutes. Allowed while stopped.
    pub fn schedule_task(&self, kind: TaskKind, priority: Priority) -> ScheduledTask {
        let now = self.clock.now();
        let task = Task::new(
            task_id(now),
            kind,
            priority,
            DateTime::<Utc>::UNIX_EPOCH,
            now + Duration::minutes(SCHEDULE_DELAY_MINUTES),
        );

        let mut state = self.state.lock();
        state.active_tasks.push(task.clone());
        tracing::info!(task_id = %task.id, kind = %kind, priority = priority.as_str(), "Task scheduled");

        ScheduledTask {
            task,
            active_tasks: state.active_tasks.len(),
        }
    }

    /// Newest retained insights with category counts.
    #[must_use]
    pub fn insights(&self) -> InsightDigest {
        let state = self.state.lock();
        InsightDigest {
            insights: state
                .insights
                .newest(DIGEST_INSIGHT_LIMIT)
                .cloned()
                .collect(),
            total: state.insights.len(),
            categories: CategoryBreakdown::tally(state.insights.iter()),
            last_updated: state.last_heartbeat,
        }
    }

    /// Refresh the heartbeat and report liveness.
    pub fn heartbeat(&self) -> Heartbeat {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.last_heartbeat = now;

        Heartbeat {
            status: if state.is_active {
                AgentStatus::Active
            } else {
                AgentStatus::Inactive
            },
            last_heartbeat: now,
            active_tasks: state.active_tasks.len(),
            recent_insights: state
                .insights
                .newest(HEARTBEAT_INSIGHT_LIMIT)
                .cloned()
                .collect(),
            uptime: (now - state.started_at).num_milliseconds(),
            metrics: state.metrics,
        }
    }

    /// Copy of the full scheduler state.
    #[must_use]
    pub fn snapshot(&self) -> AgentSnapshot {
        let state = self.state.lock();
        AgentSnapshot {
            is_active: state.is_active,
            active_tasks: state.active_tasks.clone(),
            completed_tasks: state.completed_tasks.iter().cloned().collect(),
            insights: state.insights.iter().cloned().collect(),
            metrics: state.metrics,
            last_heartbeat: state.last_heartbeat,
        }
    }
}

/// `task-<millis>-<9 lowercase alphanumerics>`.
fn task_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("task-{}-{suffix}", now.timestamp_millis())
}
