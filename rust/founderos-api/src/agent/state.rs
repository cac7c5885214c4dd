//! Scheduler state owned by the ambient agent.
//!
//! All mutation goes through the methods here, called with the agent's state
//! lock held. None of them await.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::executor::ExecutionError;
use super::history::BoundedLog;
use super::insight::Insight;
use super::report::TaskResult;
use super::task::{Priority, Task, TaskKind, TaskStatus};

/// Default number of archived task runs.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Default number of retained insights.
pub const DEFAULT_INSIGHT_CAPACITY: usize = 100;

/// Delay reported when no pending task exists.
pub const NO_PENDING_TASKS: i64 = -1;

/// Retention limits for history and insights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentLimits {
    /// Maximum archived task runs.
    pub history_capacity: usize,
    /// Maximum retained insights.
    pub insight_capacity: usize,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            insight_capacity: DEFAULT_INSIGHT_CAPACITY,
        }
    }
}

/// Aggregate counters since process start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetrics {
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub insights_generated: u64,
}

#[derive(Debug)]
pub(crate) struct AgentState {
    pub(crate) is_active: bool,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) last_heartbeat: DateTime<Utc>,
    pub(crate) active_tasks: Vec<Task>,
    pub(crate) completed_tasks: BoundedLog<Task>,
    pub(crate) insights: BoundedLog<Insight>,
    pub(crate) metrics: AgentMetrics,
}

impl AgentState {
    pub(crate) fn new(now: DateTime<Utc>, limits: AgentLimits) -> Self {
        Self {
            is_active: true,
            started_at: now,
            last_heartbeat: now,
            active_tasks: Vec::new(),
            completed_tasks: BoundedLog::new(limits.history_capacity),
            insights: BoundedLog::new(limits.insight_capacity),
            metrics: AgentMetrics::default(),
        }
    }

    /// The three recurring monitors installed by `start`, with staggered
    /// first runs.
    pub(crate) fn default_tasks(now: DateTime<Utc>) -> Vec<Task> {
        vec![
            Task::new(
                "market-scan-001",
                TaskKind::MarketScan,
                Priority::High,
                now - Duration::minutes(30),
                now + Duration::minutes(5),
            ),
            Task::new(
                "funding-watch-001",
                TaskKind::FundingWatch,
                Priority::Medium,
                now - Duration::minutes(60),
                now + Duration::minutes(10),
            ),
            Task::new(
                "ecosystem-monitor-001",
                TaskKind::EcosystemMonitor,
                Priority::Medium,
                now - Duration::minutes(45),
                now + Duration::minutes(15),
            ),
        ]
    }

    /// Milliseconds until the earliest pending task is due, clamped at zero.
    pub(crate) fn next_task_delay(&self, now: DateTime<Utc>) -> i64 {
        self.active_tasks
            .iter()
            .filter(|task| task.status == TaskStatus::Pending)
            .map(|task| task.next_run)
            .min()
            .map_or(NO_PENDING_TASKS, |next| {
                (next - now).num_milliseconds().max(0)
            })
    }

    /// Mark every due task as running and return copies in insertion order.
    pub(crate) fn claim_due(&mut self, now: DateTime<Utc>) -> Vec<Task> {
        self.active_tasks
            .iter_mut()
            .filter(|task| task.is_due(now))
            .map(|task| {
                task.status = TaskStatus::Running;
                task.clone()
            })
            .collect()
    }

    /// Archive a successful run and re-arm the task for its next occurrence.
    pub(crate) fn record_success(
        &mut self,
        claimed: Task,
        result: TaskResult,
        insights: Vec<Insight>,
        now: DateTime<Utc>,
    ) {
        let mut snapshot = claimed;
        snapshot.status = TaskStatus::Completed;
        snapshot.last_run = now;
        snapshot.next_run = now + snapshot.kind.interval();
        snapshot.data = Some(result);
        snapshot.insights = Some(insights.clone());
        snapshot.error = None;

        self.rearm(&snapshot);
        self.completed_tasks.push(snapshot);

        self.metrics.tasks_completed += 1;
        self.metrics.insights_generated += insights.len() as u64;
        self.insights.extend(insights);
    }

    /// Archive a failed run and re-arm the task at its regular interval.
    pub(crate) fn record_failure(
        &mut self,
        claimed: Task,
        error: &ExecutionError,
        now: DateTime<Utc>,
    ) {
        let mut snapshot = claimed;
        snapshot.status = TaskStatus::Error;
        snapshot.next_run = now + snapshot.kind.interval();
        snapshot.error = Some(error.to_string());

        self.rearm(&snapshot);
        self.completed_tasks.push(snapshot);

        self.metrics.tasks_failed += 1;
    }

    /// Replace the running task with a pending copy of `finished`. A task
    /// removed while it ran (stop, restart) stays removed.
    fn rearm(&mut self, finished: &Task) {
        let running = self
            .active_tasks
            .iter_mut()
            .find(|task| task.id == finished.id && task.status == TaskStatus::Running);

        match running {
            Some(task) => {
                *task = finished.clone();
                task.status = TaskStatus::Pending;
            }
            None => {
                tracing::debug!(
                    task_id = %finished.id,
                    "Task left the active set while running; not re-armed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::executor::SimulatedExecutor;
    use crate::agent::insight::synthesize;

    fn state_with(tasks: Vec<Task>, now: DateTime<Utc>) -> AgentState {
        let mut state = AgentState::new(now, AgentLimits::default());
        state.active_tasks = tasks;
        state
    }

    fn due_task(id: &str, kind: TaskKind, now: DateTime<Utc>) -> Task {
        Task::new(
            id,
            kind,
            Priority::Medium,
            DateTime::<Utc>::UNIX_EPOCH,
            now - Duration::seconds(1),
        )
    }

    #[test]
    fn test_default_tasks_are_staggered_and_pending() {
        let now = Utc::now();
        let tasks = AgentState::default_tasks(now);
        assert_eq!(tasks.len(), 3);
        assert!(tasks.iter().all(|t| t.status == TaskStatus::Pending));
        assert!(tasks.iter().all(|t| t.next_run > now));
        assert!(tasks[0].next_run < tasks[1].next_run);
        assert!(tasks[1].next_run < tasks[2].next_run);
    }

    #[test]
    fn test_next_task_delay() {
        let now = Utc::now();
        let empty = state_with(Vec::new(), now);
        assert_eq!(empty.next_task_delay(now), NO_PENDING_TASKS);

        let state = state_with(AgentState::default_tasks(now), now);
        assert_eq!(state.next_task_delay(now), 5 * 60 * 1000);

        let overdue = state_with(vec![due_task("late", TaskKind::MarketScan, now)], now);
        assert_eq!(overdue.next_task_delay(now), 0);
    }

    #[test]
    fn test_next_task_delay_ignores_running_tasks() {
        let now = Utc::now();
        let mut state = state_with(vec![due_task("a", TaskKind::MarketScan, now)], now);
        state.claim_due(now);
        assert_eq!(state.next_task_delay(now), NO_PENDING_TASKS);
    }

    #[test]
    fn test_claim_due_marks_running_in_order() {
        let now = Utc::now();
        let mut tasks = vec![
            due_task("a", TaskKind::FundingWatch, now),
            due_task("b", TaskKind::MarketScan, now),
        ];
        tasks.push(Task::new(
            "later",
            TaskKind::CodeHealth,
            Priority::High,
            DateTime::<Utc>::UNIX_EPOCH,
            now + Duration::minutes(1),
        ));
        let mut state = state_with(tasks, now);

        let claimed = state.claim_due(now);
        let ids: Vec<_> = claimed.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(state.active_tasks[0].status, TaskStatus::Running);
        assert_eq!(state.active_tasks[2].status, TaskStatus::Pending);

        // A second claim must not pick up running tasks.
        assert!(state.claim_due(now).is_empty());
    }

    #[test]
    fn test_record_success_archives_and_rearms() {
        let now = Utc::now();
        let mut state = state_with(vec![due_task("m", TaskKind::MarketScan, now)], now);
        let claimed = state.claim_due(now).remove(0);

        let result = SimulatedExecutor::sample(TaskKind::MarketScan);
        let insights = synthesize(&result, now);
        state.record_success(claimed, result, insights, now);

        let active = &state.active_tasks[0];
        assert_eq!(active.status, TaskStatus::Pending);
        assert_eq!(active.last_run, now);
        assert_eq!(active.next_run, now + Duration::minutes(15));

        let archived = state.completed_tasks.iter().next().unwrap();
        assert_eq!(archived.status, TaskStatus::Completed);
        assert!(archived.data.is_some());

        assert_eq!(state.metrics.tasks_completed, 1);
        assert_eq!(state.metrics.insights_generated, 1);
        assert_eq!(state.insights.len(), 1);
    }

    #[test]
    fn test_record_failure_archives_error_snapshot() {
        let now = Utc::now();
        let mut state = state_with(vec![due_task("f", TaskKind::FundingWatch, now)], now);
        let claimed = state.claim_due(now).remove(0);

        let err = ExecutionError::new(TaskKind::FundingWatch, "upstream down");
        state.record_failure(claimed, &err, now);

        let active = &state.active_tasks[0];
        assert_eq!(active.status, TaskStatus::Pending);
        assert_eq!(active.next_run, now + Duration::minutes(30));
        assert!(active.never_run());

        let archived = state.completed_tasks.iter().next().unwrap();
        assert_eq!(archived.status, TaskStatus::Error);
        assert_eq!(
            archived.error.as_deref(),
            Some("funding_watch execution failed: upstream down")
        );
        assert_eq!(state.metrics.tasks_failed, 1);
        assert_eq!(state.metrics.tasks_completed, 0);
    }

    #[test]
    fn test_removed_task_is_archived_but_not_rearmed() {
        let now = Utc::now();
        let mut state = state_with(vec![due_task("gone", TaskKind::CodeHealth, now)], now);
        let claimed = state.claim_due(now).remove(0);
        state.active_tasks.clear();

        let result = SimulatedExecutor::sample(TaskKind::CodeHealth);
        state.record_success(claimed, result, Vec::new(), now);

        assert!(state.active_tasks.is_empty());
        assert_eq!(state.completed_tasks.len(), 1);
    }

    #[test]
    fn test_history_respects_limits() {
        let now = Utc::now();
        let limits = AgentLimits {
            history_capacity: 2,
            insight_capacity: 3,
        };
        let mut state = AgentState::new(now, limits);

        for i in 0..5 {
            let task = due_task(&format!("t{i}"), TaskKind::MarketScan, now);
            let result = SimulatedExecutor::sample(TaskKind::MarketScan);
            let insights = synthesize(&result, now);
            state.record_success(task, result, insights, now);
        }

        assert_eq!(state.completed_tasks.len(), 2);
        assert_eq!(state.insights.len(), 3);
        let ids: Vec<_> = state.completed_tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t3", "t4"]);
        assert_eq!(state.metrics.insights_generated, 5);
    }
}
