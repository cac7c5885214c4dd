//! Ambient agent control endpoint.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::agent::{Heartbeat, Priority, Task, TaskKind};
use crate::error::{ApiError, ApiResult};

/// Create the agent router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/langchain/ambient-agent",
        get(heartbeat).post(command),
    )
}

/// Control request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCommand {
    pub action: String,
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Started {
    status: &'static str,
    message: &'static str,
    active_tasks: Vec<Task>,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct Stopped {
    status: &'static str,
    message: &'static str,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Scheduled {
    status: &'static str,
    task: Task,
    active_tasks: usize,
}

/// `GET`: liveness and recent insights.
async fn heartbeat(State(state): State<AppState>) -> Json<Heartbeat> {
    Json(state.agent.heartbeat())
}

/// `POST`: dispatch a control action.
async fn command(
    State(state): State<AppState>,
    body: Result<Json<AgentCommand>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(cmd) = body?;
    let agent = &state.agent;
    tracing::debug!(action = %cmd.action, "Agent command");

    let response = match cmd.action.as_str() {
        "start" => Json(Started {
            status: "started",
            message: "Ambient agent is now active",
            active_tasks: agent.start(),
            timestamp: agent.now(),
        })
        .into_response(),
        "stop" => {
            agent.stop();
            Json(Stopped {
                status: "stopped",
                message: "Ambient agent has been stopped",
                timestamp: agent.now(),
            })
            .into_response()
        }
        "schedule_task" => {
            let kind: TaskKind = cmd
                .task_type
                .as_deref()
                .ok_or_else(|| ApiError::BadRequest("taskType is required".to_string()))?
                .parse()?;
            let priority = cmd
                .priority
                .as_deref()
                .map(str::parse::<Priority>)
                .transpose()?
                .unwrap_or_default();

            let scheduled = agent.schedule_task(kind, priority);
            Json(Scheduled {
                status: "scheduled",
                task: scheduled.task,
                active_tasks: scheduled.active_tasks,
            })
            .into_response()
        }
        "get_insights" => Json(agent.insights()).into_response(),
        "execute_cycle" => Json(agent.run_cycle().await?).into_response(),
        _ => return Err(ApiError::BadRequest("Unknown action".to_string())),
    };

    Ok(response)
}
