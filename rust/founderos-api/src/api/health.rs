//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

/// Create the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/ai/health", get(health_check))
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
    version: &'static str,
    services: ServicesStatus,
    /// Seconds since the server started.
    uptime: f64,
}

/// Whether each upstream integration is configured.
#[derive(Debug, Serialize)]
struct ServicesStatus {
    anthropic: bool,
    tavily: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = Utc::now();
    #[allow(clippy::cast_precision_loss, reason = "uptime in ms fits an f64 mantissa")]
    let uptime = (now - state.started_at).num_milliseconds() as f64 / 1000.0;

    Json(HealthResponse {
        status: "healthy",
        timestamp: now,
        version: env!("CARGO_PKG_VERSION"),
        services: ServicesStatus {
            anthropic: state.chat.settings().api_key.is_some(),
            tavily: state.search.is_some(),
        },
        uptime,
    })
}
