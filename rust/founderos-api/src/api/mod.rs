//! HTTP API endpoints.

pub mod agent;
pub mod chat;
pub mod health;
pub mod search;

use axum::Router;

use crate::AppState;

/// Create the API router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(agent::router())
        .merge(chat::router())
        .merge(search::router())
}
