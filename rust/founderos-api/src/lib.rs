//! FounderOS API - ambient intelligence agent for startup founders.
//!
//! The service combines a small in-process scheduler with two upstream relays:
//!
//! - **Ambient agent**: recurring market, funding and ecosystem monitoring
//!   tasks that run in cycles and turn their reports into insights
//! - **Chat relay**: mode-specific system prompts streamed from Anthropic as SSE
//! - **Competitor scan**: concurrent Tavily searches synthesized into
//!   competitor insights and market trends
//!
//! # Architecture
//!
//! - [`agent`]: task lifecycle, cycle driver, executor and insight synthesis
//! - [`config`]: layered configuration and validation
//! - [`llm`]: chat driver abstraction and the Anthropic provider
//! - [`events`]: normalized streaming event model
//! - [`search`]: search provider abstraction, Tavily client and scan synthesis
//! - [`api`]: HTTP endpoints
//! - [`server`]: router assembly and middleware
//!
//! # Example
//!
//! ```rust,ignore
//! use founderos_api::{config::AppConfig, server::create_app};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let (app, _state) = create_app(config)?;
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod llm;
pub mod logging;
pub mod search;
pub mod server;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use agent::AmbientAgent;
use config::AppConfig;
use llm::LlmDriver;
use search::SearchProvider;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Ambient agent handle.
    pub agent: AmbientAgent,
    /// Chat completion driver.
    pub chat: Arc<dyn LlmDriver>,
    /// Search provider for competitor scans. `None` serves demo data.
    pub search: Option<Arc<dyn SearchProvider>>,
    /// Process start, for health uptime.
    pub started_at: DateTime<Utc>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &"AppConfig")
            .field("agent", &self.agent)
            .field("chat", &self.chat.settings().model)
            .field("search", &self.search.is_some())
            .field("started_at", &self.started_at)
            .finish()
    }
}
