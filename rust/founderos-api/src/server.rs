//! HTTP server setup and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chrono::Utc;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::agent::AmbientAgent;
use crate::api;
use crate::config::{AppConfig, ConfigValidator, ServerConfig};
use crate::llm::LlmSettings;
use crate::llm::providers::create_driver;
use crate::logging::OpTimer;
use crate::search::{SearchProvider, TavilyClient};
use crate::{AppState, log_banner, log_init_step, log_init_warning, log_success};

/// FounderOS API version (from Cargo.toml).
const VERSION: &str = env!("CARGO_PKG_VERSION");

const INIT_STEPS: u8 = 4;

/// Build the application state and router from configuration.
///
/// The returned state shares its agent with the router so the caller can
/// drive background cycles against the same scheduler.
pub fn create_app(config: AppConfig) -> anyhow::Result<(Router, AppState)> {
    let overall_timer = OpTimer::new("server", "create_app");

    log_banner!(
        format!("🚀 FounderOS API v{VERSION}"),
        format!(
            "Model: {} | Cycle interval: {}s",
            config.llm.model, config.agent.cycle_interval_secs
        )
    );

    for warning in ConfigValidator::warnings(&config) {
        log_init_warning!(warning);
    }

    // [1/4] Chat driver
    let step_timer = OpTimer::new("server", "chat_driver");
    let llm_settings = LlmSettings::from_config(&config);
    let chat_info = format!(
        "⚙️ Anthropic ({}) {}",
        llm_settings.model,
        if llm_settings.api_key.is_some() {
            "✓"
        } else {
            "✗ No API key"
        }
    );
    let chat = create_driver(llm_settings)?;
    log_init_step!(1, INIT_STEPS, "Chat Driver", chat_info);
    step_timer.finish();

    // [2/4] Search provider
    let step_timer = OpTimer::new("server", "search_provider");
    let tavily = &config.providers.tavily;
    let search: Option<Arc<dyn SearchProvider>> = match tavily.key() {
        Some(key) => {
            let client = TavilyClient::new(key, tavily.base_url.clone())?;
            log_init_step!(2, INIT_STEPS, "Search Provider", "🔎 Tavily ✓");
            Some(Arc::new(client))
        }
        None => {
            log_init_step!(2, INIT_STEPS, "Search Provider", "🔎 Demo data");
            None
        }
    };
    step_timer.finish();

    // [3/4] Ambient agent
    let step_timer = OpTimer::new("server", "ambient_agent");
    let agent = AmbientAgent::from_config(&config.agent);
    log_init_step!(
        3,
        INIT_STEPS,
        "Ambient Agent",
        format!(
            "🤖 history {} / insights {}",
            config.agent.history_capacity, config.agent.insight_capacity
        )
    );
    step_timer.finish();

    let state = AppState {
        config: Arc::new(config),
        agent,
        chat,
        search,
        started_at: Utc::now(),
    };

    // [4/4] Router
    let step_timer = OpTimer::new("server", "router");
    let app = build_router(state.clone(), &state.config.server);
    log_init_step!(4, INIT_STEPS, "Router", "🌐 Routes + middleware configured");
    step_timer.finish();

    overall_timer.finish();
    log_success!("FounderOS API server created successfully");

    Ok((app, state))
}

/// Attach the API routes and middleware to `state`.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    api::create_router()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.timeout_secs),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_app_without_keys() {
        let mut config = AppConfig::default();
        config.providers.anthropic.api_key = None;
        config.providers.tavily.api_key = None;

        let (_app, state) = create_app(config).unwrap();
        assert!(state.search.is_none());
        assert!(state.chat.settings().api_key.is_none());
        assert!(state.agent.is_active());
    }

    #[test]
    fn test_create_app_with_tavily_key() {
        let mut config = AppConfig::default();
        config.providers.tavily.api_key = Some("tvly-test".to_string());

        let (_app, state) = create_app(config).unwrap();
        assert!(state.search.is_some());
    }
}
