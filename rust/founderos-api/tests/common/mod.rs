//! Shared fixtures for HTTP-level tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{TimeZone, Utc};

use founderos_api::AppState;
use founderos_api::agent::{AgentLimits, AmbientAgent, ManualClock, SimulatedExecutor};
use founderos_api::config::AppConfig;
use founderos_api::events::NormalizedEvent;
use founderos_api::llm::{EventStream, LlmDriver, LlmRequest, LlmSettings};
use founderos_api::search::{SearchError, SearchHit, SearchOptions, SearchProvider};
use founderos_api::server::build_router;
use parking_lot::Mutex;

/// Chat driver replaying a fixed script, or failing before streaming.
#[derive(Debug)]
pub struct ScriptedDriver {
    settings: LlmSettings,
    script: Option<Vec<anyhow::Result<NormalizedEvent>>>,
    pub last_request: Mutex<Option<LlmRequest>>,
}

impl ScriptedDriver {
    pub fn replaying(script: Vec<anyhow::Result<NormalizedEvent>>) -> Self {
        Self {
            settings: LlmSettings {
                api_key: Some("sk-ant-test".to_string()),
                ..LlmSettings::default()
            },
            script: Some(script),
            last_request: Mutex::new(None),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            settings: LlmSettings::default(),
            script: None,
            last_request: Mutex::new(None),
        }
    }
}

#[async_trait]
impl LlmDriver for ScriptedDriver {
    async fn stream(&self, req: LlmRequest) -> anyhow::Result<EventStream> {
        *self.last_request.lock() = Some(req);
        let Some(script) = &self.script else {
            anyhow::bail!("Anthropic API error (401 Unauthorized)");
        };
        let events: Vec<_> = script
            .iter()
            .map(|item| match item {
                Ok(event) => Ok(event.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            })
            .collect();
        Ok(Box::pin(futures::stream::iter(events)))
    }

    fn settings(&self) -> &LlmSettings {
        &self.settings
    }
}

/// Search provider returning the same hits for every query.
#[derive(Debug, Default)]
pub struct CannedSearch {
    pub hits: Vec<SearchHit>,
}

#[async_trait]
impl SearchProvider for CannedSearch {
    async fn search(
        &self,
        _query: &str,
        _options: SearchOptions,
    ) -> Result<Vec<SearchHit>, SearchError> {
        Ok(self.hits.clone())
    }
}

/// Search provider whose every query is rate limited.
#[derive(Debug, Default)]
pub struct FailingSearch;

#[async_trait]
impl SearchProvider for FailingSearch {
    async fn search(
        &self,
        _query: &str,
        _options: SearchOptions,
    ) -> Result<Vec<SearchHit>, SearchError> {
        Err(SearchError::Status {
            status: 429,
            body: "rate limited".to_string(),
        })
    }
}

/// Test harness around a server with a manual clock.
pub struct Harness {
    pub server: TestServer,
    pub clock: ManualClock,
    pub state: AppState,
}

pub struct HarnessBuilder {
    chat: Arc<dyn LlmDriver>,
    search: Option<Arc<dyn SearchProvider>>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            chat: Arc::new(ScriptedDriver::unreachable()),
            search: None,
        }
    }

    pub fn chat(mut self, driver: Arc<dyn LlmDriver>) -> Self {
        self.chat = driver;
        self
    }

    pub fn search(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(provider);
        self
    }

    pub fn build(self) -> Harness {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let agent = AmbientAgent::with_parts(
            Arc::new(SimulatedExecutor::instant()),
            Arc::new(clock.clone()),
            AgentLimits::default(),
        );
        let config = AppConfig::default();
        let state = AppState {
            config: Arc::new(config.clone()),
            agent,
            chat: self.chat,
            search: self.search,
            started_at: Utc::now(),
        };
        let server = TestServer::new(build_router(state.clone(), &config.server)).unwrap();
        Harness {
            server,
            clock,
            state,
        }
    }
}

pub fn harness() -> Harness {
    HarnessBuilder::new().build()
}
