//! Configuration management for the FounderOS API.
//!
//! Sources are layered in order: built-in defaults, an optional
//! `config/founderos.{toml,yaml}` file (or the path given on the command
//! line), then `FOUNDEROS__SECTION__KEY` environment variables. Provider
//! keys are also read from `ANTHROPIC_API_KEY` and `TAVILY_API_KEY`.
//!
//! ```rust,ignore
//! use founderos_api::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! ```

pub mod error;
pub mod validator;

pub use error::{ConfigResult, ConfigurationError};
pub use validator::ConfigValidator;

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Ambient agent settings.
    #[serde(default)]
    pub agent: AgentConfig,
    /// Upstream provider credentials.
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Chat completion settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load and validate configuration from the default locations.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(None)
    }

    /// Load and validate configuration, reading `path` instead of the
    /// default config file when given.
    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = Self::load_unchecked(path)?;

        ConfigValidator::validate(&config)
            .map_err(|e| anyhow::anyhow!("Configuration validation failed:\n\n{e}"))?;

        Ok(config)
    }

    /// Load configuration without validation.
    pub fn load_unchecked(path: Option<&Path>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config/founderos").required(false),
        };

        let config = config::Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("llm.model", default_model())?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("FOUNDEROS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            app_config.providers.anthropic.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("TAVILY_API_KEY") {
            app_config.providers.tavily.api_key = Some(key);
        }

        Ok(app_config)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// API port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Ambient agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Seconds between background cycles. `0` disables the loop; cycles then
    /// run only on `execute_cycle` requests.
    #[serde(default = "default_cycle_interval")]
    pub cycle_interval_secs: u64,
    /// Archived task runs kept.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Insights kept.
    #[serde(default = "default_insight_capacity")]
    pub insight_capacity: usize,
    /// Whether simulated tasks sleep for their nominal duration.
    #[serde(default = "default_true")]
    pub simulate_latency: bool,
}

fn default_cycle_interval() -> u64 {
    60
}

fn default_history_capacity() -> usize {
    crate::agent::state::DEFAULT_HISTORY_CAPACITY
}

fn default_insight_capacity() -> usize {
    crate::agent::state::DEFAULT_INSIGHT_CAPACITY
}

fn default_true() -> bool {
    true
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            cycle_interval_secs: default_cycle_interval(),
            history_capacity: default_history_capacity(),
            insight_capacity: default_insight_capacity(),
            simulate_latency: true,
        }
    }
}

/// Upstream provider configurations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Anthropic Messages API.
    #[serde(default)]
    pub anthropic: ProviderConfig,
    /// Tavily search API.
    #[serde(default)]
    pub tavily: ProviderConfig,
}

/// Individual provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Base URL override.
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// The API key, if set and non-empty.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

/// Chat completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model to use.
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens to generate.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to emit JSON lines.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
