//! Startup validation of loaded configuration.

use super::AppConfig;
use super::error::{ConfigResult, ConfigurationError};

/// Anthropic accepts temperatures in this range.
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=1.0;

/// Checks value ranges before the server starts.
///
/// Missing provider keys are not errors: chat returns 502 without an
/// Anthropic key and competitor scans fall back to demo data without a
/// Tavily key. [`ConfigValidator::warnings`] reports those instead.
#[derive(Debug)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the entire application configuration.
    pub fn validate(config: &AppConfig) -> ConfigResult<()> {
        let mut errors = Vec::new();
        errors.extend(Self::validate_server(config));
        errors.extend(Self::validate_agent(config));
        errors.extend(Self::validate_llm(config));

        match ConfigurationError::collect(errors) {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    fn validate_server(config: &AppConfig) -> Vec<ConfigurationError> {
        let mut errors = Vec::new();
        if config.server.timeout_secs == 0 {
            errors.push(ConfigurationError::invalid(
                "server.timeout_secs",
                "request timeout must be greater than zero",
                "Set FOUNDEROS__SERVER__TIMEOUT_SECS to a positive number of seconds",
            ));
        }
        errors
    }

    fn validate_agent(config: &AppConfig) -> Vec<ConfigurationError> {
        let mut errors = Vec::new();
        if config.agent.history_capacity == 0 {
            errors.push(ConfigurationError::invalid(
                "agent.history_capacity",
                "task history must retain at least one run",
                "Set FOUNDEROS__AGENT__HISTORY_CAPACITY to a positive number (default 50)",
            ));
        }
        if config.agent.insight_capacity == 0 {
            errors.push(ConfigurationError::invalid(
                "agent.insight_capacity",
                "insight log must retain at least one insight",
                "Set FOUNDEROS__AGENT__INSIGHT_CAPACITY to a positive number (default 100)",
            ));
        }
        errors
    }

    fn validate_llm(config: &AppConfig) -> Vec<ConfigurationError> {
        let mut errors = Vec::new();
        if !TEMPERATURE_RANGE.contains(&config.llm.temperature) {
            errors.push(ConfigurationError::invalid(
                "llm.temperature",
                format!("{} is outside 0.0..=1.0", config.llm.temperature),
                "Set FOUNDEROS__LLM__TEMPERATURE between 0.0 and 1.0",
            ));
        }
        if config.llm.max_tokens == 0 {
            errors.push(ConfigurationError::invalid(
                "llm.max_tokens",
                "completion budget must be greater than zero",
                "Set FOUNDEROS__LLM__MAX_TOKENS to a positive number (default 1000)",
            ));
        }
        if config.llm.model.trim().is_empty() {
            errors.push(ConfigurationError::invalid(
                "llm.model",
                "model name is empty",
                "Set FOUNDEROS__LLM__MODEL, e.g. claude-3-5-sonnet-20241022",
            ));
        }
        errors
    }

    /// Degraded-mode notices for optional integrations that are not set up.
    #[must_use]
    pub fn warnings(config: &AppConfig) -> Vec<ConfigurationError> {
        let mut warnings = Vec::new();
        if config.providers.anthropic.key().is_none() {
            warnings.push(ConfigurationError::missing_optional(
                "Anthropic chat",
                "chat requests will fail with 502",
                "ANTHROPIC_API_KEY",
            ));
        }
        if config.providers.tavily.key().is_none() {
            warnings.push(ConfigurationError::missing_optional(
                "Tavily search",
                "competitor scans return demo data",
                "TAVILY_API_KEY",
            ));
        }
        warnings
    }
}
