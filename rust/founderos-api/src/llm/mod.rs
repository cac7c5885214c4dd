//! LLM driver abstractions.
//!
//! The [`LlmDriver`] trait is the streaming interface the chat endpoint
//! talks to. [`providers::AnthropicDriver`] is the production
//! implementation; tests substitute scripted drivers.

pub mod modes;
pub mod providers;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::events::NormalizedEvent;

pub use modes::ChatMode;

/// Default Anthropic API endpoint.
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Stream of normalized events produced by a driver.
pub type EventStream = Pin<Box<dyn Stream<Item = anyhow::Result<NormalizedEvent>> + Send>>;

/// LLM connection and model settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Base URL for the LLM API.
    pub base_url: String,
    /// API key for authentication.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature for sampling.
    pub temperature: f32,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl LlmSettings {
    /// Settings for the Anthropic provider from application config.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let provider = &config.providers.anthropic;
        Self {
            base_url: provider
                .base_url
                .clone()
                .unwrap_or_else(|| ANTHROPIC_BASE_URL.to_string()),
            api_key: provider.key().map(str::to_string),
            model: config.llm.model.clone(),
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Extra system instructions.
    System,
    /// User message.
    User,
    /// Assistant response.
    Assistant,
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: MessageRole,
    /// Text content.
    pub content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request to an LLM driver. Model and sampling come from [`LlmSettings`].
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// System prompt.
    pub system: Option<String>,
    /// Conversation messages.
    pub messages: Vec<Message>,
}

impl LlmRequest {
    /// Create a new request with messages.
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            system: None,
            messages,
        }
    }

    /// Set the system prompt.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Trait for LLM streaming drivers.
#[async_trait]
pub trait LlmDriver: Send + Sync {
    /// Start a streamed completion.
    ///
    /// Errors returned here happen before any content is produced; errors
    /// inside the stream happen after streaming began.
    async fn stream(&self, req: LlmRequest) -> anyhow::Result<EventStream>;

    /// Get the current settings.
    fn settings(&self) -> &LlmSettings;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let mut config = AppConfig::default();
        config.providers.anthropic.api_key = Some("sk-ant-test".into());
        config.llm.max_tokens = 500;

        let settings = LlmSettings::from_config(&config);
        assert_eq!(settings.base_url, ANTHROPIC_BASE_URL);
        assert_eq!(settings.api_key.as_deref(), Some("sk-ant-test"));
        assert_eq!(settings.model, "claude-3-5-sonnet-20241022");
        assert_eq!(settings.max_tokens, 500);
    }

    #[test]
    fn test_settings_debug_redacts_key() {
        let settings = LlmSettings {
            api_key: Some("sk-ant-secret".into()),
            ..LlmSettings::default()
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("sk-ant-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_message_wire_shape() {
        let msg: Message =
            serde_json::from_value(serde_json::json!({"role": "user", "content": "Hi"})).unwrap();
        assert_eq!(msg, Message::user("Hi"));
    }
}
