//! Normalized streaming events.
//!
//! LLM drivers translate provider-specific stream frames into
//! [`NormalizedEvent`]s so the chat endpoint never sees wire formats.

use serde::{Deserialize, Serialize};

/// A normalized streaming event from an LLM provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NormalizedEvent {
    /// Partial message content.
    MessageDelta {
        /// The content delta.
        content: String,
    },

    /// Token accounting, reported once near the end of a stream.
    Usage {
        prompt_tokens: u32,
        completion_tokens: u32,
        total_tokens: u32,
    },

    /// Provider-side failure reported inside the stream.
    Error {
        /// Error message.
        message: String,
    },

    /// Stream done signal.
    Done {
        /// Finish reason.
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

impl NormalizedEvent {
    /// Create a message delta event.
    pub fn message_delta(content: impl Into<String>) -> Self {
        Self::MessageDelta {
            content: content.into(),
        }
    }

    /// Create a usage event, deriving the total.
    #[must_use]
    pub fn usage(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self::Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    /// Create an error event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Create a done event.
    #[must_use]
    pub fn done() -> Self {
        Self::Done {
            finish_reason: None,
        }
    }

    /// Create a done event with finish reason.
    pub fn done_with_reason(reason: impl Into<String>) -> Self {
        Self::Done {
            finish_reason: Some(reason.into()),
        }
    }

    /// SSE event name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::MessageDelta { .. } => "delta",
            Self::Usage { .. } => "usage",
            Self::Error { .. } => "error",
            Self::Done { .. } => "done",
        }
    }

    /// Whether no further events follow.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::Done { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_types() {
        assert_eq!(NormalizedEvent::message_delta("hi").event_type(), "delta");
        assert_eq!(NormalizedEvent::usage(1, 2).event_type(), "usage");
        assert_eq!(NormalizedEvent::error("x").event_type(), "error");
        assert_eq!(NormalizedEvent::done().event_type(), "done");
    }

    #[test]
    fn test_usage_total() {
        assert_eq!(
            NormalizedEvent::usage(10, 32),
            NormalizedEvent::Usage {
                prompt_tokens: 10,
                completion_tokens: 32,
                total_tokens: 42,
            }
        );
    }

    #[test]
    fn test_terminal_events() {
        assert!(NormalizedEvent::done_with_reason("end_turn").is_terminal());
        assert!(NormalizedEvent::error("overloaded").is_terminal());
        assert!(!NormalizedEvent::message_delta("a").is_terminal());
    }

    #[test]
    fn test_serialization_is_tagged() {
        let json = serde_json::to_value(NormalizedEvent::message_delta("Hello")).unwrap();
        assert_eq!(json["type"], "message_delta");
        assert_eq!(json["content"], "Hello");

        let done = serde_json::to_value(NormalizedEvent::done()).unwrap();
        assert!(done.get("finish_reason").is_none());
    }
}
