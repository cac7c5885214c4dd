//! Errors raised by the ambient agent control surface.

use thiserror::Error;

/// Precondition failures of agent operations. None of them mutate state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    /// A cycle was requested while the agent is stopped.
    #[error("Agent is not active")]
    NotActive,

    /// The task type is not one of the known kinds.
    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),

    /// The priority is not `high`, `medium` or `low`.
    #[error("Unknown priority: {0}")]
    UnknownPriority(String),
}

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
