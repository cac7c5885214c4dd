//! HTTP error type and its JSON response mapping.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::AgentError;

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Handler errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or unsupported request.
    #[error("{0}")]
    BadRequest(String),

    /// Agent precondition failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// An upstream provider failed before a response could start.
    #[error("Failed to process AI request")]
    Upstream(#[source] anyhow::Error),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Agent(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Upstream(cause) | Self::Internal(cause) => {
                tracing::error!(status = status.as_u16(), error = %cause, "Request failed");
            }
            Self::BadRequest(_) | Self::Agent(_) => {
                tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
            }
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::BadRequest("Unknown action".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AgentError::NotActive).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Upstream(anyhow::anyhow!("connection reset")).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_messages_hide_upstream_detail() {
        assert_eq!(
            ApiError::from(AgentError::UnknownTaskType("payroll".into())).to_string(),
            "Unknown task type: payroll"
        );
        assert_eq!(
            ApiError::Upstream(anyhow::anyhow!("Anthropic API error (401)")).to_string(),
            "Failed to process AI request"
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).to_string(),
            "Internal server error"
        );
    }
}
