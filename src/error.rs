//! Switchyard error types

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Switchyard error types
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    // Admission errors
    #[error("rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },

    // Client errors
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    // Upstream errors
    #[error("provider call failed: {0}")]
    ProviderFailure(String),

    /// The inbound request was cancelled while the provider call was in flight.
    #[error("request cancelled")]
    Cancelled,

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),

    // Engine errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`GatewayError`].
///
/// Several variants collapse into one kind: cancellation and timeouts are
/// provider failures from the caller's point of view, and a JSON decode
/// failure is just another malformed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RateLimited,
    InvalidRequest,
    UnsupportedProvider,
    ProviderFailure,
    InternalError,
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::RateLimited { .. } => ErrorKind::RateLimited,
            GatewayError::InvalidRequest(_) | GatewayError::Json(_) => ErrorKind::InvalidRequest,
            GatewayError::UnsupportedProvider(_) => ErrorKind::UnsupportedProvider,
            GatewayError::ProviderFailure(_)
            | GatewayError::Cancelled
            | GatewayError::Timeout(_) => ErrorKind::ProviderFailure,
            GatewayError::Configuration(_) | GatewayError::Internal(_) => {
                ErrorKind::InternalError
            }
        }
    }

    /// Whether the caller may retry the same request unchanged.
    ///
    /// The gateway itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RateLimited | ErrorKind::ProviderFailure
        )
    }

    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::RateLimited { .. } => 429,
            GatewayError::InvalidRequest(_)
            | GatewayError::Json(_)
            | GatewayError::UnsupportedProvider(_) => 400,
            GatewayError::Timeout(_) => 504,
            GatewayError::ProviderFailure(_) | GatewayError::Cancelled => 502,
            GatewayError::Configuration(_) | GatewayError::Internal(_) => 500,
        }
    }

    /// User-visible error body.
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.to_string(),
            kind: self.kind(),
        }
    }
}

/// Serializable error body returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub kind: ErrorKind,
}

/// Result type alias for Switchyard operations
pub type Result<T> = std::result::Result<T, GatewayError>;
