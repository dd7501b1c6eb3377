//! Error types for the Taskhire SDK

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by resource operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the bearer token (HTTP 401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Any other non-2xx response
    #[error("{message}")]
    OperationFailed { message: String },

    /// Transport failure while talking to the API
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The request could not be built
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// A 2xx response whose body did not match the expected schema
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ApiError {
    /// Build an `OperationFailed` error from a default message and an optional server override
    pub fn operation_failed(default_message: &str, server_message: Option<String>) -> Self {
        Self::OperationFailed {
            message: server_message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| default_message.to_string()),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Check if the error is worth retrying without user intervention
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpClient(e) => e.is_timeout() || e.is_connect(),
            Self::OperationFailed { .. } => true,
            Self::Unauthorized
            | Self::InvalidRequest { .. }
            | Self::InvalidResponse { .. }
            | Self::Internal { .. } => false,
        }
    }

    /// Stable error code for logs and machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "TASKHIRE_UNAUTHORIZED",
            Self::OperationFailed { .. } => "TASKHIRE_OPERATION_FAILED",
            Self::HttpClient(_) => "TASKHIRE_HTTP_CLIENT",
            Self::InvalidRequest { .. } => "TASKHIRE_INVALID_REQUEST",
            Self::InvalidResponse { .. } => "TASKHIRE_INVALID_RESPONSE",
            Self::Internal { .. } => "TASKHIRE_INTERNAL",
        }
    }
}

/// Error body returned by the API on failures
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Parse an error body, yielding an empty response when it is not JSON
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}
