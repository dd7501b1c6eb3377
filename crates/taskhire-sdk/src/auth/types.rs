//! Authentication-related types
//!
//! Wire types for the `/tg/login` exchange, the refresh outcome reported to
//! callers, and the error type used inside the auth module.

use etcetera::{choose_base_strategy, BaseStrategy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use taskhire_common::constants::APP_NAME;

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Body of `POST /tg/login`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub init_data: String,
}

/// Response of `POST /tg/login`; the token is absent when the server refuses the payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// What a call to [`SessionRefresher::refresh`](super::SessionRefresher::refresh) achieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The session check succeeded, the stored token is still accepted
    AlreadyValid,
    /// A new token was obtained and stored
    Refreshed,
    /// Re-authentication was needed but did not produce a token
    Failed,
    /// Another refresh was already running; nothing was done
    InFlight,
}

impl RefreshOutcome {
    /// Whether the session is known to be usable afterwards
    pub fn is_success(self) -> bool {
        matches!(self, Self::AlreadyValid | Self::Refreshed)
    }
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No launch payload could be extracted from the host
    #[error("Launch data unavailable: {0}")]
    LaunchDataUnavailable(String),

    /// `/tg/login` answered without an access token
    #[error("Login rejected with status {status}")]
    LoginRejected { status: u16 },

    /// Network error while probing or exchanging
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response body did not match the expected schema
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Token storage backend failure
    #[error("Token storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Platform data directory for Taskhire state (e.g. `~/.local/share/taskhire` on Linux)
pub fn get_sdk_data_dir() -> AuthResult<PathBuf> {
    let strategy = choose_base_strategy().map_err(|e| {
        AuthError::ConfigError(format!("Failed to determine base directories: {}", e))
    })?;

    Ok(strategy.data_dir().join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_request_uses_camel_case() {
        let body = serde_json::to_value(LoginRequest {
            init_data: "query_id=1&hash=abc".into(),
        })
        .unwrap();
        assert_eq!(body, json!({"initData": "query_id=1&hash=abc"}));
    }

    #[test]
    fn test_login_response_without_token() {
        let response: LoginResponse = serde_json::from_value(json!({"error": "bad hash"})).unwrap();
        assert!(response.access_token.is_none());

        let response: LoginResponse =
            serde_json::from_value(json!({"accessToken": "jwt"})).unwrap();
        assert_eq!(response.access_token.as_deref(), Some("jwt"));
    }

    #[test]
    fn test_refresh_outcome_success() {
        assert!(RefreshOutcome::AlreadyValid.is_success());
        assert!(RefreshOutcome::Refreshed.is_success());
        assert!(!RefreshOutcome::Failed.is_success());
        assert!(!RefreshOutcome::InFlight.is_success());
    }
}
