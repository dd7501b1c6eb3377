//! Error types for the Taskhire CLI

use color_eyre::eyre::Report;
use thiserror::Error;

/// CLI error type with minimal variants
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file issues
    #[error("Configuration error: {0}")]
    Config(#[from] taskhire_common::ConfigurationError),

    /// API communication errors
    #[error("API error: {0}")]
    Api(#[from] taskhire_sdk::ApiError),

    /// Launch data or token storage issues
    #[error(transparent)]
    Auth(#[from] taskhire_sdk::auth::AuthError),

    #[error("Login failed: {0}")]
    Login(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Everything else (using color-eyre's Report for rich errors)
    #[error(transparent)]
    Internal(#[from] Report),
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
