//! Deployment constants for the Taskhire client
//!
//! These values are compiled into the binary so that the SDK works out of the
//! box against a local development API.

/// Base URL of the Taskhire REST API used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1";

/// Storage key under which the bearer token is persisted
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Application name used for platform data/config directories and the keyring service
pub const APP_NAME: &str = "taskhire";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "TASKHIRE_";

/// Route prefix the UI uses for its login entry point
pub const LOGIN_ROUTE: &str = "/login";

/// Cache keys that are never blanket-refetched after a session refresh
pub const REFRESH_EXEMPT_KEYS: [&str; 4] = ["auth", "interests", "cities", "posts-feed"];

/// Cache key that is always invalidated after a session refresh
pub const FORCE_INVALIDATE_KEY: &str = "posts-feed";
