//! Authentication for the Taskhire SDK
//!
//! - Persistent bearer-token storage ([`TokenStore`] over a [`TokenStorage`] backend)
//! - Per-session state shared by transport and refresher ([`SessionContext`])
//! - Telegram Mini App launch data extraction ([`LaunchContext`])
//! - Single-flight session refresh ([`SessionRefresher`])

pub mod launch;
pub mod refresh;
pub mod session;
pub mod token_store;
pub mod types;

pub use launch::{LaunchContext, LaunchPayload, LaunchStrategy, StaticLaunchContext};
pub use refresh::SessionRefresher;
pub use session::SessionContext;
pub use token_store::{FileStorage, KeyringStorage, MemoryStorage, TokenStorage, TokenStore};
pub use types::{AuthError, AuthResult, LoginRequest, LoginResponse, RefreshOutcome};
