//! # Taskhire SDK
//!
//! Client for the Taskhire hiring test-task API.
//!
//! The SDK authenticates with a bearer token obtained by exchanging Telegram
//! Mini App launch data at `/tg/login`. When the API answers 401, the
//! [`SessionRefresher`] re-authenticates (at most one refresh in flight per
//! session) and asks the host's [`QueryCache`] to refetch dependent data.
//!
//! ```rust,no_run
//! use taskhire_sdk::{ClientBuilder, StaticLaunchContext};
//! use std::sync::Arc;
//!
//! # async fn example() -> taskhire_sdk::Result<()> {
//! let client = ClientBuilder::default()
//!     .base_url("https://api.taskhire.app/api/v1")
//!     .with_file_storage()?
//!     .with_launch_context(Arc::new(StaticLaunchContext::from_init_data("query_id=...")))
//!     .build()?;
//!
//! let tasks = client.list_tasks().await?;
//! println!("{} tasks", tasks.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cache;
pub mod client;
pub mod error;
pub mod http;
pub mod navigation;
pub mod retry;
pub mod types;

pub use auth::{
    LaunchContext, RefreshOutcome, SessionContext, SessionRefresher, StaticLaunchContext,
    TokenStorage, TokenStore,
};
pub use cache::{InvalidationPolicy, MemoryQueryCache, NoopQueryCache, QueryCache, QueryKey};
pub use client::{ClientBuilder, TaskhireClient, DEFAULT_TIMEOUT_SECS};
pub use error::{ApiError, Result};
pub use http::{ApiTransport, RawResponse, RequestBody, RequestOptions};
pub use navigation::{MemoryNavigator, Navigator};
pub use retry::{ProfileRetryPolicy, RetryConfig};
pub use taskhire_common::constants::DEFAULT_API_URL;
pub use types::*;
