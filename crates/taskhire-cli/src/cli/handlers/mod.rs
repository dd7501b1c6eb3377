//! Command handlers for the Taskhire CLI

pub mod assist;
pub mod auth;
pub mod config;
pub mod projects;
pub mod tasks;

use crate::config::CliConfig;
use crate::error::Result;
use std::sync::Arc;
use taskhire_sdk::navigation::is_login_route;
use taskhire_sdk::{MemoryNavigator, MemoryQueryCache, Navigator, QueryKey, TaskhireClient};
use tracing::debug;

/// Connected client plus the state the SDK reports back into
pub struct CliContext {
    pub client: TaskhireClient,
    /// Receives the login redirect when a session cannot be recovered
    pub navigator: Arc<MemoryNavigator>,
    pub cache: Arc<MemoryQueryCache>,
}

impl CliContext {
    /// Build a client from `config`, with `route` as the current location
    pub fn connect(config: &CliConfig, route: &str) -> Result<Self> {
        let navigator = Arc::new(MemoryNavigator::new(route));
        let cache = Arc::new(MemoryQueryCache::new());
        let client = config
            .client_builder()?
            .with_navigator(navigator.clone())
            .with_query_cache(cache.clone())
            .build()?;

        Ok(Self {
            client,
            navigator,
            cache,
        })
    }
}

impl CliContext {
    /// Record a fetched result so a refresh later in this run can mark it
    pub fn remember<T: serde::Serialize>(&self, key: QueryKey, value: &T) {
        if let Err(e) = self.cache.put(key, value) {
            debug!("Not caching query result: {}", e);
        }
    }

    /// Whether the SDK gave up and sent the user to the login route
    pub fn redirected_to_login(&self) -> bool {
        is_login_route(&self.navigator.current_path())
    }
}
