//! Query cache integration
//!
//! The cache of prior reads belongs to the host application. The SDK only
//! needs two operations on it after a session refresh: refetch whatever matches
//! a predicate, and invalidate one resource. [`MemoryQueryCache`] is a small
//! implementation for hosts without a cache of their own.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use taskhire_common::constants::{FORCE_INVALIDATE_KEY, REFRESH_EXEMPT_KEYS};
use tracing::debug;

/// Key of a cached query: the logical resource name plus its arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    resource: String,
    args: Vec<String>,
}

impl QueryKey {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource)?;
        for arg in &self.args {
            write!(f, "/{arg}")?;
        }
        Ok(())
    }
}

/// Host-owned cache of query results
pub trait QueryCache: Send + Sync {
    /// Refetch every cached query for which `predicate` holds
    fn refetch_matching(&self, predicate: &dyn Fn(&QueryKey) -> bool);

    /// Mark every query of `resource` stale
    fn invalidate(&self, resource: &str);
}

/// Cache that holds nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopQueryCache;

impl QueryCache for NoopQueryCache {
    fn refetch_matching(&self, _predicate: &dyn Fn(&QueryKey) -> bool) {}

    fn invalidate(&self, _resource: &str) {}
}

/// Which cached resources a successful refresh touches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationPolicy {
    /// Resources skipped by the blanket refetch
    pub exempt: Vec<String>,
    /// Resource invalidated unconditionally
    pub force_invalidate: Option<String>,
}

impl Default for InvalidationPolicy {
    fn default() -> Self {
        Self {
            exempt: REFRESH_EXEMPT_KEYS.iter().map(|k| k.to_string()).collect(),
            force_invalidate: Some(FORCE_INVALIDATE_KEY.to_string()),
        }
    }
}

impl InvalidationPolicy {
    pub fn is_exempt(&self, key: &QueryKey) -> bool {
        self.exempt.iter().any(|e| e == key.resource())
    }

    /// Refetch all non-exempt queries, then invalidate the forced resource
    pub fn apply(&self, cache: &dyn QueryCache) {
        cache.refetch_matching(&|key: &QueryKey| !self.is_exempt(key));
        if let Some(resource) = &self.force_invalidate {
            cache.invalidate(resource);
        }
    }
}

/// Freshness of a cached entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Fresh,
    /// Marked out of date; served until the host reloads it
    Stale,
    /// The host has been asked to reload it
    RefetchPending,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: serde_json::Value,
    pub state: EntryState,
    pub updated_at: DateTime<Utc>,
}

/// In-process query cache
#[derive(Debug, Default)]
pub struct MemoryQueryCache {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
}

impl MemoryQueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T: Serialize>(&self, key: QueryKey, value: &T) -> serde_json::Result<()> {
        let value = serde_json::to_value(value)?;
        self.entries.write().insert(
            key,
            CacheEntry {
                value,
                state: EntryState::Fresh,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    pub fn get(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.entries.read().get(key).cloned()
    }

    pub fn state(&self, key: &QueryKey) -> Option<EntryState> {
        self.entries.read().get(key).map(|e| e.state)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Keys awaiting a reload, in key order
    pub fn pending_refetch(&self) -> Vec<QueryKey> {
        let mut keys: Vec<QueryKey> = self
            .entries
            .read()
            .iter()
            .filter(|(_, e)| e.state == EntryState::RefetchPending)
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

impl QueryCache for MemoryQueryCache {
    fn refetch_matching(&self, predicate: &dyn Fn(&QueryKey) -> bool) {
        let mut entries = self.entries.write();
        for (key, entry) in entries.iter_mut().filter(|(k, _)| predicate(k)) {
            debug!(key = %key, "Scheduling refetch");
            entry.state = EntryState::RefetchPending;
        }
    }

    fn invalidate(&self, resource: &str) {
        let mut entries = self.entries.write();
        for (key, entry) in entries
            .iter_mut()
            .filter(|(k, _)| k.resource() == resource)
        {
            debug!(key = %key, "Invalidating query");
            if entry.state == EntryState::Fresh {
                entry.state = EntryState::Stale;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded_cache() -> MemoryQueryCache {
        let cache = MemoryQueryCache::new();
        for resource in ["auth", "interests", "cities", "posts-feed", "profile", "tasks"] {
            cache.put(QueryKey::new(resource), &json!([])).unwrap();
        }
        cache.put(QueryKey::new("project").arg("p1"), &json!({})).unwrap();
        cache
    }

    #[test]
    fn test_query_key_display() {
        assert_eq!(QueryKey::new("project").arg("p1").to_string(), "project/p1");
        assert_eq!(QueryKey::new("tasks").to_string(), "tasks");
    }

    #[test]
    fn test_default_policy_skips_exempt_keys() {
        let cache = seeded_cache();
        InvalidationPolicy::default().apply(&cache);

        assert_eq!(
            cache.pending_refetch(),
            vec![
                QueryKey::new("profile"),
                QueryKey::new("project").arg("p1"),
                QueryKey::new("tasks"),
            ]
        );
        for resource in ["auth", "interests", "cities"] {
            assert_eq!(cache.state(&QueryKey::new(resource)), Some(EntryState::Fresh));
        }
        // Exempt from the blanket pass, but explicitly invalidated
        assert_eq!(
            cache.state(&QueryKey::new("posts-feed")),
            Some(EntryState::Stale)
        );
    }

    #[test]
    fn test_custom_policy() {
        let cache = seeded_cache();
        let policy = InvalidationPolicy {
            exempt: vec!["profile".into(), "tasks".into()],
            force_invalidate: Some("tasks".into()),
        };
        policy.apply(&cache);

        assert_eq!(cache.state(&QueryKey::new("profile")), Some(EntryState::Fresh));
        assert_eq!(cache.state(&QueryKey::new("tasks")), Some(EntryState::Stale));
        assert_eq!(
            cache.state(&QueryKey::new("auth")),
            Some(EntryState::RefetchPending)
        );
    }

    #[test]
    fn test_invalidate_keeps_pending_refetch() {
        let cache = seeded_cache();
        cache.refetch_matching(&|key: &QueryKey| key.resource() == "tasks");
        cache.invalidate("tasks");
        assert_eq!(
            cache.state(&QueryKey::new("tasks")),
            Some(EntryState::RefetchPending)
        );
    }
}
