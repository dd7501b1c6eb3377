//! Per-session authentication state
//!
//! A [`SessionContext`] owns the token store, the in-flight refresh flag and
//! the refresh attempt counter. The transport and the refresher share one
//! context through an `Arc`, so independent sessions never interfere.

use super::token_store::TokenStore;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug)]
pub struct SessionContext {
    tokens: TokenStore,
    refreshing: AtomicBool,
    refresh_attempts: AtomicU64,
}

impl SessionContext {
    pub fn new(tokens: TokenStore) -> Self {
        Self {
            tokens,
            refreshing: AtomicBool::new(false),
            refresh_attempts: AtomicU64::new(0),
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Number of launch-payload extractions performed so far. Never decreases.
    pub fn refresh_attempts(&self) -> u64 {
        self.refresh_attempts.load(Ordering::Acquire)
    }

    /// Claim the in-flight flag. `None` if a refresh is already running.
    pub(crate) fn try_begin_refresh(&self) -> Option<RefreshGuard<'_>> {
        self.refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshGuard { session: self })
    }

    /// Record an extraction attempt, returning the count before it
    pub(crate) fn next_attempt(&self) -> u64 {
        self.refresh_attempts.fetch_add(1, Ordering::AcqRel)
    }
}

/// Clears the in-flight flag when dropped, whatever way the refresh ended
#[derive(Debug)]
pub(crate) struct RefreshGuard<'a> {
    session: &'a SessionContext,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.session.refreshing.store(false, Ordering::Release);
    }
}
