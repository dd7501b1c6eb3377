//! Retry policy for profile reads
//!
//! Profile reads are retried with exponential backoff, except that a session
//! which stays unauthorized is sent to the login route instead of looping.

use crate::error::ApiError;
use crate::navigation::{is_login_route, login_redirect, Navigator};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Bounds and backoff for retried reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first failure
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each following one
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// No backoff at all
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `failure_count` (zero-based)
    pub fn delay_for(&self, failure_count: u32) -> Duration {
        let factor = 2u32.saturating_pow(failure_count);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Retry decision for `GET /profile`
#[derive(Debug, Clone, Copy)]
pub struct ProfileRetryPolicy {
    pub silent: bool,
}

impl ProfileRetryPolicy {
    pub fn new(silent: bool) -> Self {
        Self { silent }
    }

    /// Whether to retry after a failure.
    ///
    /// `failure_count` is the number of failures before this one. A second
    /// consecutive `Unauthorized` pushes `/login?next=<current path>` onto
    /// `navigator` and stops.
    pub fn should_retry(
        &self,
        failure_count: u32,
        error: &ApiError,
        navigator: &dyn Navigator,
    ) -> bool {
        if self.silent {
            return false;
        }

        let current = navigator.current_path();
        if is_login_route(&current) {
            return false;
        }

        if failure_count >= 1 && error.is_unauthorized() {
            let target = login_redirect(&current);
            info!(target = %target, "Session still unauthorized, redirecting to login");
            navigator.push_state(&target);
            return false;
        }

        true
    }
}
