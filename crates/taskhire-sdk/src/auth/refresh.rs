//! Session refresh
//!
//! The refresher is a two-state machine (idle / refreshing) guarded by the
//! session's in-flight flag. A refresh checks `GET /profile`; only when the
//! check answers 401 does it extract a launch payload and exchange it at
//! `POST /tg/login`. Errors never escape `refresh()`: they are logged and
//! reported as [`RefreshOutcome::Failed`].

use super::launch::{obtain_launch_payload, LaunchContext};
use super::types::{AuthError, AuthResult, LoginRequest, LoginResponse, RefreshOutcome};
use crate::cache::{InvalidationPolicy, QueryCache};
use crate::http::{ApiTransport, RequestOptions};
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, info, warn};

const CHECK_PATH: &str = "/profile";
const LOGIN_PATH: &str = "/tg/login";

/// Re-authenticates a session from Telegram launch data
pub struct SessionRefresher {
    transport: Arc<ApiTransport>,
    launch: Arc<dyn LaunchContext>,
    cache: Arc<dyn QueryCache>,
    policy: InvalidationPolicy,
}

impl SessionRefresher {
    pub fn new(
        transport: Arc<ApiTransport>,
        launch: Arc<dyn LaunchContext>,
        cache: Arc<dyn QueryCache>,
        policy: InvalidationPolicy,
    ) -> Self {
        Self {
            transport,
            launch,
            cache,
            policy,
        }
    }

    pub fn policy(&self) -> &InvalidationPolicy {
        &self.policy
    }

    /// Refresh the session if the server no longer accepts its token.
    ///
    /// Returns immediately with [`RefreshOutcome::InFlight`] when another
    /// refresh of the same session is running. On success the query cache is
    /// refetched/invalidated per the [`InvalidationPolicy`].
    ///
    /// A login response without an `accessToken` is a [`RefreshOutcome::Failed`]:
    /// the stored token is kept and the cache is not touched, even though the
    /// exchange request itself succeeded.
    pub async fn refresh(&self) -> RefreshOutcome {
        let session = self.transport.session();
        let Some(guard) = session.try_begin_refresh() else {
            debug!("Session refresh already in flight, skipping");
            return RefreshOutcome::InFlight;
        };

        let outcome = match self.run().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Session refresh failed: {}", e);
                RefreshOutcome::Failed
            }
        };
        drop(guard);

        if outcome.is_success() {
            self.policy.apply(self.cache.as_ref());
        }

        info!(?outcome, attempts = session.refresh_attempts(), "Session refresh finished");
        outcome
    }

    async fn run(&self) -> AuthResult<RefreshOutcome> {
        let check = self
            .transport
            .request(CHECK_PATH, RequestOptions::get())
            .await
            .map_err(|e| AuthError::NetworkError(format!("Session check failed: {e}")))?;

        if !check.is_unauthorized() {
            debug!(status = check.status().as_u16(), "Stored token still accepted");
            return Ok(RefreshOutcome::AlreadyValid);
        }

        info!("Token rejected, re-authenticating with launch data");
        let payload =
            obtain_launch_payload(self.launch.as_ref(), self.transport.session()).await?;

        let token = self.exchange(payload.into_inner()).await?;
        self.transport.session().tokens().set_token(&token).await;
        Ok(RefreshOutcome::Refreshed)
    }

    /// Exchange launch data for a bearer token at `/tg/login`
    async fn exchange(&self, init_data: String) -> AuthResult<String> {
        let options = RequestOptions::json(Method::POST, &LoginRequest { init_data })
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        let response = self
            .transport
            .request(LOGIN_PATH, options)
            .await
            .map_err(|e| AuthError::NetworkError(format!("Login request failed: {e}")))?;

        let status = response.status().as_u16();
        let body: LoginResponse = response.json().map_err(|e| {
            AuthError::InvalidResponse(format!("Failed to parse login response: {e}"))
        })?;

        body.access_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::LoginRejected { status })
    }
}
