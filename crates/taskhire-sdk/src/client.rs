//! HTTP client for the Taskhire API
//!
//! Typed operations over [`ApiTransport`]. Every operation maps a 401 to
//! [`ApiError::Unauthorized`]; profile operations additionally start a session
//! refresh so that a retry can succeed.
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use taskhire_sdk::{ClientBuilder, CreateTaskDto};
//!
//! # async fn example() -> taskhire_sdk::Result<()> {
//! let client = ClientBuilder::default()
//!     .base_url("http://localhost:3000/api/v1")
//!     .with_bearer_token("access_token")
//!     .build()?;
//!
//! let created = client
//!     .create_task(&CreateTaskDto {
//!         title: "Build a landing page".into(),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("created task {}", created.id);
//! # Ok(())
//! # }
//! ```

use crate::{
    auth::{
        FileStorage, KeyringStorage, LaunchContext, MemoryStorage, RefreshOutcome,
        SessionContext, SessionRefresher, StaticLaunchContext, TokenStorage, TokenStore,
    },
    cache::{InvalidationPolicy, NoopQueryCache, QueryCache},
    error::{ApiError, ErrorResponse, Result},
    http::{ApiTransport, RawResponse, RequestOptions},
    navigation::{MemoryNavigator, Navigator},
    retry::{ProfileRetryPolicy, RetryConfig},
    types::{
        AjtbdResponse, CreateProjectDto, CreateTaskDto, ImproveDescriptionDto,
        ImproveDescriptionResponse, Project, RefineQuizDto, ResourceId, Task, UpdateProfileDto,
        UpdateProjectDto, UpdateTaskDto, User,
    },
};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use taskhire_common::constants::DEFAULT_API_URL;
use tracing::{debug, warn};

/// Default timeout in seconds for API requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Cache key of the authenticated profile
const PROFILE_QUERY: &str = "profile";

/// Client for the Taskhire API
pub struct TaskhireClient {
    transport: Arc<ApiTransport>,
    refresher: Arc<SessionRefresher>,
    cache: Arc<dyn QueryCache>,
    navigator: Arc<dyn Navigator>,
    retry: RetryConfig,
}

impl TaskhireClient {
    pub fn transport(&self) -> &ApiTransport {
        &self.transport
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        self.transport.session()
    }

    pub fn refresher(&self) -> &Arc<SessionRefresher> {
        &self.refresher
    }

    /// Re-authenticate if the stored token is no longer accepted
    pub async fn refresh(&self) -> RefreshOutcome {
        self.refresher.refresh().await
    }

    /// Forget the stored token
    pub async fn logout(&self) {
        self.session().tokens().clear_token().await;
    }

    // ===== Profile =====

    /// Get the authenticated user's profile.
    ///
    /// A 401 starts a session refresh (awaited) unless `silent` is set; the
    /// call still fails with `Unauthorized` so the caller can retry.
    pub async fn get_profile(&self, silent: bool) -> Result<User> {
        let response = self.send("/profile", RequestOptions::get()).await?;

        if response.is_unauthorized() {
            if !silent {
                self.refresher.refresh().await;
            }
            return Err(ApiError::Unauthorized);
        }
        Self::parse(response, "Failed to load profile")
    }

    /// Get the profile, retrying per [`ProfileRetryPolicy`].
    ///
    /// A second consecutive `Unauthorized` pushes the login route onto the
    /// navigator and gives up. The policy is consulted before the retry
    /// bound, so the redirect happens whatever `max_retries` is.
    pub async fn get_profile_with_retry(&self, silent: bool) -> Result<User> {
        let policy = ProfileRetryPolicy::new(silent);
        let mut failure_count = 0;

        loop {
            let error = match self.get_profile(silent).await {
                Ok(user) => return Ok(user),
                Err(e) => e,
            };

            if !policy.should_retry(failure_count, &error, self.navigator.as_ref())
                || failure_count >= self.retry.max_retries
            {
                return Err(error);
            }

            let delay = self.retry.delay_for(failure_count);
            debug!(failure_count, ?delay, "Retrying profile read: {}", error);
            tokio::time::sleep(delay).await;
            failure_count += 1;
        }
    }

    /// Update the authenticated user's profile.
    ///
    /// A 401 starts a session refresh in the background and fails immediately.
    /// The background refresh needs a tokio runtime; without one it is
    /// skipped and logged.
    pub async fn update_profile(&self, dto: &UpdateProfileDto) -> Result<User> {
        let response = self
            .send("/profile", RequestOptions::json(Method::PATCH, dto)?)
            .await?;

        if response.is_unauthorized() {
            self.spawn_refresh();
            return Err(ApiError::Unauthorized);
        }

        let user = Self::parse(response, "Failed to update profile").inspect_err(|e| {
            warn!("Profile update error: {}", e);
        })?;
        self.cache.invalidate(PROFILE_QUERY);
        Ok(user)
    }

    /// Get another user's public profile. Never triggers a refresh.
    pub async fn get_user_profile(&self, user_id: &str) -> Result<User> {
        let path = resource_path("/profile", user_id);
        let response = self.send(&path, RequestOptions::get()).await?;

        if response.is_unauthorized() {
            return Err(ApiError::Unauthorized);
        }
        if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
            return Err(ApiError::operation_failed("Server error", None));
        }
        if !response.is_success() {
            return Err(ApiError::operation_failed(
                "Failed to load user profile",
                None,
            ));
        }
        Self::decode(&response)
    }

    // ===== Tasks =====

    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.get("/tasks", "Failed to load tasks").await
    }

    pub async fn create_task(&self, dto: &CreateTaskDto) -> Result<ResourceId> {
        self.write(Method::POST, "/tasks", dto, "Failed to create task")
            .await
    }

    pub async fn update_task(&self, task_id: &str, dto: &UpdateTaskDto) -> Result<ResourceId> {
        let path = resource_path("/tasks", task_id);
        self.write(Method::PATCH, &path, dto, "Failed to update task")
            .await
    }

    // ===== AI assists =====

    /// Rewrite a task description
    pub async fn improve_description(&self, text: &str) -> Result<ImproveDescriptionResponse> {
        let dto = ImproveDescriptionDto {
            text: text.to_string(),
        };
        self.write(
            Method::POST,
            "/tasks/improve-description",
            &dto,
            "Failed to improve description",
        )
        .await
    }

    /// Suggest variations and follow-ups for AJTBD quiz answers
    pub async fn refine_quiz(&self, dto: &RefineQuizDto) -> Result<AjtbdResponse> {
        self.write(
            Method::POST,
            "/tasks/refine-ajtbd-quiz",
            dto,
            "Failed to refine quiz",
        )
        .await
    }

    // ===== Projects =====

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get("/projects", "Failed to load projects").await
    }

    /// Get a project with its client, tasks and candidates
    pub async fn get_project(&self, project_id: &str) -> Result<Project> {
        let path = resource_path("/projects", project_id);
        self.get(&path, "Failed to load project").await
    }

    pub async fn create_project(&self, dto: &CreateProjectDto) -> Result<ResourceId> {
        self.write(Method::POST, "/projects", dto, "Failed to create project")
            .await
    }

    pub async fn update_project(
        &self,
        project_id: &str,
        dto: &UpdateProjectDto,
    ) -> Result<ResourceId> {
        let path = resource_path("/projects", project_id);
        self.write(Method::PATCH, &path, dto, "Failed to update project")
            .await
    }

    // ===== Private Helper Methods =====

    async fn send(&self, path: &str, options: RequestOptions) -> Result<RawResponse> {
        self.transport.request(path, options).await
    }

    /// Run a refresh without waiting for it. Returns whether it was started.
    fn spawn_refresh(&self) -> bool {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No tokio runtime available, skipping background session refresh");
            return false;
        };
        let refresher = Arc::clone(&self.refresher);
        handle.spawn(async move {
            refresher.refresh().await;
        });
        true
    }

    /// Generic GET request
    async fn get<T: DeserializeOwned>(&self, path: &str, failure: &str) -> Result<T> {
        let response = self.send(path, RequestOptions::get()).await?;
        Self::parse(response, failure)
    }

    /// Generic request with a JSON body
    async fn write<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        failure: &str,
    ) -> Result<T> {
        let response = self
            .send(path, RequestOptions::json(method, body)?)
            .await?;
        Self::parse(response, failure)
    }

    /// Map the response status, then decode the body
    fn parse<T: DeserializeOwned>(response: RawResponse, failure: &str) -> Result<T> {
        if response.is_unauthorized() {
            return Err(ApiError::Unauthorized);
        }
        if !response.is_success() {
            let error = ErrorResponse::parse(response.body());
            debug!(
                status = response.status().as_u16(),
                "{}: {:?}", failure, error.message
            );
            return Err(ApiError::operation_failed(failure, error.message));
        }
        Self::decode(&response)
    }

    fn decode<T: DeserializeOwned>(response: &RawResponse) -> Result<T> {
        response.json().map_err(|e| ApiError::InvalidResponse {
            message: format!("Failed to parse response body: {e}"),
        })
    }
}

/// `prefix/<id>` with `id` percent-encoded as a single path segment
fn resource_path(prefix: &str, id: &str) -> String {
    format!("{prefix}/{}", urlencoding::encode(id))
}

/// Builder for constructing a [`TaskhireClient`]
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_max_idle_per_host: Option<usize>,
    session: Option<Arc<SessionContext>>,
    token_storage: Option<Arc<dyn TokenStorage>>,
    launch: Option<Arc<dyn LaunchContext>>,
    cache: Option<Arc<dyn QueryCache>>,
    navigator: Option<Arc<dyn Navigator>>,
    invalidation: Option<InvalidationPolicy>,
    retry: Option<RetryConfig>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL for the API
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = Some(max);
        self
    }

    /// Keep the token in memory, starting from `token`
    pub fn with_bearer_token(self, token: impl Into<String>) -> Self {
        self.with_token_storage(Arc::new(MemoryStorage::with_token(token)))
    }

    pub fn with_token_storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.token_storage = Some(storage);
        self
    }

    /// Persist the token in the platform data directory
    pub fn with_file_storage(self) -> Result<Self> {
        let storage = FileStorage::default_location().map_err(|e| ApiError::Internal {
            message: format!("Failed to locate token storage: {e}"),
        })?;
        Ok(self.with_token_storage(Arc::new(storage)))
    }

    /// Persist the token in the OS keyring
    pub fn with_keyring_storage(self) -> Self {
        self.with_token_storage(Arc::new(KeyringStorage::default()))
    }

    /// Share an existing session (token, refresh flag, attempt counter).
    /// Takes precedence over any token storage.
    pub fn with_session(mut self, session: Arc<SessionContext>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_launch_context(mut self, launch: Arc<dyn LaunchContext>) -> Self {
        self.launch = Some(launch);
        self
    }

    pub fn with_query_cache(mut self, cache: Arc<dyn QueryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn invalidation_policy(mut self, policy: InvalidationPolicy) -> Self {
        self.invalidation = Some(policy);
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<TaskhireClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if base_url.trim().is_empty() {
            return Err(ApiError::InvalidRequest {
                message: "Base URL must not be empty".into(),
            });
        }

        let mut http = reqwest::Client::builder().timeout(
            self.timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        );
        if let Some(connect_timeout) = self.connect_timeout {
            http = http.connect_timeout(connect_timeout);
        }
        if let Some(max) = self.pool_max_idle_per_host {
            http = http.pool_max_idle_per_host(max);
        }
        let http_client = http.build().map_err(ApiError::HttpClient)?;

        let session = match (self.session, self.token_storage) {
            (Some(session), _) => session,
            (None, Some(storage)) => Arc::new(SessionContext::new(TokenStore::new(storage))),
            (None, None) => Arc::new(SessionContext::new(TokenStore::in_memory())),
        };

        let transport = Arc::new(ApiTransport::new(http_client, base_url, session));
        let cache = self.cache.unwrap_or_else(|| Arc::new(NoopQueryCache));
        let refresher = Arc::new(SessionRefresher::new(
            Arc::clone(&transport),
            self.launch
                .unwrap_or_else(|| Arc::new(StaticLaunchContext::empty())),
            Arc::clone(&cache),
            self.invalidation.unwrap_or_default(),
        ));

        Ok(TaskhireClient {
            transport,
            refresher,
            cache,
            navigator: self
                .navigator
                .unwrap_or_else(|| Arc::new(MemoryNavigator::default())),
            retry: self.retry.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_tasks() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tasks"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "t1", "title": "Landing page", "status": "draft"},
                {"id": "t2", "title": "Logo", "projectId": null}
            ])))
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::default()
            .base_url(mock_server.uri())
            .with_bearer_token("test-token")
            .build()
            .unwrap();
        let tasks = client.list_tasks().await.unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].status.as_deref(), Some("draft"));
        assert!(tasks[1].project_id.is_none());
    }

    #[tokio::test]
    async fn test_error_handling() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::default()
            .base_url(mock_server.uri())
            .with_bearer_token("test-token")
            .build()
            .unwrap();
        let result = client.list_projects().await;

        match result {
            Err(ApiError::OperationFailed { message }) => {
                assert_eq!(message, "Failed to load projects")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_builder_defaults() {
        let client = ClientBuilder::default().build().unwrap();
        assert_eq!(client.transport().base_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_builder_rejects_empty_base_url() {
        let result = ClientBuilder::default().base_url("  ").build();
        assert!(matches!(result, Err(ApiError::InvalidRequest { .. })));
    }

    #[test]
    fn test_builder_with_all_options() {
        let client = ClientBuilder::default()
            .base_url("https://api.taskhire.app/api/v1")
            .with_bearer_token("test-token")
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(8)
            .retry(RetryConfig::immediate(1))
            .invalidation_policy(InvalidationPolicy::default())
            .build();

        assert!(client.is_ok());
    }

    #[test]
    fn test_resource_path_encodes_id() {
        assert_eq!(resource_path("/tasks", "t1"), "/tasks/t1");
        assert_eq!(resource_path("/tasks", "a/b?c"), "/tasks/a%2Fb%3Fc");
        assert_eq!(resource_path("/profile", "../admin"), "/profile/..%2Fadmin");
    }

    #[test]
    fn test_background_refresh_without_runtime_is_skipped() {
        let client = ClientBuilder::default().build().unwrap();
        assert!(!client.spawn_refresh());
    }

    #[tokio::test]
    async fn test_background_refresh_starts_inside_runtime() {
        let client = ClientBuilder::default()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        assert!(client.spawn_refresh());
    }

    #[tokio::test]
    async fn test_shared_session_between_clients() {
        let session = Arc::new(SessionContext::new(TokenStore::in_memory()));
        let first = ClientBuilder::default()
            .with_session(Arc::clone(&session))
            .build()
            .unwrap();
        let second = ClientBuilder::default()
            .with_session(Arc::clone(&session))
            .build()
            .unwrap();

        first.session().tokens().set_token("shared").await;
        assert_eq!(
            second.session().tokens().get_token().await.as_deref(),
            Some("shared")
        );
    }
}
