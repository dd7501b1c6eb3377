//! Authenticated HTTP transport
//!
//! [`ApiTransport::request`] resolves a path against the base URL, attaches the
//! bearer token of its session, and hands back the raw status and body. It never
//! retries and never turns a non-2xx status into an error; interpreting the
//! response is the caller's job.

use crate::auth::SessionContext;
use crate::error::{ApiError, Result};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Request body variants
pub enum RequestBody {
    /// Pre-serialized text, sent as `application/json` unless a content type is set
    Text(String),
    /// Multipart form; reqwest supplies the boundary content type
    Multipart(reqwest::multipart::Form),
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            Self::Multipart(_) => f.write_str("Multipart"),
        }
    }
}

/// Method, headers and body of a request
#[derive(Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Request with a JSON-serialized body
    pub fn json<B: Serialize>(method: Method, body: &B) -> Result<Self> {
        let text = serde_json::to_string(body).map_err(|e| ApiError::InvalidRequest {
            message: format!("Failed to serialize request body: {e}"),
        })?;
        Ok(Self::new(method).body(RequestBody::Text(text)))
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Status and body of a response, uninterpreted
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    body: Bytes,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// HTTP transport bound to one session and one API base URL
#[derive(Debug)]
pub struct ApiTransport {
    http_client: reqwest::Client,
    base_url: String,
    session: Arc<SessionContext>,
}

impl ApiTransport {
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        session: Arc<SessionContext>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Join `path` onto the base URL, inserting a slash when `path` has none
    pub fn resolve_url(&self, path: &str) -> String {
        let separator = if path.starts_with('/') { "" } else { "/" };
        format!("{}{}{}", self.base_url, separator, path)
    }

    /// Issue a request and return the raw response.
    ///
    /// Only transport failures are errors; every HTTP status is returned as-is.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<RawResponse> {
        let RequestOptions {
            method,
            mut headers,
            body,
        } = options;

        if let Some(token) = self.session.tokens().get_token().await {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                ApiError::InvalidRequest {
                    message: format!("Stored token is not a valid header value: {e}"),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        if matches!(body, Some(RequestBody::Text(_))) && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let url = self.resolve_url(path);
        debug!(method = %method, url = %url, "Sending API request");

        let mut request = self.http_client.request(method, &url).headers(headers);
        request = match body {
            Some(RequestBody::Text(text)) => request.body(text),
            Some(RequestBody::Multipart(form)) => request.multipart(form),
            None => request,
        };

        let response = request.send().await.map_err(ApiError::HttpClient)?;
        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::HttpClient)?;

        debug!(status = status.as_u16(), url = %url, "Received API response");
        Ok(RawResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryStorage, TokenStore};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport(base_url: &str, token: Option<&str>) -> ApiTransport {
        let storage = match token {
            Some(token) => MemoryStorage::with_token(token),
            None => MemoryStorage::new(),
        };
        let session = Arc::new(SessionContext::new(TokenStore::new(Arc::new(storage))));
        ApiTransport::new(reqwest::Client::new(), base_url, session)
    }

    #[test]
    fn test_resolve_url() {
        let transport = transport("http://localhost:3000/api/v1/", None);
        assert_eq!(
            transport.resolve_url("/tasks"),
            "http://localhost:3000/api/v1/tasks"
        );
        assert_eq!(
            transport.resolve_url("tasks/7"),
            "http://localhost:3000/api/v1/tasks/7"
        );
    }

    #[tokio::test]
    async fn test_attaches_bearer_and_json_content_type() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tasks"))
            .and(header("Authorization", "Bearer test-token"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"title": "T"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "42"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = transport(&mock_server.uri(), Some("test-token"));
        let options = RequestOptions::json(Method::POST, &json!({"title": "T"})).unwrap();
        let response = transport.request("/tasks", options).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.json::<serde_json::Value>().unwrap(), json!({"id": "42"}));
    }

    #[tokio::test]
    async fn test_no_token_no_body_sends_bare_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let transport = transport(&mock_server.uri(), None);
        transport.request("tasks", RequestOptions::get()).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
        assert!(requests[0].headers.get("content-type").is_none());
    }

    #[tokio::test]
    async fn test_explicit_content_type_is_kept() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tg/login"))
            .and(header("Content-Type", "text/plain"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = transport(&mock_server.uri(), None);
        let options = RequestOptions::new(Method::POST)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .body(RequestBody::Text("raw".into()));
        transport.request("/tg/login", options).await.unwrap();
    }

    #[tokio::test]
    async fn test_multipart_body_does_not_get_json_content_type() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/uploads"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let transport = transport(&mock_server.uri(), Some("test-token"));
        let form = reqwest::multipart::Form::new().text("field", "value");
        let options = RequestOptions::new(Method::POST).body(RequestBody::Multipart(form));
        transport.request("/uploads", options).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let content_type = requests[0]
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "expired"})))
            .mount(&mock_server)
            .await;

        let transport = transport(&mock_server.uri(), Some("stale"));
        let response = transport.request("/profile", RequestOptions::get()).await.unwrap();

        assert!(response.is_unauthorized());
        assert!(!response.is_success());
        assert!(response.text().contains("expired"));
    }
}
