//! Telegram Mini App launch data
//!
//! The launch payload is the signed init data Telegram hands to a Mini App.
//! It reaches the client in two ways: embedded in the launch URL fragment as
//! `#tgWebAppData=<percent-encoded>&tgWebAppVersion=...`, or through the host
//! SDK's init + raw-init-data retrieval. The session's attempt counter picks
//! the source: the first extraction reads the fragment, later ones ask the host.

use super::session::SessionContext;
use super::types::{AuthError, AuthResult};
use async_trait::async_trait;
use std::fmt;
use tracing::debug;
use url::Url;

const LAUNCH_DATA_MARKER: &str = "#tgWebAppData=";

/// Signed init data, redacted in debug output
#[derive(Clone, PartialEq, Eq)]
pub struct LaunchPayload(String);

impl LaunchPayload {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for LaunchPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LaunchPayload(<{} bytes>)", self.0.len())
    }
}

/// Where the payload for a given attempt comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStrategy {
    /// Parse the launch URL hash fragment
    UrlFragment,
    /// Initialize the host SDK and retrieve its raw init data
    HostRetrieval,
}

impl LaunchStrategy {
    /// Strategy for the attempt with the given zero-based index
    pub fn for_attempt(attempt: u64) -> Self {
        if attempt == 0 {
            Self::UrlFragment
        } else {
            Self::HostRetrieval
        }
    }
}

/// The host environment a Mini App was launched from
#[async_trait]
pub trait LaunchContext: Send + Sync {
    /// Hash fragment of the launch URL, including the leading `#`
    fn location_hash(&self) -> Option<String>;

    /// Initialize the host SDK before retrieval
    async fn init(&self) -> AuthResult<()> {
        Ok(())
    }

    /// Raw init data as kept by the host SDK
    async fn retrieve_raw_init_data(&self) -> AuthResult<String>;
}

/// Extract and percent-decode the `tgWebAppData` value from a hash fragment
pub fn parse_hash_init_data(hash: &str) -> AuthResult<LaunchPayload> {
    let (_, rest) = hash.split_once(LAUNCH_DATA_MARKER).ok_or_else(|| {
        AuthError::LaunchDataUnavailable("launch URL carries no tgWebAppData".into())
    })?;
    let encoded = rest.split('&').next().unwrap_or_default();
    if encoded.is_empty() {
        return Err(AuthError::LaunchDataUnavailable(
            "tgWebAppData is empty".into(),
        ));
    }

    let decoded = urlencoding::decode(encoded).map_err(|e| {
        AuthError::LaunchDataUnavailable(format!("tgWebAppData is not valid UTF-8: {e}"))
    })?;
    Ok(LaunchPayload::new(decoded.into_owned()))
}

/// Obtain the payload for the next attempt, advancing the session's attempt counter
pub async fn obtain_launch_payload(
    launch: &dyn LaunchContext,
    session: &SessionContext,
) -> AuthResult<LaunchPayload> {
    let attempt = session.next_attempt();
    let strategy = LaunchStrategy::for_attempt(attempt);
    debug!(attempt, ?strategy, "Obtaining launch payload");

    let payload = match strategy {
        LaunchStrategy::UrlFragment => {
            let hash = launch.location_hash().ok_or_else(|| {
                AuthError::LaunchDataUnavailable("no launch URL fragment".into())
            })?;
            parse_hash_init_data(&hash)?
        }
        LaunchStrategy::HostRetrieval => {
            launch.init().await?;
            let raw = launch.retrieve_raw_init_data().await?;
            if raw.is_empty() {
                return Err(AuthError::LaunchDataUnavailable(
                    "host returned empty init data".into(),
                ));
            }
            LaunchPayload::new(raw)
        }
    };

    debug!(attempt, len = payload.as_str().len(), "Launch payload obtained");
    Ok(payload)
}

/// Launch context with fixed values, for embedding outside a Telegram webview
#[derive(Debug, Clone, Default)]
pub struct StaticLaunchContext {
    location_hash: Option<String>,
    raw_init_data: Option<String>,
}

impl StaticLaunchContext {
    /// Context with nothing to offer; every refresh fails at extraction
    pub fn empty() -> Self {
        Self::default()
    }

    /// Context whose URL fragment and host retrieval both yield `init_data`
    pub fn from_init_data(init_data: impl Into<String>) -> Self {
        let init_data = init_data.into();
        Self {
            location_hash: Some(format!(
                "{LAUNCH_DATA_MARKER}{}",
                urlencoding::encode(&init_data)
            )),
            raw_init_data: Some(init_data),
        }
    }

    /// Context built from the full Mini App launch URL
    pub fn from_launch_url(launch_url: &str) -> AuthResult<Self> {
        let url = Url::parse(launch_url)
            .map_err(|e| AuthError::ConfigError(format!("Invalid launch URL: {e}")))?;
        Ok(Self {
            location_hash: url.fragment().map(|f| format!("#{f}")),
            raw_init_data: None,
        })
    }

    pub fn with_location_hash(mut self, hash: impl Into<String>) -> Self {
        self.location_hash = Some(hash.into());
        self
    }

    pub fn with_raw_init_data(mut self, init_data: impl Into<String>) -> Self {
        self.raw_init_data = Some(init_data.into());
        self
    }
}

#[async_trait]
impl LaunchContext for StaticLaunchContext {
    fn location_hash(&self) -> Option<String> {
        self.location_hash.clone()
    }

    async fn retrieve_raw_init_data(&self) -> AuthResult<String> {
        self.raw_init_data
            .clone()
            .ok_or_else(|| AuthError::LaunchDataUnavailable("host SDK has no init data".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenStore;

    #[test]
    fn test_parse_hash_init_data() {
        let hash = "#tgWebAppData=query_id%3DAAH%26user%3D%257B%2522id%2522%253A1%257D%26hash%3Dff&tgWebAppVersion=7.0&tgWebAppPlatform=ios";
        let payload = parse_hash_init_data(hash).unwrap();
        assert_eq!(
            payload.as_str(),
            "query_id=AAH&user=%7B%22id%22%3A1%7D&hash=ff"
        );
    }

    #[test]
    fn test_parse_hash_without_marker_fails() {
        assert!(matches!(
            parse_hash_init_data("#tgWebAppVersion=7.0"),
            Err(AuthError::LaunchDataUnavailable(_))
        ));
        assert!(matches!(
            parse_hash_init_data("#tgWebAppData=&tgWebAppVersion=7.0"),
            Err(AuthError::LaunchDataUnavailable(_))
        ));
    }

    #[test]
    fn test_strategy_for_attempt() {
        assert_eq!(LaunchStrategy::for_attempt(0), LaunchStrategy::UrlFragment);
        assert_eq!(LaunchStrategy::for_attempt(1), LaunchStrategy::HostRetrieval);
        assert_eq!(LaunchStrategy::for_attempt(7), LaunchStrategy::HostRetrieval);
    }

    #[test]
    fn test_payload_debug_is_redacted() {
        let payload = LaunchPayload::new("hash=secret");
        assert_eq!(format!("{payload:?}"), "LaunchPayload(<11 bytes>)");
    }

    #[test]
    fn test_from_launch_url_keeps_fragment() {
        let ctx = StaticLaunchContext::from_launch_url(
            "https://app.taskhire.dev/#tgWebAppData=a%3D1&tgWebAppVersion=7.0",
        )
        .unwrap();
        assert_eq!(
            ctx.location_hash().as_deref(),
            Some("#tgWebAppData=a%3D1&tgWebAppVersion=7.0")
        );
    }

    #[tokio::test]
    async fn test_first_attempt_reads_fragment_then_host() {
        let session = SessionContext::new(TokenStore::in_memory());
        let ctx = StaticLaunchContext::empty()
            .with_location_hash("#tgWebAppData=from%20url")
            .with_raw_init_data("from host");

        let first = obtain_launch_payload(&ctx, &session).await.unwrap();
        let second = obtain_launch_payload(&ctx, &session).await.unwrap();

        assert_eq!(first.as_str(), "from url");
        assert_eq!(second.as_str(), "from host");
        assert_eq!(session.refresh_attempts(), 2);
    }

    #[tokio::test]
    async fn test_failed_extraction_still_counts() {
        let session = SessionContext::new(TokenStore::in_memory());
        let ctx = StaticLaunchContext::empty();

        assert!(obtain_launch_payload(&ctx, &session).await.is_err());
        assert_eq!(session.refresh_attempts(), 1);
    }

    #[tokio::test]
    async fn test_from_init_data_round_trips_through_fragment() {
        let session = SessionContext::new(TokenStore::in_memory());
        let ctx = StaticLaunchContext::from_init_data("query_id=1&hash=ab cd");

        let payload = obtain_launch_payload(&ctx, &session).await.unwrap();
        assert_eq!(payload.as_str(), "query_id=1&hash=ab cd");
    }
}
