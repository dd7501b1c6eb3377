//! Configuration management for the Taskhire CLI
//!
//! Layers, lowest priority first: built-in defaults, the TOML config file,
//! then `TASKHIRE_*` environment variables (`__` separates nested keys, e.g.
//! `TASKHIRE_API__BASE_URL`).

use crate::error::Result;
use etcetera::{choose_base_strategy, BaseStrategy};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use taskhire_common::constants::{APP_NAME, DEFAULT_API_URL, ENV_PREFIX};
use taskhire_common::ConfigurationError;
use taskhire_sdk::{ClientBuilder, InvalidationPolicy, RetryConfig, StaticLaunchContext};
use tracing::debug;

/// CLI configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    /// Cache invalidation after a session refresh
    pub cache: InvalidationPolicy,
    pub retry: RetrySettings,
}

/// API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for the Taskhire API, including the version prefix
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: taskhire_sdk::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Where the bearer token is kept between invocations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    File,
    Keyring,
    /// Forgotten when the process exits
    Memory,
}

/// Authentication configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub token_backend: TokenBackend,

    /// Mini App launch URL carrying `#tgWebAppData=...`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_url: Option<String>,

    /// Raw signed init data, used when no launch URL is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_data: Option<String>,
}

/// Profile read retry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            max_retries: defaults.max_retries,
            base_delay_ms: defaults.base_delay.as_millis() as u64,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay: Duration::from_millis(settings.base_delay_ms),
            ..Default::default()
        }
    }
}

impl CliConfig {
    /// Load configuration from `path`, or from the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => expand_path(p),
            None => Self::default_path()?,
        };
        Self::load_from_path(&path)
    }

    /// Load configuration from a specific path; a missing file means defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());

        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigurationError::from)?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigurationError::invalid("api.base_url", "must not be empty").into());
        }
        if self.api.timeout_secs == 0 {
            return Err(
                ConfigurationError::invalid("api.timeout_secs", "must be greater than 0").into(),
            );
        }
        if let Some(url) = &self.auth.launch_url {
            StaticLaunchContext::from_launch_url(url)?;
        }
        Ok(())
    }

    /// Whether login has launch data to work with
    pub fn has_launch_data(&self) -> bool {
        self.auth.launch_url.is_some() || self.auth.init_data.is_some()
    }

    /// Launch context built from the configured URL and/or init data
    pub fn launch_context(&self) -> Result<StaticLaunchContext> {
        let context = match (&self.auth.launch_url, &self.auth.init_data) {
            (Some(url), Some(init_data)) => {
                StaticLaunchContext::from_launch_url(url)?.with_raw_init_data(init_data.clone())
            }
            (Some(url), None) => StaticLaunchContext::from_launch_url(url)?,
            (None, Some(init_data)) => StaticLaunchContext::from_init_data(init_data.clone()),
            (None, None) => StaticLaunchContext::empty(),
        };
        Ok(context)
    }

    /// Client builder carrying everything this configuration decides
    pub fn client_builder(&self) -> Result<ClientBuilder> {
        let builder = ClientBuilder::default()
            .base_url(&self.api.base_url)
            .timeout(Duration::from_secs(self.api.timeout_secs))
            .with_launch_context(Arc::new(self.launch_context()?))
            .invalidation_policy(self.cache.clone())
            .retry(RetryConfig::from(&self.retry));

        let builder = match self.auth.token_backend {
            TokenBackend::File => builder.with_file_storage()?,
            TokenBackend::Keyring => builder.with_keyring_storage(),
            TokenBackend::Memory => builder,
        };
        Ok(builder)
    }

    /// Flattened `key = value` view, launch data redacted
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();

        map.insert("api.base_url".to_string(), self.api.base_url.clone());
        map.insert(
            "api.timeout_secs".to_string(),
            self.api.timeout_secs.to_string(),
        );
        map.insert(
            "auth.token_backend".to_string(),
            format!("{:?}", self.auth.token_backend).to_lowercase(),
        );
        map.insert(
            "auth.launch_url".to_string(),
            redacted(self.auth.launch_url.as_deref()),
        );
        map.insert(
            "auth.init_data".to_string(),
            redacted(self.auth.init_data.as_deref()),
        );
        map.insert("cache.exempt".to_string(), self.cache.exempt.join(", "));
        map.insert(
            "cache.force_invalidate".to_string(),
            self.cache.force_invalidate.clone().unwrap_or_default(),
        );
        map.insert(
            "retry.max_retries".to_string(),
            self.retry.max_retries.to_string(),
        );
        map.insert(
            "retry.base_delay_ms".to_string(),
            self.retry.base_delay_ms.to_string(),
        );

        map
    }

    /// Default config file path
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get configuration directory
    pub fn config_dir() -> Result<PathBuf> {
        let strategy = choose_base_strategy().map_err(|e| ConfigurationError::Directory {
            what: "config".to_string(),
            details: e.to_string(),
        })?;
        Ok(strategy.config_dir().join(APP_NAME))
    }
}

fn redacted(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => format!("<set, {} bytes>", v.len()),
        _ => "<unset>".to_string(),
    }
}

/// Expand `~` and environment variables in a user-supplied path
fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => shellexpand::full(s)
            .map(|expanded| PathBuf::from(expanded.as_ref()))
            .unwrap_or_else(|_| path.to_path_buf()),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_from_path(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.auth.token_backend, TokenBackend::File);
        assert_eq!(config.cache, InvalidationPolicy::default());
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.base_delay_ms, 1000);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_config(
            r#"
[api]
base_url = "https://api.taskhire.app/api/v1"

[auth]
token_backend = "memory"
init_data = "query_id=1&hash=ff"

[cache]
exempt = ["auth"]

[retry]
max_retries = 1
base_delay_ms = 250
"#,
        );

        let config = CliConfig::load_from_path(file.path()).unwrap();

        assert_eq!(config.api.base_url, "https://api.taskhire.app/api/v1");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.auth.token_backend, TokenBackend::Memory);
        assert!(config.has_launch_data());
        assert_eq!(config.cache.exempt, vec!["auth".to_string()]);
        assert_eq!(config.cache.force_invalidate.as_deref(), Some("posts-feed"));

        let retry = RetryConfig::from(&config.retry);
        assert_eq!(retry.max_retries, 1);
        assert_eq!(retry.base_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let file = write_config("[api]\ntimeout_secs = 0\n");
        assert!(matches!(
            CliConfig::load_from_path(file.path()),
            Err(CliError::Config(ConfigurationError::InvalidValue { .. }))
        ));

        let file = write_config("[auth]\ntoken_backend = \"floppy\"\n");
        assert!(matches!(
            CliConfig::load_from_path(file.path()),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_to_map_redacts_launch_data() {
        let mut config = CliConfig::default();
        config.auth.init_data = Some("query_id=1&hash=ff".into());

        let map = config.to_map();
        assert_eq!(map["auth.init_data"], "<set, 18 bytes>");
        assert_eq!(map["auth.launch_url"], "<unset>");
        assert_eq!(map["auth.token_backend"], "file");
    }

    #[test]
    fn test_memory_backend_builds_client() {
        let mut config = CliConfig::default();
        config.auth.token_backend = TokenBackend::Memory;
        config.auth.init_data = Some("query_id=1".into());

        let client = config.client_builder().unwrap().build().unwrap();
        assert_eq!(client.transport().base_url(), DEFAULT_API_URL);
    }
}
