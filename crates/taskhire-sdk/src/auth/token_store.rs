//! Bearer token persistence
//!
//! [`TokenStore`] keeps a single bearer token under a fixed key in a
//! key-value [`TokenStorage`] backend. Reads and writes never fail from the
//! caller's point of view: backend errors are logged and a failed read counts
//! as "no token".

use super::types::{get_sdk_data_dir, AuthError, AuthResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taskhire_common::constants::{ACCESS_TOKEN_KEY, APP_NAME};
use tracing::{debug, warn};

/// Durable key-value area the token lives in
#[async_trait]
pub trait TokenStorage: Send + Sync + fmt::Debug {
    async fn get(&self, key: &str) -> AuthResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> AuthResult<()>;

    async fn remove(&self, key: &str) -> AuthResult<()>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Process-local storage, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a bearer token
    pub fn with_token(token: impl Into<String>) -> Self {
        let storage = Self::new();
        storage
            .values
            .write()
            .insert(ACCESS_TOKEN_KEY.to_string(), token.into());
        storage
    }
}

#[async_trait]
impl TokenStorage for MemoryStorage {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AuthResult<()> {
        self.values.write().remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// JSON file holding a flat string map
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    const FILE_NAME: &'static str = "storage.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage file in the platform data directory
    pub fn default_location() -> AuthResult<Self> {
        Ok(Self::new(get_sdk_data_dir()?.join(Self::FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> AuthResult<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(content) if content.is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_slice(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, values: &BTreeMap<String, String>) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write-then-rename: readers never see a partial file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(values)?).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStorage for FileStorage {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        let mut values = self.read_all().await?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values).await
    }

    async fn remove(&self, key: &str) -> AuthResult<()> {
        let mut values = self.read_all().await?;
        if values.remove(key).is_some() {
            self.write_all(&values).await?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// OS keyring entry per key, under the `taskhire` service
#[derive(Debug, Clone)]
pub struct KeyringStorage {
    service: String,
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new(APP_NAME)
    }
}

impl KeyringStorage {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(service: &str, key: &str) -> AuthResult<keyring::Entry> {
        keyring::Entry::new(service, key)
            .map_err(|e| AuthError::StorageError(format!("Failed to open keyring entry: {e}")))
    }

    /// Keyring calls block on platform IPC, keep them off the async workers
    async fn blocking<T, F>(&self, key: &str, op: F) -> AuthResult<T>
    where
        T: Send + 'static,
        F: FnOnce(keyring::Entry) -> AuthResult<T> + Send + 'static,
    {
        let service = self.service.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || op(Self::entry(&service, &key)?))
            .await
            .map_err(|e| AuthError::StorageError(format!("Keyring task failed: {e}")))?
    }
}

#[async_trait]
impl TokenStorage for KeyringStorage {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        self.blocking(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AuthError::StorageError(e.to_string())),
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        let value = value.to_string();
        self.blocking(key, move |entry| {
            entry
                .set_password(&value)
                .map_err(|e| AuthError::StorageError(e.to_string()))
        })
        .await
    }

    async fn remove(&self, key: &str) -> AuthResult<()> {
        self.blocking(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AuthError::StorageError(e.to_string())),
        })
        .await
    }

    fn name(&self) -> &str {
        "keyring"
    }
}

/// Holder of the session's bearer token
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn TokenStorage>,
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("storage", &self.storage.name())
            .finish()
    }
}

impl TokenStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage }
    }

    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Current token, if any. Storage failures read as "no token".
    pub async fn get_token(&self) -> Option<String> {
        match self.storage.get(ACCESS_TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(backend = self.storage.name(), "Failed to read token: {}", e);
                None
            }
        }
    }

    /// Persist `token`, replacing any previous one. Storage failures are logged.
    pub async fn set_token(&self, token: &str) {
        match self.storage.set(ACCESS_TOKEN_KEY, token).await {
            Ok(()) => debug!(backend = self.storage.name(), "Stored access token"),
            Err(e) => warn!(backend = self.storage.name(), "Failed to store token: {}", e),
        }
    }

    pub async fn clear_token(&self) {
        if let Err(e) = self.storage.remove(ACCESS_TOKEN_KEY).await {
            warn!(backend = self.storage.name(), "Failed to clear token: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_round_trip() {
        let store = TokenStore::in_memory();
        assert_eq!(store.get_token().await, None);

        store.set_token("abc").await;
        assert_eq!(store.get_token().await.as_deref(), Some("abc"));

        store.set_token("def").await;
        assert_eq!(store.get_token().await.as_deref(), Some("def"));

        store.clear_token().await;
        assert_eq!(store.get_token().await, None);
    }

    #[tokio::test]
    async fn test_survives_reinstantiation_over_same_storage() {
        let backing = MemoryStorage::new();

        TokenStore::new(Arc::new(backing.clone())).set_token("abc").await;
        let reloaded = TokenStore::new(Arc::new(backing));

        assert_eq!(reloaded.get_token().await.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_file_storage_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        TokenStore::new(Arc::new(FileStorage::new(&path)))
            .set_token("abc")
            .await;
        let reloaded = TokenStore::new(Arc::new(FileStorage::new(&path)));
        assert_eq!(reloaded.get_token().await.as_deref(), Some("abc"));

        let raw: BTreeMap<String, String> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw.get(ACCESS_TOKEN_KEY).map(String::as_str), Some("abc"));
    }

    #[tokio::test]
    async fn test_file_storage_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));

        storage.set("theme", "dark").await.unwrap();
        storage.set(ACCESS_TOKEN_KEY, "abc").await.unwrap();
        storage.remove(ACCESS_TOKEN_KEY).await.unwrap();

        assert_eq!(storage.get("theme").await.unwrap().as_deref(), Some("dark"));
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_no_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, b"not json").unwrap();

        let store = TokenStore::new(Arc::new(FileStorage::new(&path)));
        assert_eq!(store.get_token().await, None);
    }
}
