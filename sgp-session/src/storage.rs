//! Key/value storage backends
//!
//! Persistent string-to-string storage scoped to one origin, the way browser
//! local storage behaves. Backends: in-memory and a single JSON file.

use async_trait::async_trait;
use sgp_core::{storage_error, PortalResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Storage key of the session token
pub const TOKEN_KEY: &str = "token";
/// Storage key of the username
pub const USERNAME_KEY: &str = "username";
/// Storage key of the role
pub const ROLE_KEY: &str = "role";
/// Storage key of the sidebar collapse flag
pub const SIDEBAR_COLLAPSED_KEY: &str = "sidebar-collapsed";

/// String key/value storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortalResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortalResult<()>;

    /// Removing a missing key is not an error
    async fn remove(&self, key: &str) -> PortalResult<()>;
}

/// In-memory store, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with entries
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Arc::new(RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            )),
        }
    }

    /// Copy of every entry, for assertions and diagnostics
    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> PortalResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortalResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortalResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Store persisted as one JSON object on disk.
///
/// The file is created on first write. Every mutation rewrites the whole
/// file; writes within the process are serialised.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        debug!("File store at: {}", path.display());

        Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Store under the platform data directory (`<data_dir>/sgp/storage.json`)
    pub fn default_location() -> PortalResult<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| storage_error!("No platform data directory available", "file_store"))?;
        Ok(Self::new(data_dir.join("sgp").join("storage.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> PortalResult<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                storage_error!(
                    format!("Corrupt store file {}: {}", self.path.display(), e),
                    "file_store",
                    e
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(storage_error!(
                format!("Failed to read {}: {}", self.path.display(), e),
                "file_store",
                e
            )),
        }
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> PortalResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                storage_error!(
                    format!("Failed to create {}: {}", parent.display(), e),
                    "file_store",
                    e
                )
            })?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            storage_error!(
                format!("Failed to write {}: {}", self.path.display(), e),
                "file_store",
                e
            )
        })
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> PortalResult<Option<String>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> PortalResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await?;
        debug!(key, "Stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortalResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
            debug!(key, "Removed value");
        }
        Ok(())
    }
}
