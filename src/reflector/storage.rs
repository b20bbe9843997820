//! Key-value storage reflection.
//!
//! # Responsibilities
//! - Persist each Router's external URL under `prefix + name`
//! - Restore the stored URL when the reflector is installed
//!
//! # Design Decisions
//! - Storage is a trait with an in-memory and a JSON file implementation
//! - Write failures are logged, never surfaced to the navigation

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use dashmap::DashMap;

use crate::reflector::{ReflectorKind, UrlReflector};
use crate::router::Router;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

/// A string key-value store, like a browser's session storage.
pub trait Storage: Send + Sync + fmt::Debug {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Storage backed by a JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: DashMap<String, String>,
}

impl FileStorage {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => DashMap::new(),
            Ok(contents) => {
                let map: BTreeMap<String, String> = serde_json::from_str(&contents)?;
                map.into_iter().collect()
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => DashMap::new(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "loaded url storage");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StorageError> {
        let snapshot: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

pub struct StorageReflector {
    router: Weak<Router>,
    storage: Arc<dyn Storage>,
    prefix: String,
}

impl StorageReflector {
    pub fn new(router: Weak<Router>, storage: Arc<dyn Storage>, prefix: &str) -> Self {
        Self {
            router,
            storage,
            prefix: prefix.to_string(),
        }
    }

    fn key(&self, router: &Router) -> String {
        format!("{}{}", self.prefix, router.name())
    }
}

impl UrlReflector for StorageReflector {
    fn kind(&self) -> Option<ReflectorKind> {
        Some(ReflectorKind::Storage)
    }

    fn install(&self) {
        let Some(router) = self.router.upgrade() else {
            return;
        };
        let Some(url) = self.storage.get(&self.key(&router)) else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(router = %router.name(), "no async runtime, stored url not restored");
            return;
        };
        tracing::debug!(router = %router.name(), url = %url, "restoring stored url");
        let weak = self.router.clone();
        handle.spawn(async move {
            let Some(router) = weak.upgrade() else {
                return;
            };
            if let Err(err) = router.replace(&url).await {
                tracing::warn!(router = %router.name(), error = %err, "failed to restore stored url");
            }
        });
    }

    fn reflect(&self) {
        let Some(router) = self.router.upgrade() else {
            return;
        };
        let Some(url) = router.external_url() else {
            return;
        };
        let key = self.key(&router);
        if self.storage.get(&key).as_deref() == Some(url.as_str()) {
            return;
        }
        if let Err(err) = self.storage.set(&key, &url) {
            tracing::warn!(router = %router.name(), key = %key, error = %err, "failed to store url");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert!(storage.get("a").is_none());
        storage.set("a", "/x").unwrap();
        assert_eq!(storage.get("a").as_deref(), Some("/x"));
        storage.remove("a").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_file_storage_persists() {
        let path = std::env::temp_dir().join(format!("route-storage-{}.json", uuid::Uuid::new_v4()));

        let storage = FileStorage::load(&path).unwrap();
        storage.set("__router-side", "/b").unwrap();
        drop(storage);

        let reopened = FileStorage::load(&path).unwrap();
        assert_eq!(reopened.get("__router-side").as_deref(), Some("/b"));
        reopened.remove("__router-side").unwrap();
        assert!(FileStorage::load(&path).unwrap().get("__router-side").is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_storage_rejects_garbage() {
        let path = std::env::temp_dir().join(format!("route-storage-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(FileStorage::load(&path), Err(StorageError::Json(_))));
        let _ = std::fs::remove_file(&path);
    }
}
