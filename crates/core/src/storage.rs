//! Durable key/value storage and the token store built on it
//!
//! Tokens live under two well-known string keys, mirroring the layout a
//! browser client keeps in local storage. [`MemoryStorage`] is used for tests
//! and embedding; [`FileStorage`] persists the same map as a JSON document.

use crate::error::{CoreError, CoreResult};
use crate::types::TokenPair;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Storage key of the access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// String key/value storage that outlives a single session
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;
    fn remove(&self, key: &str) -> CoreResult<()>;
}

type Entries = BTreeMap<String, String>;

fn read_entries(lock: &RwLock<Entries>) -> RwLockReadGuard<'_, Entries> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_entries(lock: &RwLock<Entries>) -> RwLockWriteGuard<'_, Entries> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<Entries>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        read_entries(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        write_entries(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        write_entries(&self.entries).remove(key);
        Ok(())
    }
}

/// Storage persisted as a JSON object on disk
///
/// The file is read once on open; every mutation rewrites it through a
/// temporary file and rename.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<Entries>,
}

impl FileStorage {
    /// Open the storage file, starting empty if it does not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Entries::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Entries::new(),
            Err(e) => {
                return Err(CoreError::io_error(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        debug!("Opened token storage at {}", path.display());
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &Entries) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        read_entries(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut entries = write_entries(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        let mut entries = write_entries(&self.entries);
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

/// Access and refresh tokens kept in durable storage
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_access_token", &self.access_token().is_some())
            .field("has_refresh_token", &self.refresh_token().is_some())
            .finish()
    }
}

impl TokenStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Token store backed by fresh in-memory storage
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn has_access_token(&self) -> bool {
        self.access_token().is_some()
    }

    /// Persist both tokens, overwriting any previous pair
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written
    pub fn store(&self, pair: &TokenPair) -> CoreResult<()> {
        self.storage.set(ACCESS_TOKEN_KEY, &pair.access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, &pair.refresh_token)
    }

    /// Remove both tokens
    ///
    /// Both removals are attempted even if the first one fails.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the backing storage
    pub fn clear(&self) -> CoreResult<()> {
        let access = self.storage.remove(ACCESS_TOKEN_KEY);
        let refresh = self.storage.remove(REFRESH_TOKEN_KEY);
        if let Err(e) = &access {
            warn!("Failed to remove access token: {e}");
        }
        access.and(refresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_clear_tokens() {
        let tokens = TokenStore::in_memory();
        assert!(!tokens.has_access_token());

        tokens.store(&TokenPair::new("access", "refresh")).unwrap();
        assert_eq!(tokens.access_token().as_deref(), Some("access"));
        assert_eq!(tokens.refresh_token().as_deref(), Some("refresh"));

        tokens.clear().unwrap();
        assert_eq!(tokens.access_token(), None);
        assert_eq!(tokens.refresh_token(), None);
    }

    #[test]
    fn test_empty_values_count_as_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(ACCESS_TOKEN_KEY, "").unwrap();
        let tokens = TokenStore::new(storage);
        assert!(!tokens.has_access_token());
    }

    #[test]
    fn test_file_storage_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tokens.json");

        {
            let tokens = TokenStore::new(Arc::new(FileStorage::open(&path).unwrap()));
            tokens.store(&TokenPair::new("a1", "r1")).unwrap();
        }

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).as_deref(), Some("a1"));
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).as_deref(), Some("r1"));

        let tokens = TokenStore::new(Arc::new(storage));
        tokens.clear().unwrap();
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY), None);
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FileStorage::open(&path),
            Err(CoreError::Serialization { .. })
        ));
    }
}
