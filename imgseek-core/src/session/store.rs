//! Persisted key-value store for identity and the login flag.
//!
//! Two implementations:
//! - `MemorySessionStore` - concurrent in-memory map (tests, the `--mock` CLI)
//! - `FileSessionStore` - one JSON object on disk, rewritten on every mutation

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::error::{Result, SearchError};

/// Key holding the JSON identity record.
pub const USER_KEY: &str = "user";

/// Key holding the `"true"` / `"false"` login flag.
pub const LOGGED_IN_KEY: &str = "isLoggedIn";

/// Key-value store scoped to one client profile, with no expiry.
///
/// Implementations must be thread-safe (`Send + Sync`). Writes are
/// best-effort and idempotent: setting the same value twice is harmless.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Drop every key.
    fn clear(&self) -> Result<()>;
}

/// Thread-safe in-memory store.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: DashMap<String, String>,
}

impl MemorySessionStore {
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

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionStore")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Store backed by a single JSON file.
///
/// The file is read lazily on first access and rewritten in full after each
/// mutation. A missing file is an empty store.
pub struct FileSessionStore {
    path: PathBuf,
    cache: Mutex<Option<BTreeMap<String, String>>>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                warn!(path = %self.path.display(), error = %e, "Session store is corrupt");
                SearchError::StoreError(format!(
                    "Failed to parse session store {}: {e}",
                    self.path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(SearchError::StoreError(format!(
                "Failed to read session store {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SearchError::StoreError(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let bytes = serde_json::to_vec_pretty(entries)?;
        std::fs::write(&self.path, bytes).map_err(|e| {
            SearchError::StoreError(format!(
                "Failed to write session store {}: {e}",
                self.path.display()
            ))
        })?;
        debug!(path = %self.path.display(), keys = entries.len(), "Session store written");
        Ok(())
    }

    fn with_entries<T>(
        &self,
        mutate: bool,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> T,
    ) -> Result<T> {
        let mut guard = self
            .cache
            .lock()
            .map_err(|_| SearchError::StoreError("Session store lock poisoned".into()))?;
        if guard.is_none() {
            *guard = Some(self.load()?);
        }
        let entries = guard.get_or_insert_with(BTreeMap::new);
        if !mutate {
            return Ok(f(entries));
        }
        // The cache only moves once the file has been written.
        let mut next = entries.clone();
        let out = f(&mut next);
        self.persist(&next)?;
        *entries = next;
        Ok(out)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_entries(false, |entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_entries(true, |entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_entries(true, |entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<()> {
        self.with_entries(true, |entries| entries.clear())
    }
}

impl std::fmt::Debug for FileSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSessionStore")
            .field("path", &self.path)
            .finish()
    }
}
