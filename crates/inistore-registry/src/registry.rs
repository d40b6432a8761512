//! StoreRegistry: one shared `ConfigStore` per INI file.
//!
//! Callers that only know a file path go through the registry instead of
//! loading stores themselves.  The first call for a path loads the file;
//! every later call for the same path gets the same [`ConfigStore`], so all
//! parts of the application see one consistent in-memory copy.
//!
//! # Ownership (for beginners)
//!
//! The registry owns every store it creates in a
//! `HashMap<PathBuf, Arc<ConfigStore>>` and never evicts them.  Callers get
//! an [`Arc`] clone: a shared handle to the same store, not a copy of it.
//!
//! The registry is an ordinary value.  Construct one at startup and pass a
//! reference (or an `Arc<StoreRegistry>`) to whatever needs it; there is no
//! hidden global instance.
//!
//! # Locking
//!
//! The registry lock is held only while looking up or loading a store.  The
//! forwarded operation runs afterwards under the store's own lock, so slow
//! work on one file never blocks callers using a different file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use inistore_core::{ConfigStore, Entry, FromIniValue, StoreError, ToIniValue};
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Path-keyed cache of loaded [`ConfigStore`]s.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    stores: Mutex<HashMap<PathBuf, Arc<ConfigStore>>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the store for `path`, loading and registering it on first use.
    ///
    /// Relative paths are resolved against the current working directory, so
    /// `"app.ini"` and its absolute form share one store.
    ///
    /// # Errors
    ///
    /// Returns the [`StoreError`] from [`ConfigStore::load`] if the file can
    /// be neither read nor created.  Nothing is registered in that case, so a
    /// later call retries the load.
    pub fn get_or_load(&self, path: impl AsRef<Path>) -> Result<Arc<ConfigStore>, StoreError> {
        let key = absolute(path.as_ref());
        let mut stores = self.stores.lock();

        if let Some(store) = stores.get(&key) {
            return Ok(Arc::clone(store));
        }

        let store = match ConfigStore::load(&key) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!(path = %key.display(), error = %e, "failed to load config store");
                return Err(e);
            }
        };
        stores.insert(key.clone(), Arc::clone(&store));
        debug!(path = %key.display(), registered = stores.len(), "registered config store");
        Ok(store)
    }

    /// Returns the store for `path` only if it is already registered.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Arc<ConfigStore>> {
        let key = absolute(path.as_ref());
        self.stores.lock().get(&key).cloned()
    }

    /// Number of registered stores.
    pub fn len(&self) -> usize {
        self.stores.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.lock().is_empty()
    }

    /// Absolute paths of all registered stores, in no particular order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.stores.lock().keys().cloned().collect()
    }

    // ── Forwarding ────────────────────────────────────────────────────────────

    /// [`ConfigStore::get_value`] on the store for `path`; `default` if the
    /// store cannot be loaded.
    pub fn get_value<T: FromIniValue>(&self, path: impl AsRef<Path>, default: T, section: &str, key: &str) -> T {
        match self.get_or_load(path) {
            Ok(store) => store.get_value(default, section, key),
            Err(_) => default,
        }
    }

    /// [`ConfigStore::get_string`] on the store for `path`; `default` if the
    /// store cannot be loaded.
    pub fn get_string(&self, path: impl AsRef<Path>, default: &str, section: &str, key: &str) -> String {
        match self.get_or_load(path) {
            Ok(store) => store.get_string(default, section, key),
            Err(_) => default.to_string(),
        }
    }

    /// [`ConfigStore::set_value`] on the store for `path`.
    ///
    /// # Errors
    ///
    /// Returns the load error if the store cannot be resolved, or the
    /// validation error from the store.
    pub fn set_value(
        &self,
        path: impl AsRef<Path>,
        section: &str,
        key: &str,
        value: impl ToIniValue,
    ) -> Result<(), StoreError> {
        self.get_or_load(path)?.set_value(section, key, value)
    }

    /// [`ConfigStore::set_value_with_comment`] on the store for `path`.
    ///
    /// # Errors
    ///
    /// Same as [`set_value`](Self::set_value).
    pub fn set_value_with_comment(
        &self,
        path: impl AsRef<Path>,
        section: &str,
        key: &str,
        value: impl ToIniValue,
        comment: &str,
        replace_existing_comment: bool,
    ) -> Result<(), StoreError> {
        self.get_or_load(path)?
            .set_value_with_comment(section, key, value, comment, replace_existing_comment)
    }

    /// [`ConfigStore::get_section`] on the store for `path`; empty if the
    /// store cannot be loaded.
    pub fn get_section(&self, path: impl AsRef<Path>, section: &str) -> Vec<Entry> {
        match self.get_or_load(path) {
            Ok(store) => store.get_section(section),
            Err(_) => Vec::new(),
        }
    }

    /// [`ConfigStore::delete_key`] on the store for `path`.
    ///
    /// # Errors
    ///
    /// Returns the load error if the store cannot be resolved, or the write
    /// error when `persist_after` is set.
    pub fn delete_key(
        &self,
        path: impl AsRef<Path>,
        section: &str,
        key: &str,
        persist_after: bool,
    ) -> Result<(), StoreError> {
        self.get_or_load(path)?.delete_key(section, key, persist_after)
    }

    /// [`ConfigStore::delete_section`] on the store for `path`.
    ///
    /// # Errors
    ///
    /// Same as [`delete_key`](Self::delete_key).
    pub fn delete_section(&self, path: impl AsRef<Path>, section: &str, persist_after: bool) -> Result<(), StoreError> {
        self.get_or_load(path)?.delete_section(section, persist_after)
    }

    /// [`ConfigStore::persist`] on the store for `path`.
    ///
    /// # Errors
    ///
    /// Returns the load error if the store cannot be resolved, or the write
    /// error.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        self.get_or_load(path)?.persist()
    }

    /// Persists every registered store, stopping at the first failure.
    ///
    /// The registry lock is released before any file is written.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError::Io`] encountered.
    pub fn persist_all(&self) -> Result<(), StoreError> {
        let stores: Vec<Arc<ConfigStore>> = self.stores.lock().values().cloned().collect();
        for store in stores {
            store.persist()?;
        }
        Ok(())
    }
}

/// Resolves `path` against the current directory if it is relative.
///
/// Falls back to the path as given when the current directory is unavailable.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}
