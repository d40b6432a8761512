//! Thread-safe single-file configuration store.
//!
//! A [`ConfigStore`] is bound to one INI file for its whole life.  The file is
//! read once by [`ConfigStore::load`]; after that every read and write works
//! on the in-memory [`Document`], and the file is only rewritten when the
//! caller asks for it ([`ConfigStore::persist`], or the `persist_after` flag
//! on the delete operations).
//!
//! # Locking (for beginners)
//!
//! The document sits behind a [`parking_lot::Mutex`].  Every public method
//! takes the lock once and keeps it until it returns, so two threads calling
//! methods on the same store are served strictly one after the other and
//! never see a half-applied change.
//!
//! Operations that mutate *and* persist (for example
//! [`ConfigStore::delete_key`] with `persist_after = true`) do both under the
//! same lock acquisition.  The file writer therefore takes an already-locked
//! `&Document` instead of locking again, so the mutex is never re-entered.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::document::{Document, Entry};
use crate::format::grammar::{
    normalize_comment, validate_comment, validate_key_name, validate_section_name, validate_value,
    GrammarError,
};
use crate::format::{parse_document, render_document};
use crate::value::{FromIniValue, ToIniValue};

/// Errors returned by [`ConfigStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The bound file could not be read, created or written.
    #[error("I/O error accessing config at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A section name, key name, value or comment was rejected before any
    /// mutation.
    #[error(transparent)]
    Invalid(#[from] GrammarError),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// In-memory view of one INI file, safe to share between threads.
///
/// Wrap it in an [`Arc`](std::sync::Arc) to share it; all methods take
/// `&self`.
///
/// # Examples
///
/// ```rust,no_run
/// use inistore_core::ConfigStore;
///
/// let store = ConfigStore::load("app.ini")?;
/// store.set_value_with_comment("db", "port", 5432, "listen port", false)?;
/// assert_eq!(store.get_value(0, "db", "port"), 5432);
/// store.persist()?;
/// # Ok::<(), inistore_core::StoreError>(())
/// ```
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    doc: Mutex<Document>,
}

impl ConfigStore {
    /// Reads `path` and binds a new store to it.
    ///
    /// A missing file is created empty and yields an empty store.  Malformed
    /// lines are skipped (see [`parse_document`]); content never makes this
    /// fail.  Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read, or
    /// does not exist and cannot be created.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let doc = match fs::read(&path) {
            Ok(bytes) => parse_document(&String::from_utf8_lossy(&bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(|source| {
                        warn!(path = %path.display(), error = %source, "failed to create config file");
                        StoreError::io(&path, source)
                    })?;
                info!(path = %path.display(), "created empty config file");
                Document::new()
            }
            Err(source) => {
                warn!(path = %path.display(), error = %source, "failed to read config file");
                return Err(StoreError::io(&path, source));
            }
        };

        debug!(
            path = %path.display(),
            sections = doc.sections().len(),
            entries = doc.entry_count(),
            "loaded config file"
        );

        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    /// The file this store reads from and persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the whole in-memory document to the bound file, replacing its
    /// previous content.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be opened for writing.
    pub fn persist(&self) -> Result<(), StoreError> {
        let doc = self.doc.lock();
        self.write_locked(&doc)
    }

    /// Renders the current document without touching the file.
    pub fn to_ini_string(&self) -> String {
        render_document(&self.doc.lock())
    }

    /// Sets `section.key` to `value`, creating the section and key as needed.
    ///
    /// Shorthand for [`set_value_with_comment`](Self::set_value_with_comment)
    /// with no comment: an existing comment is kept.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] if either name is malformed.
    pub fn set_value(&self, section: &str, key: &str, value: impl ToIniValue) -> Result<(), StoreError> {
        self.set_value_with_comment(section, key, value, "", false)
    }

    /// Sets `section.key` to `value` with a trailing comment.
    ///
    /// `comment` is trimmed and prefixed with `# ` unless it already starts
    /// with `;` or `#`.  On an existing key the value is always replaced; the
    /// comment is replaced only when `comment` is non-empty or
    /// `replace_existing_comment` is `true` (so `("", true)` clears it).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] if `section` does not match
    /// `[A-Za-z_][A-Za-z_0-9\- ]*` without a trailing space, `key` does not
    /// match `[A-Za-z_][A-Za-z_0-9.]*`, or the value or comment contains a
    /// line break.  The store is left unchanged.
    ///
    /// A value containing `#` or `;` is stored as given, but after a
    /// persist and reload the text from that marker onwards becomes the
    /// entry's comment.
    pub fn set_value_with_comment(
        &self,
        section: &str,
        key: &str,
        value: impl ToIniValue,
        comment: &str,
        replace_existing_comment: bool,
    ) -> Result<(), StoreError> {
        let value = value.to_ini_value();
        if let Err(e) = validate_section_name(section)
            .and_then(|()| validate_key_name(key))
            .and_then(|()| validate_value(&value))
            .and_then(|()| validate_comment(comment))
        {
            debug!(section, key, error = %e, "rejected set_value");
            return Err(e.into());
        }

        let comment = normalize_comment(comment);

        let mut doc = self.doc.lock();
        match doc.entry_mut(section, key) {
            Some(entry) => {
                entry.value = value;
                if replace_existing_comment || !comment.is_empty() {
                    entry.comment = comment;
                }
            }
            None => doc.upsert(section, Entry::new(key, value, comment)),
        }
        Ok(())
    }

    /// Reads `section.key` as `T`, falling back to `default`.
    ///
    /// `default` is returned when the key is missing, its value is empty, or
    /// the text does not parse completely as `T` (see [`crate::value`]).
    pub fn get_value<T: FromIniValue>(&self, default: T, section: &str, key: &str) -> T {
        self.non_empty_value(section, key)
            .and_then(|text| T::from_ini_value(&text))
            .unwrap_or(default)
    }

    /// Reads `section.key` as text, falling back to `default`.
    pub fn get_string(&self, default: &str, section: &str, key: &str) -> String {
        self.non_empty_value(section, key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Returns a copy of the entry at `section.key`, including empty values.
    pub fn get_entry(&self, section: &str, key: &str) -> Option<Entry> {
        self.doc.lock().entry(section, key).cloned()
    }

    /// Returns `true` if `section.key` exists, whatever its value.
    pub fn contains_key(&self, section: &str, key: &str) -> bool {
        self.doc.lock().entry(section, key).is_some()
    }

    /// Returns a snapshot of the entries of `section` in order.
    ///
    /// An unknown section yields an empty vector.  Later changes to the store
    /// do not affect the returned copy.
    pub fn get_section(&self, section: &str) -> Vec<Entry> {
        self.doc
            .lock()
            .section(section)
            .map(|s| s.entries().to_vec())
            .unwrap_or_default()
    }

    /// Section names in file order.
    pub fn section_names(&self) -> Vec<String> {
        self.doc
            .lock()
            .sections()
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Removes `section.key` if present, then optionally persists.
    ///
    /// A missing section or key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] only when `persist_after` is set and the
    /// write fails; the in-memory removal has happened either way.
    pub fn delete_key(&self, section: &str, key: &str, persist_after: bool) -> Result<(), StoreError> {
        let mut doc = self.doc.lock();
        if doc.remove_key(section, key) {
            debug!(section, key, "deleted key");
        }
        if persist_after {
            self.write_locked(&doc)
        } else {
            Ok(())
        }
    }

    /// Removes `section` and all its entries if present, then optionally
    /// persists.
    ///
    /// # Errors
    ///
    /// Same contract as [`delete_key`](Self::delete_key).
    pub fn delete_section(&self, section: &str, persist_after: bool) -> Result<(), StoreError> {
        let mut doc = self.doc.lock();
        if doc.remove_section(section) {
            debug!(section, "deleted section");
        }
        if persist_after {
            self.write_locked(&doc)
        } else {
            Ok(())
        }
    }

    fn non_empty_value(&self, section: &str, key: &str) -> Option<String> {
        self.doc
            .lock()
            .entry(section, key)
            .filter(|e| !e.value.is_empty())
            .map(|e| e.value.clone())
    }

    /// Serializes `doc` to the bound file.  Callers must hold the lock that
    /// guards `doc`.
    fn write_locked(&self, doc: &Document) -> Result<(), StoreError> {
        let text = render_document(doc);
        fs::write(&self.path, &text).map_err(|source| {
            warn!(path = %self.path.display(), error = %source, "failed to persist config file");
            StoreError::io(&self.path, source)
        })?;
        debug!(path = %self.path.display(), bytes = text.len(), "persisted config file");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use uuid::Uuid;

    /// Creates a fresh temp directory and returns it with an `app.ini` path
    /// inside.  The file itself does not exist yet.
    fn temp_ini() -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("inistore_test_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("app.ini");
        (dir, path)
    }

    fn load_text(text: &str) -> (PathBuf, ConfigStore) {
        let (dir, path) = temp_ini();
        fs::write(&path, text).unwrap();
        (dir, ConfigStore::load(&path).expect("load"))
    }

    // ── load ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_missing_file_creates_it_empty() {
        // Arrange
        let (dir, path) = temp_ini();

        // Act
        let store = ConfigStore::load(&path).expect("load");

        // Assert
        assert!(path.exists(), "missing file must be created");
        assert!(store.section_names().is_empty());
        assert_eq!(store.path(), path.as_path());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_fails_when_parent_directory_is_missing() {
        let path = std::env::temp_dir()
            .join(format!("inistore_missing_{}", Uuid::new_v4()))
            .join("app.ini");

        let result = ConfigStore::load(&path);

        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_load_reads_sections_entries_and_comments() {
        let (dir, store) = load_text("[db]\nport = 5432 ; listen port\nhost=localhost\n");

        assert_eq!(store.get_string("", "db", "host"), "localhost");
        assert_eq!(
            store.get_entry("db", "port"),
            Some(Entry::new("port", "5432", "; listen port"))
        );

        fs::remove_dir_all(&dir).ok();
    }

    // ── set_value ─────────────────────────────────────────────────────────────

    #[test]
    fn test_set_value_creates_section_and_key() {
        let (dir, store) = load_text("");

        store.set_value("net", "port", 80).unwrap();

        assert_eq!(store.get_value(0, "net", "port"), 80);
        assert_eq!(store.section_names(), vec!["net".to_string()]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_value_rejects_invalid_section_and_leaves_store_unchanged() {
        // Arrange
        let (dir, store) = load_text("[s]\nk=v\n");
        let before = store.to_ini_string();

        // Act
        let result = store.set_value("1bad", "k", "x");

        // Assert
        assert!(matches!(
            result,
            Err(StoreError::Invalid(GrammarError::InvalidSection(_)))
        ));
        assert_eq!(store.to_ini_string(), before);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_value_rejects_key_with_trailing_space() {
        let (dir, store) = load_text("[s]\nk=v\n");
        let before = store.to_ini_string();

        let result = store.set_value("s", "bad ", "x");

        assert!(matches!(
            result,
            Err(StoreError::Invalid(GrammarError::InvalidKey(_)))
        ));
        assert_eq!(store.to_ini_string(), before);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_value_rejects_value_with_line_break() {
        // Arrange
        let (dir, store) = load_text("[s]\nk=v\n");
        let before = store.to_ini_string();

        // Act
        let result = store.set_value("s", "k", "1\n[evil]\ninjected=yes");

        // Assert
        assert!(matches!(
            result,
            Err(StoreError::Invalid(GrammarError::InvalidValue(_)))
        ));
        assert!(store.set_value("s", "cr", "a\rb").is_err());
        assert_eq!(store.to_ini_string(), before);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_value_rejects_comment_with_line_break() {
        let (dir, store) = load_text("[s]\nc=1 # keep\n");
        let before = store.to_ini_string();

        let result = store.set_value_with_comment("s", "c", 2, "line1\nz=9", true);

        assert!(matches!(
            result,
            Err(StoreError::Invalid(GrammarError::InvalidComment(_)))
        ));
        assert_eq!(store.to_ini_string(), before);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_persist_reload_keeps_structure_after_rejected_line_breaks() {
        // Arrange
        let (dir, path) = temp_ini();
        let store = ConfigStore::load(&path).unwrap();
        store.set_value("s", "k", 1).unwrap();
        assert!(store.set_value("s", "k", "1\n[evil]\ninjected=yes").is_err());
        assert!(store.set_value_with_comment("s", "c", 1, "line1\nz=9", false).is_err());

        // Act
        store.persist().unwrap();
        let reloaded = ConfigStore::load(&path).unwrap();

        // Assert
        assert_eq!(reloaded.section_names(), vec!["s".to_string()]);
        assert_eq!(reloaded.get_section("s"), vec![Entry::new("k", "1", "")]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_value_with_comment_marker_splits_on_reload() {
        // Arrange
        let (dir, path) = temp_ini();
        let store = ConfigStore::load(&path).unwrap();
        store.set_value("s", "url", "http://h/#frag").unwrap();
        assert_eq!(store.get_string("", "s", "url"), "http://h/#frag");

        // Act
        store.persist().unwrap();
        let reloaded = ConfigStore::load(&path).unwrap();

        // Assert – the marker starts the comment once the file is read back
        assert_eq!(
            reloaded.get_entry("s", "url"),
            Some(Entry::new("url", "http://h/", "#frag"))
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_value_normalizes_comment() {
        let (dir, store) = load_text("");

        store
            .set_value_with_comment("db", "port", 5432, "  listen port ", false)
            .unwrap();

        assert_eq!(store.get_entry("db", "port").unwrap().comment, "# listen port");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_value_empty_comment_keeps_existing_comment() {
        // Arrange
        let (dir, store) = load_text("[db]\nport=1 # keep me\n");

        // Act
        store.set_value("db", "port", 2).unwrap();

        // Assert
        let entry = store.get_entry("db", "port").unwrap();
        assert_eq!(entry.value, "2");
        assert_eq!(entry.comment, "# keep me");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_value_replace_flag_clears_existing_comment() {
        let (dir, store) = load_text("[db]\nport=1 # old\n");

        store
            .set_value_with_comment("db", "port", 2, "", true)
            .unwrap();

        assert_eq!(store.get_entry("db", "port").unwrap().comment, "");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_value_non_empty_comment_replaces_without_flag() {
        let (dir, store) = load_text("[db]\nport=1 # old\n");

        store
            .set_value_with_comment("db", "port", 2, "; new", false)
            .unwrap();

        assert_eq!(store.get_entry("db", "port").unwrap().comment, "; new");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_value_keeps_single_entry_per_key() {
        let (dir, store) = load_text("");

        for i in 0..5 {
            store.set_value("s", "k", i).unwrap();
        }

        assert_eq!(store.get_section("s"), vec![Entry::new("k", "4", "")]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_value_accepts_float_and_bool() {
        let (dir, store) = load_text("");

        store.set_value("s", "ratio", 0.75f64).unwrap();
        store.set_value("s", "enabled", true).unwrap();

        assert_eq!(store.get_string("", "s", "ratio"), "0.75");
        assert!((store.get_value(0.0f64, "s", "ratio") - 0.75).abs() < f64::EPSILON);
        assert!(store.get_value(false, "s", "enabled"));

        fs::remove_dir_all(&dir).ok();
    }

    // ── get_value ─────────────────────────────────────────────────────────────

    #[test]
    fn test_get_value_missing_returns_default_unmodified() {
        let (dir, store) = load_text("[s]\nk=v\n");

        assert_eq!(store.get_string("fallback", "s", "missing"), "fallback");
        assert_eq!(store.get_string("fallback", "missing", "k"), "fallback");
        assert_eq!(store.get_value(-7i64, "s", "missing"), -7);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_get_value_empty_stored_value_returns_default() {
        let (dir, store) = load_text("[s]\nk=\n");

        assert_eq!(store.get_string("d", "s", "k"), "d");
        assert_eq!(store.get_value(9, "s", "k"), 9);
        assert!(store.contains_key("s", "k"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_get_value_partial_number_returns_default() {
        let (dir, store) = load_text("[s]\nbad=123abc\ngood=123\n");

        assert_eq!(store.get_value(0, "s", "bad"), 0);
        assert_eq!(store.get_value(0, "s", "good"), 123);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_get_value_string_type_returns_raw_text() {
        let (dir, store) = load_text("[s]\nk=123abc\n");

        assert_eq!(store.get_value(String::new(), "s", "k"), "123abc");

        fs::remove_dir_all(&dir).ok();
    }

    // ── get_section ───────────────────────────────────────────────────────────

    #[test]
    fn test_get_section_snapshot_is_independent() {
        // Arrange
        let (dir, store) = load_text("[s]\na=1\n");

        // Act
        let snapshot = store.get_section("s");
        store.set_value("s", "b", 2).unwrap();

        // Assert
        assert_eq!(snapshot, vec![Entry::new("a", "1", "")]);
        assert_eq!(store.get_section("s").len(), 2);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_get_section_missing_is_empty() {
        let (dir, store) = load_text("[s]\na=1\n");
        assert!(store.get_section("t").is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    // ── delete ────────────────────────────────────────────────────────────────

    #[test]
    fn test_delete_key_without_persist_leaves_file_untouched() {
        // Arrange
        let (dir, path) = temp_ini();
        fs::write(&path, "[s]\na=1\nb=2\n").unwrap();
        let store = ConfigStore::load(&path).unwrap();

        // Act
        store.delete_key("s", "a", false).unwrap();

        // Assert
        assert!(!store.contains_key("s", "a"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[s]\na=1\nb=2\n");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_delete_key_with_persist_rewrites_file() {
        let (dir, path) = temp_ini();
        fs::write(&path, "[s]\na=1\nb=2\n").unwrap();
        let store = ConfigStore::load(&path).unwrap();

        store.delete_key("s", "a", true).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[s]\nb=2\n\n");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_delete_missing_targets_is_ok_and_noop() {
        let (dir, store) = load_text("[s]\na=1\n");
        let before = store.to_ini_string();

        assert!(store.delete_key("s", "zzz", false).is_ok());
        assert!(store.delete_key("nope", "a", false).is_ok());
        assert!(store.delete_section("nope", false).is_ok());
        assert_eq!(store.to_ini_string(), before);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_delete_section_removes_it() {
        let (dir, store) = load_text("[a]\nk=1\n[b]\nk=2\n");

        store.delete_section("a", false).unwrap();

        assert_eq!(store.section_names(), vec!["b".to_string()]);

        fs::remove_dir_all(&dir).ok();
    }

    // ── persist ───────────────────────────────────────────────────────────────

    #[test]
    fn test_persist_writes_canonical_layout() {
        let (dir, path) = temp_ini();
        fs::write(&path, "  [ db ]  \r\n port =5432   # listen port\r\n\r\n; dropped\r\n").unwrap();
        let store = ConfigStore::load(&path).unwrap();

        store.persist().unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[db]\nport=5432\t\t# listen port\n\n"
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_persist_fails_when_file_cannot_be_written() {
        // Arrange – remove the directory out from under the store
        let (dir, path) = temp_ini();
        let store = ConfigStore::load(&path).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        // Act
        let result = store.persist();

        // Assert
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    // ── concurrency ───────────────────────────────────────────────────────────

    #[test]
    fn test_concurrent_set_value_on_distinct_keys_loses_nothing() {
        // Arrange
        let (dir, store) = load_text("");
        let store = Arc::new(store);
        let thread_count = 16;

        // Act
        let handles: Vec<_> = (0..thread_count)
            .map(|i| {
                let s = Arc::clone(&store);
                thread::spawn(move || {
                    s.set_value("shared", &format!("key_{i}"), i).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread panicked");
        }

        // Assert
        assert_eq!(store.get_section("shared").len(), thread_count);
        for i in 0..thread_count {
            assert_eq!(store.get_value(-1, "shared", &format!("key_{i}")), i as i32);
        }

        fs::remove_dir_all(&dir).ok();
    }
}
