//! # inistore-core
//!
//! Thread-safe key/value configuration storage backed by INI text files.
//!
//! This crate holds everything that concerns a single file: the in-memory
//! document model, the line parser, the serializer, value coercion, and the
//! [`ConfigStore`] that ties them together behind a lock.  The path-keyed
//! registry that shares stores between callers lives in `inistore-registry`.
//!
//! # Architecture overview (for beginners)
//!
//! An INI file is a list of named sections, each holding `key=value` lines:
//!
//! ```text
//! [db]
//! port=5432		# listen port
//! host=localhost
//!
//! [cache]
//! size=64
//! ```
//!
//! - **`domain`** – The document model: [`Document`] → [`Section`] → [`Entry`].
//!   Ordering and uniqueness rules live here.  No I/O.
//!
//! - **`format`** – How text becomes a [`Document`] and back.  The parser
//!   classifies each line (blank, comment, section header, key/value) and
//!   silently skips anything malformed; the writer emits the canonical layout.
//!
//! - **`value`** – Conversions between typed Rust values (integers, floats,
//!   `bool`, text) and the stored text form.
//!
//! - **`store`** – [`ConfigStore`]: one file, one document, one lock.  Reads
//!   and writes happen in memory; the file is only touched by
//!   [`ConfigStore::load`] and [`ConfigStore::persist`].

pub mod domain;
pub mod format;
pub mod store;
pub mod value;

// Re-export the most-used types at the crate root so callers can write
// `inistore_core::ConfigStore` instead of `inistore_core::store::ConfigStore`.
pub use domain::document::{Document, Entry, Section};
pub use format::grammar::GrammarError;
pub use format::{parse_document, render_document};
pub use store::{ConfigStore, StoreError};
pub use value::{FromIniValue, ToIniValue};
