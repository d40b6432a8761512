//! Domain entities for inistore.
//!
//! This module contains the pure in-memory model of an INI document with no
//! file system or locking concerns.
//!
//! # Why keep the model free of I/O? (for beginners)
//!
//! The rules that make the store trustworthy (section names are unique, keys
//! are unique inside a section, everything keeps insertion order) are easier
//! to get right and to test when they are plain data operations.  The parser,
//! the serializer and the store all build on these operations instead of
//! re-implementing lookups on their own.

/// Ordered sections and entries.
///
/// See [`document::Document`] for the main type.
pub mod document;
