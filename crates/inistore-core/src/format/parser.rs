//! Line-oriented INI parser.
//!
//! Each line is trimmed and classified on its own ([`classify_line`]), then
//! applied to the document being built.  The only state carried between
//! lines is the current section.
//!
//! Parsing never fails.  Lines that fit none of the recognised shapes, and
//! key/value lines that appear before the first section header, are skipped
//! and reported at TRACE level so they can be diagnosed without changing
//! what gets loaded.

use tracing::trace;

use super::grammar::{is_comment_line, parse_section_header, trim_ini};
use super::COMMENT_MARKERS;
use crate::domain::document::{Document, Entry};

/// The shape of one trimmed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    Comment,
    /// A well-formed `[name]` header.
    Section(&'a str),
    /// A `key = value  # comment` line.  `comment` keeps its marker.
    KeyValue {
        key: &'a str,
        value: &'a str,
        comment: &'a str,
    },
    /// Anything else, with a short reason for diagnostics.
    Malformed(&'static str),
}

/// Classifies a single raw line.
///
/// The line is trimmed of spaces, tabs, `\r` and `\n` first, so CRLF input
/// is handled here.
pub fn classify_line(raw: &str) -> Line<'_> {
    let line = trim_ini(raw);

    if line.is_empty() {
        return Line::Blank;
    }
    if is_comment_line(line) {
        return Line::Comment;
    }
    if let Some(name) = parse_section_header(line) {
        return Line::Section(name);
    }
    if line.starts_with('[') && line.ends_with(']') {
        return Line::Malformed("bracketed line is not a valid section header");
    }

    let Some(eq) = line.find('=') else {
        return Line::Malformed("no '=' separator");
    };
    let key_part = &line[..eq];
    if key_part.contains(COMMENT_MARKERS) {
        return Line::Malformed("comment marker before '='");
    }
    let key = trim_ini(key_part);
    if key.is_empty() {
        return Line::Malformed("empty key");
    }

    let rest = &line[eq + 1..];
    let (value, comment) = match rest.find(COMMENT_MARKERS) {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };

    Line::KeyValue {
        key,
        value: trim_ini(value),
        comment: trim_ini(comment),
    }
}

/// Parses INI text into a [`Document`].
///
/// Later duplicates of a key within one section replace the earlier entry
/// (value and comment) while keeping its position.  Repeated headers for the
/// same section reopen it rather than creating a second one.
///
/// # Examples
///
/// ```rust
/// use inistore_core::format::parse_document;
///
/// let doc = parse_document("[db]\nport = 5432 # listen port\n");
/// let entry = doc.entry("db", "port").unwrap();
/// assert_eq!(entry.value, "5432");
/// assert_eq!(entry.comment, "# listen port");
/// ```
pub fn parse_document(text: &str) -> Document {
    let mut doc = Document::new();
    let mut current: Option<&str> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        match classify_line(raw) {
            Line::Blank | Line::Comment => {}
            Line::Section(name) => {
                doc.section_or_insert(name);
                current = Some(name);
            }
            Line::KeyValue { key, value, comment } => match current {
                Some(section) => doc.upsert(section, Entry::new(key, value, comment)),
                None => trace!(line = line_no, key, "skipping key/value line outside any section"),
            },
            Line::Malformed(reason) => trace!(line = line_no, reason, "skipping malformed line"),
        }
    }

    doc
}
