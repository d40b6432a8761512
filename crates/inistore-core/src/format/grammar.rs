//! Lexical rules shared by the parser and the store's write path.
//!
//! ```text
//! section name : [A-Za-z_][A-Za-z_0-9\- ]*   (no trailing space)
//! key name     : [A-Za-z_][A-Za-z_0-9.]*
//! header line  : '[' [ \t]* name [ \t]* ']'
//! ```
//!
//! The parser only applies the header rule; keys read from a file are taken
//! as written.  Names supplied through the store API are checked with
//! [`validate_section_name`] and [`validate_key_name`] before anything is
//! mutated.  Values and comments go through [`validate_value`] and
//! [`validate_comment`]: a line break in either would split the written line.

use thiserror::Error;

use super::{COMMENT_MARKERS, DEFAULT_COMMENT_PREFIX};

/// Rejections for caller-supplied names, values and comments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// The section name does not match `[A-Za-z_][A-Za-z_0-9\- ]*` or ends in a space.
    #[error("invalid section name: {0:?}")]
    InvalidSection(String),

    /// The key name does not match `[A-Za-z_][A-Za-z_0-9.]*`.
    #[error("invalid key name: {0:?}")]
    InvalidKey(String),

    /// The value text contains `\r` or `\n`.
    #[error("invalid value: {0:?}")]
    InvalidValue(String),

    /// The comment text contains `\r` or `\n`.
    #[error("invalid comment: {0:?}")]
    InvalidComment(String),
}

/// Trims spaces, tabs, carriage returns and line feeds from both ends.
///
/// Narrower than [`str::trim`]: other Unicode whitespace is kept.
pub fn trim_ini(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

/// Returns `true` if an already-trimmed line is a standalone comment.
pub fn is_comment_line(line: &str) -> bool {
    line.starts_with(COMMENT_MARKERS)
}

/// Extracts the section name from an already-trimmed header line.
///
/// Returns `None` if the line is not a well-formed header.  Surrounding
/// blanks inside the brackets are dropped from the returned name.
pub fn parse_section_header(line: &str) -> Option<&str> {
    if line.len() < 3 {
        return None;
    }
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let rest = inner.trim_start_matches([' ', '\t']);

    let name_end = rest
        .char_indices()
        .find(|&(_, c)| !is_section_char(c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let (name, tail) = rest.split_at(name_end);

    if !tail.chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }
    if !name.chars().next().is_some_and(is_name_start) {
        return None;
    }
    Some(name.trim_end_matches(' '))
}

/// Checks a caller-supplied section name.
///
/// # Errors
///
/// Returns [`GrammarError::InvalidSection`] if the name is empty, starts
/// with a character other than a letter or `_`, contains characters outside
/// `[A-Za-z_0-9- ]`, or ends with a space.
pub fn validate_section_name(name: &str) -> Result<(), GrammarError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(is_name_start)
        && chars.all(is_section_char)
        && !name.ends_with(' ');
    if valid {
        Ok(())
    } else {
        Err(GrammarError::InvalidSection(name.to_string()))
    }
}

/// Checks a caller-supplied key name.
///
/// # Errors
///
/// Returns [`GrammarError::InvalidKey`] if the name is empty, starts with a
/// character other than a letter or `_`, or contains characters outside
/// `[A-Za-z_0-9.]`.
pub fn validate_key_name(name: &str) -> Result<(), GrammarError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(is_name_start) && chars.all(is_key_char);
    if valid {
        Ok(())
    } else {
        Err(GrammarError::InvalidKey(name.to_string()))
    }
}

/// Checks value text before it is stored.
///
/// A `#` or `;` is accepted here, but on the next load everything from the
/// first marker onwards is read back as the entry's comment.
///
/// # Errors
///
/// Returns [`GrammarError::InvalidValue`] if the text contains a line break.
pub fn validate_value(value: &str) -> Result<(), GrammarError> {
    if has_line_break(value) {
        Err(GrammarError::InvalidValue(value.to_string()))
    } else {
        Ok(())
    }
}

/// Checks a caller-supplied comment.
///
/// # Errors
///
/// Returns [`GrammarError::InvalidComment`] if the text contains a line break
/// anywhere other than at its ends (those are trimmed by
/// [`normalize_comment`]).
pub fn validate_comment(comment: &str) -> Result<(), GrammarError> {
    if has_line_break(trim_ini(comment)) {
        Err(GrammarError::InvalidComment(comment.to_string()))
    } else {
        Ok(())
    }
}

/// Trims a caller-supplied comment and gives it a marker if it has none.
///
/// `"listen port"` becomes `"# listen port"`; `"; legacy"` and `""` are
/// returned trimmed but otherwise unchanged.
pub fn normalize_comment(comment: &str) -> String {
    let trimmed = trim_ini(comment);
    if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKERS) {
        trimmed.to_string()
    } else {
        format!("{DEFAULT_COMMENT_PREFIX}{trimmed}")
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\r', '\n'])
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_section_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' ')
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.')
}
