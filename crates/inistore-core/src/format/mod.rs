//! Text format: parsing INI text into a [`Document`] and rendering it back.
//!
//! Output layout:
//! ```text
//! [name]
//! key=value\t\t# comment
//! key2=value2
//! <blank line>
//! ```
//! Every section is followed by exactly one blank line.  Comments are
//! separated from the value by [`COMMENT_SEPARATOR`].
//!
//! [`Document`]: crate::domain::document::Document

pub mod grammar;
pub mod parser;
pub mod writer;

pub use parser::parse_document;
pub use writer::render_document;

/// Characters that start a comment, both for whole lines and trailing comments.
pub const COMMENT_MARKERS: [char; 2] = [';', '#'];

/// Prefix added to a caller-supplied comment that has no marker of its own.
pub const DEFAULT_COMMENT_PREFIX: &str = "# ";

/// Separator written between a value and its trailing comment.
pub const COMMENT_SEPARATOR: &str = "\t\t";
