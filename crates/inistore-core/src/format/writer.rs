//! Serializer: renders a [`Document`] in the canonical layout.

use super::COMMENT_SEPARATOR;
use crate::domain::document::{Document, Entry};

/// Renders `doc` as INI text.
///
/// Sections appear in document order, each as a `[name]` header followed by
/// its entries and one blank line.  An empty document renders as `""`.
///
/// # Examples
///
/// ```rust
/// use inistore_core::{Document, Entry};
/// use inistore_core::format::render_document;
///
/// let mut doc = Document::new();
/// doc.upsert("db", Entry::new("port", "5432", "# listen port"));
/// assert_eq!(render_document(&doc), "[db]\nport=5432\t\t# listen port\n\n");
/// ```
pub fn render_document(doc: &Document) -> String {
    let mut out = String::new();
    for section in doc.sections() {
        out.push('[');
        out.push_str(section.name());
        out.push_str("]\n");
        for entry in section.entries() {
            write_entry(&mut out, entry);
        }
        out.push('\n');
    }
    out
}

fn write_entry(out: &mut String, entry: &Entry) {
    out.push_str(&entry.key);
    out.push('=');
    out.push_str(&entry.value);
    if !entry.comment.is_empty() {
        out.push_str(COMMENT_SEPARATOR);
        out.push_str(&entry.comment);
    }
    out.push('\n');
}
