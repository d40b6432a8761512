//! INI document model.
//!
//! A [`Document`] is an ordered list of [`Section`]s; each section is an
//! ordered list of [`Entry`] values.  Both levels keep insertion order and
//! enforce uniqueness by name, so the serialized file comes out in the same
//! order the sections and keys were first seen.
//!
//! Lookups are linear scans over the ordered vectors.

/// One `key=value` line with its trailing comment.
///
/// `comment` is stored verbatim including its leading marker (`#` or `;`),
/// or empty when the line has no comment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub comment: String,
}

impl Entry {
    /// Creates an entry from its three parts.
    pub fn new(key: impl Into<String>, value: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            comment: comment.into(),
        }
    }
}

/// A named, ordered group of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<Entry>,
}

impl Section {
    /// Creates an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the entry for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Returns a mutable reference to the entry for `key`, if present.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.key == key)
    }

    /// Inserts `entry` at the end, or replaces the existing entry with the
    /// same key in place (value and comment both overwritten).
    pub fn upsert(&mut self, entry: Entry) {
        match self.get_mut(&entry.key) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Removes the first entry whose key is `key`.
    ///
    /// Returns `true` if an entry was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.iter().position(|e| e.key == key) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The whole parsed content of one INI file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sections in insertion order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns the section called `name`, if present.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Returns a mutable reference to the section called `name`, if present.
    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name == name)
    }

    /// Returns the section called `name`, appending an empty one first if
    /// it does not exist yet.
    pub fn section_or_insert(&mut self, name: &str) -> &mut Section {
        let idx = match self.sections.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx]
    }

    /// Returns the entry at (`section`, `key`), if present.
    pub fn entry(&self, section: &str, key: &str) -> Option<&Entry> {
        self.section(section)?.get(key)
    }

    /// Returns a mutable reference to the entry at (`section`, `key`).
    pub fn entry_mut(&mut self, section: &str, key: &str) -> Option<&mut Entry> {
        self.section_mut(section)?.get_mut(key)
    }

    /// Inserts or replaces `entry` in `section`, creating the section if needed.
    pub fn upsert(&mut self, section: &str, entry: Entry) {
        self.section_or_insert(section).upsert(entry);
    }

    /// Removes the first entry named `key` from `section`.
    ///
    /// Returns `true` if something was removed.  A missing section or key is
    /// not an error.
    pub fn remove_key(&mut self, section: &str, key: &str) -> bool {
        self.section_mut(section)
            .map(|s| s.remove(key))
            .unwrap_or(false)
    }

    /// Removes the section called `name` together with all of its entries.
    ///
    /// Returns `true` if the section existed.
    pub fn remove_section(&mut self, name: &str) -> bool {
        match self.sections.iter().position(|s| s.name == name) {
            Some(idx) => {
                self.sections.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Total number of entries across all sections.
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(Section::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
