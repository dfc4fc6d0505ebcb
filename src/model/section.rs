//! Sections and chunks.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Level assigned to body text and unclassified content.
pub const BODY_LEVEL: u8 = 7;

/// Deepest heading level.
pub const MAX_HEADING_LEVEL: u8 = 6;

/// A titled, leveled span of document text with its page range.
///
/// Sections form a flat sequence; hierarchy is expressed only through
/// `level` (1 = most significant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Unique id within one run ("sec_1", "sec_2", ...)
    pub section_id: String,

    /// Heading level, 1-7
    pub level: u8,

    /// Section title
    pub title: String,

    /// Accumulated body text, newline-joined
    pub text: String,

    /// First page (1-indexed)
    pub page_start: u32,

    /// Last page, never below `page_start`
    pub page_end: u32,

    /// Free-form cross references
    #[serde(default)]
    pub related: BTreeMap<String, Value>,
}

impl Section {
    /// Open a section on a single page.
    pub fn new(
        section_id: impl Into<String>,
        level: u8,
        title: impl Into<String>,
        page: u32,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            level,
            title: title.into(),
            text: String::new(),
            page_start: page,
            page_end: page,
            related: BTreeMap::new(),
        }
    }

    /// Append a line of body text.
    pub fn push_text(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(line);
    }

    /// Extend the page range to cover `page`.
    pub fn extend_to_page(&mut self, page: u32) {
        self.page_end = self.page_end.max(page);
    }

    /// Text fed to the chunker: title, blank line, body.
    pub fn chunk_source(&self) -> String {
        if self.text.is_empty() {
            self.title.clone()
        } else {
            format!("{}\n\n{}", self.title, self.text).trim().to_string()
        }
    }
}

/// Monotonic section id generator ("sec_1", "sec_2", ...).
#[derive(Debug, Default)]
pub(crate) struct SectionIds {
    next: u32,
}

impl SectionIds {
    pub(crate) fn next_id(&mut self) -> String {
        self.next += 1;
        format!("sec_{}", self.next)
    }
}

/// Metadata copied from the source section onto each chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub level: u8,
    pub title: String,
    pub page_start: u32,
    pub page_end: u32,
    #[serde(default)]
    pub related: BTreeMap<String, Value>,
}

impl From<&Section> for ChunkMetadata {
    fn from(section: &Section) -> Self {
        Self {
            level: section.level,
            title: section.title.clone(),
            page_start: section.page_start,
            page_end: section.page_end,
            related: section.related.clone(),
        }
    }
}

/// A bounded piece of section text, ready for indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Document the chunk belongs to
    pub document_id: String,

    /// Stable id: "{section_id}_c{n}" with n starting at 1
    pub chunk_id: String,

    /// Section the text was cut from
    pub source_section_id: String,

    /// Zero-based position across the whole document
    pub chunk_index: usize,

    /// Trimmed, non-empty text
    pub text: String,

    pub metadata: ChunkMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_text_joins_with_newline() {
        let mut section = Section::new("sec_1", 2, "Title", 1);
        section.push_text("first");
        section.push_text("second");
        assert_eq!(section.text, "first\nsecond");
    }

    #[test]
    fn test_extend_to_page_never_shrinks() {
        let mut section = Section::new("sec_1", 2, "Title", 3);
        section.extend_to_page(5);
        section.extend_to_page(4);
        assert_eq!((section.page_start, section.page_end), (3, 5));
    }

    #[test]
    fn test_chunk_source() {
        let mut section = Section::new("sec_1", 1, "Intro", 1);
        assert_eq!(section.chunk_source(), "Intro");
        section.push_text("Hello world.");
        assert_eq!(section.chunk_source(), "Intro\n\nHello world.");
    }

    #[test]
    fn test_section_ids_are_monotonic() {
        let mut ids = SectionIds::default();
        assert_eq!(ids.next_id(), "sec_1");
        assert_eq!(ids.next_id(), "sec_2");
    }
}
