//! Paragraph records produced by the DOCX extractor.

use serde::{Deserialize, Serialize};

/// A document paragraph with its resolved style name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Concatenated run text
    pub text: String,

    /// Display name of the paragraph style (e.g. "Heading 1"), or empty
    pub style: String,
}

impl Paragraph {
    /// Create a paragraph.
    pub fn new(text: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: style.into(),
        }
    }

    /// Whether the style name marks a heading ("heading" prefix, any case).
    pub fn has_heading_style(&self) -> bool {
        self.style
            .get(..7)
            .map(|prefix| prefix.eq_ignore_ascii_case("heading"))
            .unwrap_or(false)
    }
}

/// Paragraph sequence of one DOCX document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocxContent {
    /// Body paragraphs in document order
    pub paragraphs: Vec<Paragraph>,

    /// True if any paragraph style name starts with "heading"
    pub has_heading_styles: bool,

    /// Core property `dc:title`, if set
    pub title: Option<String>,

    /// Core property `dc:creator`, if set
    pub author: Option<String>,
}

impl DocxContent {
    /// Build content from paragraphs, deriving `has_heading_styles`.
    pub fn from_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        let has_heading_styles = paragraphs.iter().any(Paragraph::has_heading_style);
        Self {
            paragraphs,
            has_heading_styles,
            title: None,
            author: None,
        }
    }
}
