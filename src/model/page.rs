//! Page-level layout records produced by the PDF text extractor.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in page space.
///
/// Coordinates are in points with the origin at the top-left corner of the
/// page, so `y0` is the top edge and `y1` the bottom edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box from its edges.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// A single word with its position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordRecord {
    pub text: String,
    pub bbox: BBox,
    /// Block number on the page (0-based)
    pub block: u32,
    /// Line number within the block (0-based)
    pub line: u32,
    /// Word number within the line (0-based)
    pub word_index: u32,
}

/// One visual line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub text: String,
    pub bbox: BBox,
    /// Largest font size among the spans forming the line
    pub size: f32,
    /// Whether any contributing span uses a bold font
    pub bold: bool,
}

impl LineRecord {
    /// Create a line record.
    pub fn new(text: impl Into<String>, bbox: BBox, size: f32, bold: bool) -> Self {
        Self {
            text: text.into(),
            bbox,
            size,
            bold,
        }
    }
}

/// Text layout of a single PDF page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page number (1-indexed)
    pub page_num: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Words in reading order
    pub words: Vec<WordRecord>,

    /// Lines in reading order
    pub lines: Vec<LineRecord>,
}

impl PageRecord {
    /// Create an empty page with the given dimensions.
    pub fn new(page_num: u32, width: f32, height: f32) -> Self {
        Self {
            page_num,
            width,
            height,
            words: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Create an empty page with standard Letter size (8.5 x 11 inches).
    pub fn letter(page_num: u32) -> Self {
        Self::new(page_num, 612.0, 792.0)
    }

    /// Add a line to the page.
    pub fn with_line(mut self, line: LineRecord) -> Self {
        self.lines.push(line);
        self
    }

    /// Plain text of the page, one line per row.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_union() {
        let a = BBox::new(10.0, 20.0, 50.0, 30.0);
        let b = BBox::new(40.0, 15.0, 90.0, 28.0);
        let u = a.union(&b);
        assert_eq!(u, BBox::new(10.0, 15.0, 90.0, 30.0));
        assert_eq!(u.width(), 80.0);
        assert_eq!(u.height(), 15.0);
    }

    #[test]
    fn test_page_plain_text() {
        let page = PageRecord::letter(1)
            .with_line(LineRecord::new("Title", BBox::default(), 18.0, true))
            .with_line(LineRecord::new("Body", BBox::default(), 11.0, false));
        assert_eq!(page.plain_text(), "Title\nBody");
        assert_eq!(page.width, 612.0);
    }
}
