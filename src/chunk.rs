//! Character-bounded chunking with overlap.
//!
//! Each section's title and body are cut into pieces of at most
//! `max_chars` characters. A window whose right edge falls inside the text
//! is pulled back to the last space in its second half, so words are not
//! split unless a very long run of non-space text forces it. Consecutive
//! pieces share `overlap_chars` characters of context.

use serde::{Deserialize, Serialize};

use crate::model::{Chunk, ChunkMetadata, ProcessResult, Section};

/// Default upper bound on piece length, in characters.
pub const DEFAULT_MAX_CHARS: usize = 1500;

/// Default number of characters repeated between neighbouring pieces.
pub const DEFAULT_OVERLAP_CHARS: usize = 200;

/// Chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkOptions {
    /// Maximum characters per piece (0 = whole text as one piece)
    pub max_chars: usize,

    /// Characters re-included at the start of the next piece
    pub overlap_chars: usize,
}

impl ChunkOptions {
    /// Create chunk options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum piece length.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Set the overlap between pieces.
    pub fn with_overlap(mut self, overlap_chars: usize) -> Self {
        self.overlap_chars = overlap_chars;
        self
    }

    /// Emit each section as a single piece.
    pub fn passthrough(mut self) -> Self {
        self.max_chars = 0;
        self
    }
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            overlap_chars: DEFAULT_OVERLAP_CHARS,
        }
    }
}

/// Split text into trimmed, non-empty pieces.
///
/// Lengths are counted in characters, not bytes. Every piece is a
/// substring of `text` and no piece is longer than `max_chars`.
pub fn chunk_text(text: &str, options: &ChunkOptions) -> Vec<String> {
    if options.max_chars == 0 {
        let trimmed = text.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let max = options.max_chars;
    let mut pieces = Vec::new();
    let mut start = 0usize;

    while start < len {
        let mut end = (start + max).min(len);

        if end < len {
            let floor = start + max / 2;
            if let Some(space) = (start..end).rev().find(|&i| chars[i] == ' ') {
                if space > floor {
                    end = space;
                }
            }
        }

        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }

        if end >= len {
            break;
        }

        // Without overlap the next window starts at `end`, so no character
        // between pieces is lost
        let next = end.saturating_sub(options.overlap_chars);
        start = if next > start { next } else { start + 1 };
    }

    pieces
}

/// Chunk one section, numbering pieces from `first_index`.
pub fn chunk_section(
    document_id: &str,
    section: &Section,
    first_index: usize,
    options: &ChunkOptions,
) -> Vec<Chunk> {
    let metadata = ChunkMetadata::from(section);
    chunk_text(&section.chunk_source(), options)
        .into_iter()
        .enumerate()
        .map(|(j, text)| Chunk {
            document_id: document_id.to_string(),
            chunk_id: format!("{}_c{}", section.section_id, j + 1),
            source_section_id: section.section_id.clone(),
            chunk_index: first_index + j,
            text,
            metadata: metadata.clone(),
        })
        .collect()
}

/// Chunk a section sequence with document-wide indices.
pub fn chunk_sections(
    document_id: &str,
    sections: &[Section],
    options: &ChunkOptions,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for section in sections {
        let next = chunks.len();
        chunks.extend(chunk_section(document_id, section, next, options));
    }
    log::debug!(
        "Chunked {} sections into {} chunks (max {}, overlap {})",
        sections.len(),
        chunks.len(),
        options.max_chars,
        options.overlap_chars
    );
    chunks
}

/// Chunk every section of a pipeline result.
pub fn chunk_result(result: &ProcessResult, options: &ChunkOptions) -> Vec<Chunk> {
    chunk_sections(&result.document_id, &result.sections, options)
}
