//! # docsplit
//!
//! Structural sectioning and chunking of DOCX and PDF documents for
//! retrieval indexing.
//!
//! A document is sniffed by its leading bytes, routed to a format-specific
//! extractor, split into heading-driven [`Section`]s and finally cut into
//! bounded, overlapping [`Chunk`]s.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docsplit::{chunk_result, process_file, ChunkOptions};
//!
//! fn main() -> docsplit::Result<()> {
//!     let result = process_file("doc-42", "report.docx")?;
//!     for section in &result.sections {
//!         println!("[{}] {}", section.level, section.title);
//!     }
//!
//!     let chunks = chunk_result(&result, &ChunkOptions::default());
//!     println!("{} chunks", chunks.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Content-based detection**: magic-byte sniffing, never trusting names
//! - **DOCX**: paragraph styles drive the section hierarchy
//! - **PDF**: font size and weight drive the section hierarchy, with an
//!   ordered list of text backends and automatic fallback
//! - **Chunking**: word-boundary snapping with configurable overlap
//! - **Page rendering**: PNG rasterization through pdfium (`render` feature)
//! - **Parallel processing**: Uses Rayon for document batches

pub mod chunk;
pub mod config;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod section;

// Re-export commonly used types
pub use chunk::{chunk_result, chunk_sections, chunk_text, ChunkOptions};
pub use config::{Config, Settings};
pub use detect::{sniff_bytes, sniff_path};
pub use error::{Error, Result};
pub use model::{
    BBox, Chunk, ChunkMetadata, DocxContent, FileInfo, LineRecord, PageRecord, Paragraph,
    ProcessResult, RenderedPage, Section, WordRecord,
};
pub use parser::{PdfTextExtractor, TextBackend};
pub use pipeline::{process_bytes, process_file, DocumentKind, Pipeline};
pub use render::{render_pages, PageSelection, RenderOptions};
pub use section::{level_from_style, sectionize_docx, sectionize_pdf};

use std::path::{Path, PathBuf};

use rayon::prelude::*;

/// Process many files in parallel, one independent pipeline per document.
///
/// Each entry is `(document_id, path)`. Results keep the input order; a
/// failing document does not affect the others.
///
/// # Example
///
/// ```no_run
/// use docsplit::process_files;
///
/// let inputs = vec![
///     ("a".to_string(), "a.pdf".into()),
///     ("b".to_string(), "b.docx".into()),
/// ];
/// for result in process_files(&inputs) {
///     match result {
///         Ok(r) => println!("{}: {} sections", r.document_id, r.sections.len()),
///         Err(e) => eprintln!("failed: {}", e),
///     }
/// }
/// ```
pub fn process_files(inputs: &[(String, PathBuf)]) -> Vec<Result<ProcessResult>> {
    let pipeline = Pipeline::new();
    inputs
        .par_iter()
        .map(|(id, path)| pipeline.process_file(id, path))
        .collect()
}

/// Process a file on tokio's blocking pool.
#[cfg(feature = "async")]
pub async fn process_file_async(
    document_id: impl Into<String>,
    path: impl Into<PathBuf>,
) -> Result<ProcessResult> {
    let document_id = document_id.into();
    let path = path.into();
    tokio::task::spawn_blocking(move || process_file(&document_id, path))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(format!("Task join error: {e}"))))?
}

/// Builder bundling chunking and rendering settings with a pipeline.
///
/// # Example
///
/// ```no_run
/// use docsplit::Docsplit;
///
/// let chunks = Docsplit::new()
///     .with_max_chars(800)
///     .with_overlap(100)
///     .process("doc-1", "manual.pdf")?
///     .chunks();
/// # Ok::<(), docsplit::Error>(())
/// ```
pub struct Docsplit {
    settings: Settings,
    pipeline: Pipeline,
}

impl Docsplit {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            pipeline: Pipeline::new(),
        }
    }

    /// Create a builder from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            settings: config.settings(),
            pipeline: Pipeline::new(),
        }
    }

    /// Set the maximum chunk length in characters.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.settings.chunk = self.settings.chunk.with_max_chars(max_chars);
        self
    }

    /// Set the overlap between consecutive chunks.
    pub fn with_overlap(mut self, overlap_chars: usize) -> Self {
        self.settings.chunk = self.settings.chunk.with_overlap(overlap_chars);
        self
    }

    /// Set the rendering resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.settings.render = self.settings.render.with_dpi(dpi);
        self
    }

    /// Use a custom PDF text extractor.
    pub fn with_pdf_extractor(mut self, extractor: PdfTextExtractor) -> Self {
        self.pipeline = Pipeline::with_pdf_extractor(extractor);
        self
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Process a file on disk.
    pub fn process<P: AsRef<Path>>(&self, document_id: &str, path: P) -> Result<DocsplitResult> {
        let result = self.pipeline.process_file(document_id, path)?;
        Ok(self.wrap(result))
    }

    /// Process an in-memory upload.
    pub fn process_bytes(&self, document_id: &str, name_hint: &str, data: &[u8]) -> Result<DocsplitResult> {
        let result = self.pipeline.process_bytes(document_id, name_hint, data)?;
        Ok(self.wrap(result))
    }

    /// Render the pages of a PDF with the configured resolution.
    pub fn render<P: AsRef<Path>>(&self, path: P) -> Result<Vec<RenderedPage>> {
        render::render_pages(path, &self.settings.render)
    }

    fn wrap(&self, result: ProcessResult) -> DocsplitResult {
        DocsplitResult {
            result,
            chunk_options: self.settings.chunk,
        }
    }
}

impl Default for Docsplit {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of processing a document with [`Docsplit`].
pub struct DocsplitResult {
    /// The pipeline result
    pub result: ProcessResult,
    chunk_options: ChunkOptions,
}

impl DocsplitResult {
    /// Sections in emission order.
    pub fn sections(&self) -> &[Section] {
        &self.result.sections
    }

    /// Chunk all sections with the builder's chunk settings.
    pub fn chunks(&self) -> Vec<Chunk> {
        chunk_result(&self.result, &self.chunk_options)
    }

    /// Take the pipeline result.
    pub fn into_inner(self) -> ProcessResult {
        self.result
    }
}
