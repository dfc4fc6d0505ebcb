//! Format-specific structural extraction.
//!
//! DOCX yields styled paragraphs; PDF yields positioned lines per page.

pub mod docx;
pub mod pdf;

pub use docx::{extract_docx_bytes, extract_docx_file, extract_docx_reader};
pub use pdf::{
    extract_pdf_bytes, extract_pdf_file, read_pdf_info, LayoutBackend, PdfInfo, PdfText,
    PdfTextExtractor, TextBackend,
};
#[cfg(feature = "glyph-fallback")]
pub use pdf::GlyphBackend;
