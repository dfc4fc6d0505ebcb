//! PDF text extraction.
//!
//! Text comes from an ordered list of [`TextBackend`]s. The first backend
//! that is available and recovers text wins; a backend that fails, or finds
//! no text at all, hands over to the next one. Only when no backend can run
//! at all does extraction fail with [`Error::NoPdfBackend`].

mod backend;
#[cfg(feature = "glyph-fallback")]
mod glyph;
mod info;
mod layout;

pub use backend::TextBackend;
#[cfg(feature = "glyph-fallback")]
pub use glyph::GlyphBackend;
pub use info::{read_pdf_info, PdfInfo};
pub use layout::LayoutBackend;

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::PageRecord;

/// Pages extracted from a PDF, with the backend that produced them.
#[derive(Debug, Clone)]
pub struct PdfText {
    pub pages: Vec<PageRecord>,
    pub backend: &'static str,
}

/// PDF text extractor with backend fallback.
pub struct PdfTextExtractor {
    backends: Vec<Box<dyn TextBackend>>,
}

impl PdfTextExtractor {
    /// Extractor with the default backend order: layout, then glyph.
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut backends: Vec<Box<dyn TextBackend>> = vec![Box::new(LayoutBackend)];
        #[cfg(feature = "glyph-fallback")]
        backends.push(Box::new(GlyphBackend));
        Self { backends }
    }

    /// Extractor trying the given backends in order.
    pub fn with_backends(backends: Vec<Box<dyn TextBackend>>) -> Self {
        Self { backends }
    }

    /// Names of the configured backends, in order.
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Extract pages from PDF bytes.
    ///
    /// A backend that succeeds without recovering any text line also hands
    /// over; its pages are returned only if no later backend does better.
    pub fn extract(&self, data: &[u8]) -> Result<PdfText> {
        let mut last_error = None;
        let mut blank: Option<PdfText> = None;

        for backend in self.backends.iter().filter(|b| b.is_available()) {
            match backend.extract(data) {
                Ok(pages) if pages.iter().all(|p| p.lines.is_empty()) => {
                    log::debug!("PDF backend {} recovered no text", backend.name());
                    blank.get_or_insert(PdfText {
                        pages,
                        backend: backend.name(),
                    });
                }
                Ok(pages) => {
                    log::debug!("PDF: {} pages via {} backend", pages.len(), backend.name());
                    return Ok(PdfText {
                        pages,
                        backend: backend.name(),
                    });
                }
                Err(e) => {
                    log::warn!("PDF backend {} failed: {}", backend.name(), e);
                    last_error = Some(e);
                }
            }
        }

        match blank {
            Some(text) => Ok(text),
            None => Err(last_error.unwrap_or(Error::NoPdfBackend)),
        }
    }

    /// Extract pages from a PDF file.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<PdfText> {
        let data = std::fs::read(path)?;
        self.extract(&data)
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract pages from a PDF file with the default backends.
pub fn extract_pdf_file<P: AsRef<Path>>(path: P) -> Result<PdfText> {
    PdfTextExtractor::new().extract_file(path)
}

/// Extract pages from PDF bytes with the default backends.
pub fn extract_pdf_bytes(data: &[u8]) -> Result<PdfText> {
    PdfTextExtractor::new().extract(data)
}
