//! Error types for docsplit library.

use std::io;
use thiserror::Error;

/// Result type alias for docsplit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting, sectioning or rendering.
///
/// Unrecognized file types and unsupported formats are not errors; they
/// surface as an empty [`crate::ProcessResult`] with a note in its metadata.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The DOCX container or one of its XML parts is malformed.
    #[error("DOCX parsing error: {0}")]
    Docx(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and cannot be opened.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// No PDF text backend is usable in this build or deployment.
    #[error("No PDF backend available: enable a text backend to parse PDF documents")]
    NoPdfBackend,

    /// The rasterization library could not be loaded.
    #[error("Page renderer unavailable: {0}")]
    RenderUnavailable(String),

    /// Error during page rasterization.
    #[error("Rendering error: {0}")]
    Render(String),

    /// The configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(feature = "glyph-fallback")]
impl From<pdf_extract::OutputError> for Error {
    fn from(err: pdf_extract::OutputError) -> Self {
        Error::TextExtract(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::Docx(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Docx(err.to_string())
    }
}
