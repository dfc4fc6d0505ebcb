//! Heading-driven sectionization.
//!
//! Both variants scan their records once, carrying the currently open
//! section and the sections emitted so far. A heading closes the open
//! section and opens the next one.

mod docx;
mod pdf;

pub use docx::{level_from_style, sectionize_docx};
pub use pdf::{
    sectionize_pdf, size_threshold, PDF_HEADING_LEVEL, PREAMBLE_LEVEL, PREAMBLE_TITLE,
};
