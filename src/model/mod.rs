//! Data model shared by the extractors, sectionizers and chunker.
//!
//! Every value is created fresh per pipeline run and handed to the caller;
//! nothing here holds state between documents.

mod document;
mod page;
mod paragraph;
mod resource;
mod section;

pub use document::{FileInfo, ProcessResult, OCTET_STREAM};
pub use page::{BBox, LineRecord, PageRecord, WordRecord};
pub use paragraph::{DocxContent, Paragraph};
pub use resource::RenderedPage;
pub use section::{Chunk, ChunkMetadata, Section, BODY_LEVEL, MAX_HEADING_LEVEL};

pub(crate) use section::SectionIds;
