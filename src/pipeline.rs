//! Pipeline dispatch: sniff, route, extract, sectionize.
//!
//! Routing uses the sniffed MIME type first and the file name suffix second.
//! Legacy `.doc` files and unknown types are not errors; they produce an
//! empty result with a `note` in its metadata. Extraction errors propagate
//! unchanged and no partial result is returned.

use std::path::Path;

use serde_json::Value;

use crate::detect::{self, MIME_DOC, MIME_DOCX, MIME_PDF};
use crate::error::Result;
use crate::model::{DocxContent, FileInfo, ProcessResult};
use crate::parser::{self, PdfText, PdfTextExtractor};
use crate::section::{sectionize_docx, sectionize_pdf};

/// MIME type some uploaders report for DOCX files.
pub const MIME_ZIP_COMPRESSED: &str = "application/x-zip-compressed";

/// Note attached to legacy Word documents.
pub const LEGACY_DOC_NOTE: &str = "Legacy .doc normalization to .docx required before extraction";

/// Processing path selected for an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Docx,
    Pdf,
    LegacyDoc,
    Unsupported,
}

impl DocumentKind {
    /// Route by detected MIME type, then by the name's suffix.
    pub fn route(info: &FileInfo, name: &str) -> Self {
        let name = name.to_lowercase();
        let mime = info.mime.as_str();

        if mime == MIME_DOCX || mime == MIME_ZIP_COMPRESSED || name.ends_with(".docx") {
            DocumentKind::Docx
        } else if mime == MIME_PDF || name.ends_with(".pdf") {
            DocumentKind::Pdf
        } else if mime == MIME_DOC || name.ends_with(".doc") {
            DocumentKind::LegacyDoc
        } else {
            DocumentKind::Unsupported
        }
    }
}

/// Document pipeline holding the PDF backend list.
pub struct Pipeline {
    pdf: PdfTextExtractor,
}

impl Pipeline {
    /// Pipeline with the default PDF backends.
    pub fn new() -> Self {
        Self {
            pdf: PdfTextExtractor::new(),
        }
    }

    /// Pipeline with a custom PDF extractor.
    pub fn with_pdf_extractor(pdf: PdfTextExtractor) -> Self {
        Self { pdf }
    }

    /// Process a file on disk.
    pub fn process_file<P: AsRef<Path>>(&self, document_id: &str, path: P) -> Result<ProcessResult> {
        let path = path.as_ref();
        let info = detect::sniff_path(path);
        let name = path.to_string_lossy();
        let kind = DocumentKind::route(&info, &name);
        let mut result = new_result(document_id, &info, &name);

        match kind {
            DocumentKind::Docx => apply_docx(&mut result, parser::extract_docx_file(path)?),
            DocumentKind::Pdf => {
                let data = std::fs::read(path)?;
                self.apply_pdf(&mut result, &data)?;
            }
            DocumentKind::LegacyDoc | DocumentKind::Unsupported => apply_note(&mut result, kind),
        }

        log_result(&result, kind);
        Ok(result)
    }

    /// Process an in-memory upload.
    ///
    /// `name_hint` is only consulted for the routing suffix and is recorded
    /// as the result's `path`.
    pub fn process_bytes(&self, document_id: &str, name_hint: &str, data: &[u8]) -> Result<ProcessResult> {
        let info = detect::sniff_bytes(data);
        let kind = DocumentKind::route(&info, name_hint);
        let mut result = new_result(document_id, &info, name_hint);

        match kind {
            DocumentKind::Docx => apply_docx(&mut result, parser::extract_docx_bytes(data)?),
            DocumentKind::Pdf => self.apply_pdf(&mut result, data)?,
            DocumentKind::LegacyDoc | DocumentKind::Unsupported => apply_note(&mut result, kind),
        }

        log_result(&result, kind);
        Ok(result)
    }

    fn apply_pdf(&self, result: &mut ProcessResult, data: &[u8]) -> Result<()> {
        let PdfText { pages, backend } = self.pdf.extract(data)?;

        result.meta.insert("page_count".into(), Value::from(pages.len()));
        result.meta.insert("backend".into(), Value::from(backend));
        if let Some(version) = detect::pdf_version(data) {
            result.meta.insert("pdf_version".into(), Value::from(version));
        }

        // Document properties are optional; a text backend may succeed
        // where the Info dictionary cannot be read.
        match parser::read_pdf_info(data) {
            Ok(info) => {
                insert_opt(result, "title", info.title);
                insert_opt(result, "author", info.author);
                insert_opt(result, "created", info.created.map(|c| c.to_rfc3339()));
            }
            Err(e) => log::debug!("PDF document info unavailable: {}", e),
        }

        result.sections = sectionize_pdf(&pages);
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn new_result(document_id: &str, info: &FileInfo, path: &str) -> ProcessResult {
    let mut result = ProcessResult::new(document_id, info.mime.clone());
    result.meta.insert("path".into(), Value::from(path));
    result.meta.insert("mime".into(), Value::from(info.mime.as_str()));
    result.meta.insert("ext".into(), Value::from(info.ext.as_str()));
    result
}

fn apply_docx(result: &mut ProcessResult, content: DocxContent) {
    result
        .meta
        .insert("has_heading_styles".into(), Value::from(content.has_heading_styles));
    insert_opt(result, "title", content.title);
    insert_opt(result, "author", content.author);
    result.sections = sectionize_docx(&content.paragraphs);
}

fn apply_note(result: &mut ProcessResult, kind: DocumentKind) {
    let note = match kind {
        DocumentKind::LegacyDoc => LEGACY_DOC_NOTE.to_string(),
        _ => format!("Unsupported MIME: {}", result.mime),
    };
    log::info!("{}: {}", result.document_id, note);
    result.meta.insert("note".into(), Value::from(note));
}

fn insert_opt(result: &mut ProcessResult, key: &str, value: Option<String>) {
    if let Some(value) = value {
        result.meta.insert(key.to_string(), Value::from(value));
    }
}

fn log_result(result: &ProcessResult, kind: DocumentKind) {
    log::debug!(
        "{}: {:?} ({}) -> {} sections",
        result.document_id,
        kind,
        result.mime,
        result.sections.len()
    );
}

/// Process a file with the default pipeline.
pub fn process_file<P: AsRef<Path>>(document_id: &str, path: P) -> Result<ProcessResult> {
    Pipeline::new().process_file(document_id, path)
}

/// Process in-memory bytes with the default pipeline.
pub fn process_bytes(document_id: &str, name_hint: &str, data: &[u8]) -> Result<ProcessResult> {
    Pipeline::new().process_bytes(document_id, name_hint, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{BBox, LineRecord, PageRecord};
    use crate::parser::TextBackend;

    fn info(mime: &str) -> FileInfo {
        FileInfo {
            path: "".into(),
            mime: mime.to_string(),
            ext: String::new(),
        }
    }

    #[test]
    fn test_route_by_mime() {
        assert_eq!(DocumentKind::route(&info(MIME_DOCX), "upload"), DocumentKind::Docx);
        assert_eq!(DocumentKind::route(&info(MIME_ZIP_COMPRESSED), ""), DocumentKind::Docx);
        assert_eq!(DocumentKind::route(&info(MIME_PDF), "a.docx.bin"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::route(&info(MIME_DOC), ""), DocumentKind::LegacyDoc);
        assert_eq!(DocumentKind::route(&info("image/png"), "x.png"), DocumentKind::Unsupported);
    }

    #[test]
    fn test_route_by_suffix() {
        let zip = info(detect::MIME_ZIP);
        assert_eq!(DocumentKind::route(&zip, "Report.DOCX"), DocumentKind::Docx);
        assert_eq!(DocumentKind::route(&zip, "archive.zip"), DocumentKind::Unsupported);

        let unknown = FileInfo::unknown("");
        assert_eq!(DocumentKind::route(&unknown, "scan.pdf"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::route(&unknown, "old.doc"), DocumentKind::LegacyDoc);
        assert_eq!(DocumentKind::route(&unknown, "notes.txt"), DocumentKind::Unsupported);
    }

    #[test]
    fn test_unsupported_bytes_yield_note() {
        let result = process_bytes("doc_1", "notes.txt", b"plain text").unwrap();
        assert!(result.is_empty());
        assert_eq!(result.mime, "application/octet-stream");
        assert_eq!(result.note(), Some("Unsupported MIME: application/octet-stream"));
        assert_eq!(result.meta["path"], "notes.txt");
        assert_eq!(result.meta["ext"], "");
    }

    #[test]
    fn test_legacy_doc_yields_note() {
        let mut data = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        data.resize(512, 0);
        let result = process_bytes("doc_2", "old", &data).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.mime, MIME_DOC);
        assert_eq!(result.note(), Some(LEGACY_DOC_NOTE));
    }

    struct Canned;

    impl TextBackend for Canned {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn extract(&self, _data: &[u8]) -> Result<Vec<PageRecord>> {
            Ok(vec![PageRecord::letter(1)
                .with_line(LineRecord::new("Overview", BBox::default(), 18.0, true))
                .with_line(LineRecord::new("Body text.", BBox::default(), 9.0, false))
                .with_line(LineRecord::new("Summary", BBox::default(), 18.0, true))
                .with_line(LineRecord::new("More.", BBox::default(), 10.0, false))])
        }
    }

    #[test]
    fn test_pdf_route_uses_extractor() {
        let pipeline = Pipeline::with_pdf_extractor(PdfTextExtractor::with_backends(vec![Box::new(Canned)]));
        let result = pipeline.process_bytes("doc_3", "x.pdf", b"%PDF-1.4\n").unwrap();

        assert_eq!(result.mime, MIME_PDF);
        assert_eq!(result.meta["backend"], "canned");
        assert_eq!(result.meta["page_count"], 1);
        assert_eq!(result.meta["pdf_version"], "1.4");
        assert_eq!(result.sections.len(), 2);
        assert_eq!(result.sections[0].title, "Overview");
        assert_eq!(result.sections[0].text, "Body text.");
        assert_eq!(result.sections[1].title, "Summary");
        assert_eq!(result.sections[1].text, "More.");
    }

    #[test]
    fn test_no_backend_propagates() {
        let pipeline = Pipeline::with_pdf_extractor(PdfTextExtractor::with_backends(Vec::new()));
        let err = pipeline.process_bytes("doc_4", "x.pdf", b"%PDF-1.7\n").unwrap_err();
        assert!(matches!(err, Error::NoPdfBackend));
    }

    #[test]
    fn test_malformed_docx_propagates() {
        let err = process_bytes("doc_5", "broken.docx", b"not a zip").unwrap_err();
        assert!(matches!(err, Error::Docx(_) | Error::Io(_)));
    }
}
