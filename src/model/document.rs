//! Document-level types.

use super::Section;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// MIME type reported when no signature matches.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Content-derived type of an input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Path the bytes were read from (empty for in-memory input)
    pub path: PathBuf,

    /// Detected MIME type
    pub mime: String,

    /// Canonical extension without the dot, or empty
    pub ext: String,
}

impl FileInfo {
    /// File info for unrecognized content.
    pub fn unknown(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mime: OCTET_STREAM.to_string(),
            ext: String::new(),
        }
    }

    /// Whether detection failed.
    pub fn is_unknown(&self) -> bool {
        self.mime == OCTET_STREAM
    }
}

/// Result of running one document through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Caller-supplied identifier, not interpreted
    pub document_id: String,

    /// Detected MIME type
    pub mime: String,

    /// Sections in emission order
    pub sections: Vec<Section>,

    /// Extraction details (path, mime, ext, notes, document properties)
    pub meta: BTreeMap<String, Value>,
}

impl ProcessResult {
    /// Create an empty result.
    pub fn new(document_id: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            mime: mime.into(),
            sections: Vec::new(),
            meta: BTreeMap::new(),
        }
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Whether nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Explanatory note for empty results, if any.
    pub fn note(&self) -> Option<&str> {
        self.meta.get("note").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_file_info() {
        let info = FileInfo::unknown("/tmp/x.bin");
        assert_eq!(info.mime, "application/octet-stream");
        assert_eq!(info.ext, "");
        assert!(info.is_unknown());
    }

    #[test]
    fn test_result_note() {
        let mut result = ProcessResult::new("doc_1", OCTET_STREAM);
        assert!(result.is_empty());
        assert_eq!(result.note(), None);
        result
            .meta
            .insert("note".into(), Value::from("Unsupported MIME"));
        assert_eq!(result.note(), Some("Unsupported MIME"));
    }
}
