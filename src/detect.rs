//! Content-based file type detection.
//!
//! Types are derived from magic bytes in the first [`SNIFF_LEN`] bytes of a
//! file, never from its name. Detection cannot fail: unrecognized content is
//! reported as `application/octet-stream` with an empty extension.

use crate::model::FileInfo;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of leading bytes inspected.
pub const SNIFF_LEN: usize = 261;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_ZIP: &str = "application/zip";

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// A fixed-offset magic byte signature.
struct Signature {
    offset: usize,
    magic: &'static [u8],
    mime: &'static str,
    ext: &'static str,
}

const SIGNATURES: &[Signature] = &[
    Signature { offset: 0, magic: PDF_MAGIC, mime: MIME_PDF, ext: "pdf" },
    Signature { offset: 0, magic: OLE_MAGIC, mime: MIME_DOC, ext: "doc" },
    Signature { offset: 0, magic: b"{\\rtf", mime: "application/rtf", ext: "rtf" },
    Signature { offset: 0, magic: b"\x89PNG\r\n\x1a\n", mime: "image/png", ext: "png" },
    Signature { offset: 0, magic: &[0xFF, 0xD8, 0xFF], mime: "image/jpeg", ext: "jpg" },
    Signature { offset: 0, magic: b"GIF87a", mime: "image/gif", ext: "gif" },
    Signature { offset: 0, magic: b"GIF89a", mime: "image/gif", ext: "gif" },
    Signature { offset: 0, magic: b"II*\x00", mime: "image/tiff", ext: "tif" },
    Signature { offset: 0, magic: b"MM\x00*", mime: "image/tiff", ext: "tif" },
    Signature { offset: 0, magic: &[0x1F, 0x8B, 0x08], mime: "application/gzip", ext: "gz" },
    Signature { offset: 0, magic: b"7z\xBC\xAF\x27\x1C", mime: "application/x-7z-compressed", ext: "7z" },
    Signature { offset: 0, magic: b"Rar!\x1A\x07", mime: "application/x-rar-compressed", ext: "rar" },
];

/// Identify a file by its leading bytes.
///
/// Read errors are treated like unrecognized content.
pub fn sniff_path<P: AsRef<Path>>(path: P) -> FileInfo {
    let path = path.as_ref();
    let mut head = Vec::with_capacity(SNIFF_LEN);
    let read = File::open(path).and_then(|f| f.take(SNIFF_LEN as u64).read_to_end(&mut head));
    if let Err(e) = read {
        log::debug!("Could not read {} for sniffing: {}", path.display(), e);
        return FileInfo::unknown(path);
    }
    sniff_head(path, &head)
}

/// Identify in-memory content. Only the first [`SNIFF_LEN`] bytes are used.
pub fn sniff_bytes(data: &[u8]) -> FileInfo {
    sniff_head(Path::new(""), data)
}

fn sniff_head(path: &Path, data: &[u8]) -> FileInfo {
    let head = &data[..data.len().min(SNIFF_LEN)];

    let matched = if head.starts_with(ZIP_MAGIC) {
        Some(classify_zip(head))
    } else {
        SIGNATURES
            .iter()
            .find(|sig| {
                head.get(sig.offset..sig.offset + sig.magic.len()) == Some(sig.magic)
            })
            .map(|sig| (sig.mime, sig.ext))
    };

    match matched {
        Some((mime, ext)) => FileInfo {
            path: path.to_path_buf(),
            mime: mime.to_string(),
            ext: ext.to_string(),
        },
        None => FileInfo::unknown(path),
    }
}

/// Distinguish OOXML packages from plain ZIP archives.
///
/// Walks the local file headers that fit inside the sniffed window and
/// looks at the part names.
fn classify_zip(head: &[u8]) -> (&'static str, &'static str) {
    let mut offset = 0usize;
    while head.get(offset..offset + 4) == Some(ZIP_MAGIC) {
        let Some(name_len) = read_u16(head, offset + 26) else {
            break;
        };
        let Some(extra_len) = read_u16(head, offset + 28) else {
            break;
        };
        let name_start = offset + 30;
        let Some(name) = head.get(name_start..name_start + name_len as usize) else {
            break;
        };

        if name.starts_with(b"word/") {
            return (MIME_DOCX, "docx");
        }
        if name.starts_with(b"xl/") {
            return (MIME_XLSX, "xlsx");
        }
        if name.starts_with(b"ppt/") {
            return (MIME_PPTX, "pptx");
        }

        let Some(compressed) = read_u32(head, offset + 18) else {
            break;
        };
        offset = name_start + name_len as usize + extra_len as usize + compressed as usize;
    }

    (MIME_ZIP, "zip")
}

fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    data.get(at..at + 2).map(|b| u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    data.get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Read the version from a PDF header (e.g. "1.7" from "%PDF-1.7").
pub fn pdf_version(data: &[u8]) -> Option<String> {
    let version_bytes = data.get(PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN)?;
    if !data.starts_with(PDF_MAGIC) {
        return None;
    }
    let version = String::from_utf8_lossy(version_bytes).to_string();
    is_valid_version(&version).then_some(version)
}

/// Check if a version string is valid.
fn is_valid_version(version: &str) -> bool {
    if version.len() != 3 {
        return false;
    }

    let chars: Vec<char> = version.chars().collect();
    chars[0].is_ascii_digit() && chars[1] == '.' && chars[2].is_ascii_digit()
}
