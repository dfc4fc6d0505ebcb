//! Document-level PDF properties from the trailer's Info dictionary.

use chrono::{DateTime, NaiveDate, Utc};
use lopdf::{Dictionary, Document as LopdfDocument, Object};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Basic properties of a PDF document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfInfo {
    pub page_count: u32,
    pub version: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub encrypted: bool,
}

/// Read page count, version and Info dictionary entries.
pub fn read_pdf_info(data: &[u8]) -> Result<PdfInfo> {
    let doc = LopdfDocument::load_mem(data)?;
    let mut info = PdfInfo {
        page_count: doc.get_pages().len() as u32,
        version: doc.version.to_string(),
        encrypted: doc.is_encrypted(),
        ..PdfInfo::default()
    };

    let dict = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id));
    if let Ok(dict) = dict {
        info.title = get_string_from_dict(dict, b"Title");
        info.author = get_string_from_dict(dict, b"Author");
        info.created = get_string_from_dict(dict, b"CreationDate")
            .as_deref()
            .and_then(parse_pdf_date);
    }

    Ok(info)
}

/// Text value of a dictionary entry; UTF-16BE with BOM, else UTF-8, else Latin-1.
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let text = match dict.get(key).ok()? {
        Object::String(bytes, _) => {
            if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                let utf16: Vec<u16> = bytes[2..]
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                String::from_utf16(&utf16).ok()?
            } else {
                String::from_utf8(bytes.clone())
                    .unwrap_or_else(|_| bytes.iter().map(|&b| b as char).collect())
            }
        }
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok()?,
        _ => return None,
    };

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSS...). Time zone offsets are ignored.
fn parse_pdf_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}
