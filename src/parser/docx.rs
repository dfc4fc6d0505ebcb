//! DOCX paragraph extraction.
//!
//! Reads the main document part of an OOXML package and returns its body
//! paragraphs with resolved style names. Paragraphs inside tables and
//! content controls are not part of the body sequence.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::model::{DocxContent, Paragraph};

const DEFAULT_MAIN_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

/// Extract paragraphs from a DOCX file.
pub fn extract_docx_file<P: AsRef<Path>>(path: P) -> Result<DocxContent> {
    let file = File::open(path)?;
    extract_docx_reader(BufReader::new(file))
}

/// Extract paragraphs from DOCX bytes.
pub fn extract_docx_bytes(data: &[u8]) -> Result<DocxContent> {
    extract_docx_reader(Cursor::new(data))
}

/// Extract paragraphs from any seekable DOCX source.
pub fn extract_docx_reader<R: Read + Seek>(reader: R) -> Result<DocxContent> {
    let mut archive = ZipArchive::new(reader)?;

    let main_part = main_document_part(&mut archive);
    let document_xml = read_part(&mut archive, &main_part)?
        .ok_or_else(|| Error::Docx(format!("missing main document part {}", main_part)))?;

    let styles_part = sibling_part(&main_part, "styles.xml");
    let styles = match read_part(&mut archive, &styles_part) {
        Ok(Some(xml)) => StyleTable::parse(&xml).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable styles part {}: {}", styles_part, e);
            StyleTable::default()
        }),
        Ok(None) => StyleTable::default(),
        Err(e) => {
            log::warn!("Ignoring unreadable styles part {}: {}", styles_part, e);
            StyleTable::default()
        }
    };

    let paragraphs = parse_body_paragraphs(&document_xml, &styles)?;
    let mut content = DocxContent::from_paragraphs(paragraphs);

    if let Ok(Some(core)) = read_part(&mut archive, "docProps/core.xml") {
        let props = parse_core_properties(&core);
        content.title = props.get("title").cloned();
        content.author = props.get("creator").cloned();
    }

    log::debug!(
        "DOCX: {} paragraphs, heading styles: {}",
        content.paragraphs.len(),
        content.has_heading_styles
    );
    Ok(content)
}

/// Read a part as text; `Ok(None)` if the package has no such part.
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| Error::Docx(format!("{}: {}", name, e)))?;
    decode_part(&bytes)
        .map(Some)
        .ok_or_else(|| Error::Docx(format!("{}: part is not UTF-8 or UTF-16 text", name)))
}

/// Decode XML part bytes, honouring a UTF-8 or UTF-16 byte order mark.
fn decode_part(bytes: &[u8]) -> Option<String> {
    let utf16 = |rest: &[u8], from: fn([u8; 2]) -> u16| {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| from([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).ok()
    };

    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8(rest.to_vec()).ok(),
        [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes),
        _ => String::from_utf8(bytes.to_vec()).ok(),
    }
}

/// Locate the main document part through the package relationships.
fn main_document_part<R: Read + Seek>(archive: &mut ZipArchive<R>) -> String {
    let Ok(Some(rels)) = read_part(archive, "_rels/.rels") else {
        return DEFAULT_MAIN_PART.to_string();
    };

    let mut reader = Reader::from_str(&rels);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let is_main = attr_value(&e, b"Type")
                    .map(|t| t.ends_with(OFFICE_DOCUMENT_REL))
                    .unwrap_or(false);
                if is_main {
                    if let Some(target) = attr_value(&e, b"Target") {
                        return target.trim_start_matches('/').to_string();
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    DEFAULT_MAIN_PART.to_string()
}

/// Part path next to `part` (e.g. "word/styles.xml" for "word/document.xml").
fn sibling_part(part: &str, name: &str) -> String {
    match part.rfind('/') {
        Some(idx) => format!("{}/{}", &part[..idx], name),
        None => name.to_string(),
    }
}

/// Paragraph style ids mapped to display names.
#[derive(Debug, Default)]
struct StyleTable {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleTable {
    fn parse(xml: &str) -> Result<Self> {
        let mut table = StyleTable::default();
        let mut reader = Reader::from_str(xml);

        // (style id, is paragraph style, is default)
        let mut current: Option<(String, bool, bool)> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"style" => {
                    let id = attr_value(&e, b"styleId").unwrap_or_default();
                    let is_paragraph = attr_value(&e, b"type")
                        .map(|t| t == "paragraph")
                        .unwrap_or(true);
                    let is_default = attr_value(&e, b"default")
                        .map(|d| d == "1" || d == "true")
                        .unwrap_or(false);
                    current = Some((id, is_paragraph, is_default));
                }
                Event::End(e) if e.local_name().as_ref() == b"style" => current = None,
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"name" => {
                    if let (Some((id, is_paragraph, is_default)), Some(name)) =
                        (current.as_ref(), attr_value(&e, b"val"))
                    {
                        let name = ui_style_name(&name).into_owned();
                        if *is_paragraph && *is_default {
                            table.default_paragraph = Some(name.clone());
                        }
                        table.names.insert(id.clone(), name);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(table)
    }

    /// Display name for a paragraph's style reference.
    ///
    /// No reference resolves to the default paragraph style (or empty);
    /// an id missing from the table resolves to the id itself.
    fn resolve(&self, style_id: Option<&str>) -> String {
        match style_id {
            Some(id) => self.names.get(id).cloned().unwrap_or_else(|| id.to_string()),
            None => self.default_paragraph.clone().unwrap_or_default(),
        }
    }
}

/// Map built-in lowercase style names to the names Word shows.
fn ui_style_name(name: &str) -> Cow<'_, str> {
    const BUILT_IN: &[&str] = &["caption", "footer", "header", "title", "subtitle", "normal"];
    let lower = name.to_ascii_lowercase();
    let is_built_in = lower.starts_with("heading ")
        || lower.starts_with("toc ")
        || BUILT_IN.contains(&lower.as_str());

    if is_built_in && name.starts_with(|c: char| c.is_ascii_lowercase()) {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => Cow::Owned(first.to_ascii_uppercase().to_string() + chars.as_str()),
            None => Cow::Borrowed(name),
        }
    } else {
        Cow::Borrowed(name)
    }
}

/// Collect the direct paragraph children of `w:body` in document order.
///
/// Paragraphs nested in tables, content controls or text boxes are not
/// body paragraphs. The style comes from the paragraph's own `w:pPr`; the
/// previous style kept under a tracked `w:pPrChange` is ignored.
fn parse_body_paragraphs(xml: &str, styles: &StyleTable) -> Result<Vec<Paragraph>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();

    // Element depths of w:body and of the paragraph being collected
    let mut depth = 0usize;
    let mut body: Option<usize> = None;
    let mut para: Option<usize> = None;
    let mut in_props = false;
    let mut nested = 0u32;
    let mut run_depth = 0u32;
    let mut in_text = false;
    let mut text = String::new();
    let mut style_id: Option<String> = None;

    let at_body_level = |body: Option<usize>, at: usize| body.is_some_and(|b| at == b + 1);
    let is_own_style = |para: Option<usize>, in_props: bool, at: usize| {
        in_props && para.is_some_and(|p| at == p + 2)
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                match e.local_name().as_ref() {
                    b"body" if body.is_none() => body = Some(depth),
                    b"p" if para.is_some() => nested += 1,
                    b"p" if at_body_level(body, depth) => {
                        para = Some(depth);
                        text.clear();
                        style_id = None;
                    }
                    b"pPr" if para.is_some_and(|p| depth == p + 1) => in_props = true,
                    b"pStyle" if is_own_style(para, in_props, depth) => {
                        style_id = attr_value(&e, b"val");
                    }
                    b"r" if para.is_some() && nested == 0 => run_depth += 1,
                    b"t" if para.is_some() && nested == 0 => in_text = true,
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let at = depth + 1;
                let in_runs = para.is_some() && nested == 0 && run_depth > 0;
                match e.local_name().as_ref() {
                    b"p" if para.is_none() && at_body_level(body, at) => {
                        paragraphs.push(Paragraph::new("", styles.resolve(None)));
                    }
                    b"pStyle" if is_own_style(para, in_props, at) => {
                        style_id = attr_value(&e, b"val");
                    }
                    b"tab" if in_runs => text.push('\t'),
                    b"br" | b"cr" if in_runs => text.push('\n'),
                    _ => {}
                }
            }
            Event::Text(e) => {
                if in_text {
                    let raw = e.unescape().map_err(|err| Error::Docx(err.to_string()))?;
                    text.push_str(&raw);
                }
            }
            Event::End(e) => {
                match e.local_name().as_ref() {
                    b"p" if para == Some(depth) => {
                        paragraphs.push(Paragraph::new(
                            std::mem::take(&mut text),
                            styles.resolve(style_id.as_deref()),
                        ));
                        para = None;
                        in_props = false;
                        run_depth = 0;
                    }
                    b"p" if para.is_some() => nested = nested.saturating_sub(1),
                    b"pPr" if para.is_some_and(|p| depth == p + 1) => in_props = false,
                    b"r" if para.is_some() && nested == 0 => {
                        run_depth = run_depth.saturating_sub(1)
                    }
                    b"t" => in_text = false,
                    b"body" if body == Some(depth) => body = None,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Simple text elements of the core properties part, keyed by local name.
fn parse_core_properties(xml: &str) -> HashMap<String, String> {
    let mut props = HashMap::new();
    let mut reader = Reader::from_str(xml);
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current = Some(String::from_utf8_lossy(e.local_name().as_ref()).to_string());
            }
            Ok(Event::Text(e)) => {
                if let (Some(key), Ok(value)) = (current.as_ref(), e.unescape()) {
                    let value = value.trim();
                    if !value.is_empty() {
                        props.insert(key.clone(), value.to_string());
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    props
}

/// Value of the attribute with the given local name, namespace ignored.
fn attr_value(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}
