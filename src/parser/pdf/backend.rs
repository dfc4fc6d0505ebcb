//! PDF text backend abstraction.
//!
//! A backend turns PDF bytes into [`PageRecord`]s. Backends differ in how
//! they read the content streams; line synthesis, word splitting and block
//! numbering are shared here so every backend produces the same shape.

use crate::error::Result;
use crate::model::{BBox, LineRecord, PageRecord, WordRecord};

/// A source of positioned page text.
pub trait TextBackend: Send + Sync {
    /// Short identifier recorded in result metadata.
    fn name(&self) -> &'static str;

    /// Whether this backend can run in the current build.
    fn is_available(&self) -> bool {
        true
    }

    /// Extract every page of the document, in page order.
    fn extract(&self, data: &[u8]) -> Result<Vec<PageRecord>>;
}

/// A run of text drawn with one font at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    /// Box in top-left page space
    pub bbox: BBox,
    /// Effective font size in points
    pub size: f32,
    pub bold: bool,
}

impl Span {
    pub fn new(text: impl Into<String>, bbox: BBox, size: f32, bold: bool) -> Self {
        Self {
            text: text.into(),
            bbox,
            size,
            bold,
        }
    }

    fn avg_char_width(&self) -> f32 {
        let count = self.text.chars().count();
        if count > 0 && self.bbox.width() > 0.0 {
            self.bbox.width() / count as f32
        } else {
            self.size * 0.5
        }
    }
}

/// Whether a font name marks a bold face.
pub fn is_bold_font_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("bold") || lower.contains("black") || lower.contains("heavy")
}

/// Build a page from lines of spans. Each inner vector is one visual line,
/// spans in left-to-right order, lines in top-to-bottom order.
pub fn assemble_page(page_num: u32, width: f32, height: f32, lines: Vec<Vec<Span>>) -> PageRecord {
    let mut page = PageRecord::new(page_num, width, height);
    let mut line_words = Vec::new();

    for spans in lines.into_iter().filter(|l| !l.is_empty()) {
        let (text, words) = join_spans(&spans);
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        let bbox = spans
            .iter()
            .skip(1)
            .fold(spans[0].bbox, |acc, s| acc.union(&s.bbox));
        let size = spans.iter().map(|s| s.size).fold(0.0f32, f32::max);
        let bold = spans.iter().any(|s| s.bold);

        page.lines.push(LineRecord::new(text, bbox, size, bold));
        line_words.push(words);
    }

    let blocks = number_blocks(&page.lines);
    for (words, (block, line)) in line_words.into_iter().zip(blocks) {
        for (word_index, (text, bbox)) in words.into_iter().enumerate() {
            page.words.push(WordRecord {
                text,
                bbox,
                block,
                line,
                word_index: word_index as u32,
            });
        }
    }

    page
}

/// Concatenate span text, inserting spaces at visible gaps, and split it
/// into words with per-character proportional boxes.
fn join_spans(spans: &[Span]) -> (String, Vec<(String, BBox)>) {
    let mut text = String::new();
    let mut words: Vec<(String, BBox)> = Vec::new();
    let mut word_open = false;

    for (i, span) in spans.iter().enumerate() {
        if i > 0 && needs_space(&spans[i - 1], span) {
            text.push(' ');
            word_open = false;
        }
        text.push_str(&span.text);

        let count = span.text.chars().count().max(1) as f32;
        let char_width = span.bbox.width() / count;
        for (idx, ch) in span.text.chars().enumerate() {
            if ch.is_whitespace() {
                word_open = false;
                continue;
            }
            let x0 = span.bbox.x0 + char_width * idx as f32;
            let char_box = BBox::new(x0, span.bbox.y0, x0 + char_width, span.bbox.y1);
            match words.last_mut() {
                Some((word, bbox)) if word_open => {
                    word.push(ch);
                    *bbox = bbox.union(&char_box);
                }
                _ => {
                    words.push((ch.to_string(), char_box));
                    word_open = true;
                }
            }
        }
    }

    (text, words)
}

/// Gap-based space detection between neighbouring spans.
fn needs_space(prev: &Span, curr: &Span) -> bool {
    if prev.text.ends_with([' ', '\u{00A0}']) || curr.text.starts_with([' ', '\u{00A0}']) {
        return false;
    }

    let gap = curr.bbox.x0 - prev.bbox.x1;
    if gap <= curr.avg_char_width() * 0.2 {
        return false;
    }

    // Scripts written without word spaces stay joined
    let prev_cjk = prev.text.chars().last().map(is_spaceless_script_char);
    let curr_cjk = curr.text.chars().next().map(is_spaceless_script_char);
    !(prev_cjk == Some(true) && curr_cjk == Some(true))
}

/// Assign (block, line-in-block) numbers from vertical spacing, size and
/// indentation changes.
fn number_blocks(lines: &[LineRecord]) -> Vec<(u32, u32)> {
    let avg_spacing = average_line_spacing(lines);
    let mut numbers = Vec::with_capacity(lines.len());
    let mut block = 0u32;
    let mut line = 0u32;

    for (i, curr) in lines.iter().enumerate() {
        if i > 0 {
            if should_break_block(&lines[i - 1], curr, avg_spacing) {
                block += 1;
                line = 0;
            } else {
                line += 1;
            }
        }
        numbers.push((block, line));
    }
    numbers
}

fn average_line_spacing(lines: &[LineRecord]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[1].bbox.y1 - w[0].bbox.y1).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &LineRecord, curr: &LineRecord, avg_spacing: f32) -> bool {
    let spacing = (curr.bbox.y1 - prev.bbox.y1).abs();
    spacing > avg_spacing * 1.5
        || (prev.size - curr.size).abs() > 1.0
        || (prev.bbox.x0 - curr.bbox.x0).abs() > 20.0
}

/// Characters from scripts that do not separate words with spaces.
///
/// Hangul is not included: Korean uses word spaces.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Decode string bytes without font encoding information.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
