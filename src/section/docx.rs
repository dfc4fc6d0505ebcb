//! Sections from styled DOCX paragraphs.
//!
//! Heading-styled paragraphs open sections; body paragraphs append to the
//! open one. Body text before the first heading is dropped. DOCX carries no
//! page information here, so every section spans page 1.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{Paragraph, Section, SectionIds, BODY_LEVEL, MAX_HEADING_LEVEL};

/// Level for "heading <word>" styles whose word is not a number.
const UNNUMBERED_HEADING_LEVEL: u8 = 2;

fn heading_style() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "heading <token>..." or "heading<digits>"
    RE.get_or_init(|| Regex::new(r"^heading(?: \s*(\S*)|([0-9]+)$)").unwrap())
}

/// Heading level (1-6) for a paragraph style name, or 7 for body text.
///
/// "Heading 2", "heading 2 char" and "Heading2" give level 2; numbers are
/// clamped to 1..=6. "Heading Title" gives level 2. Anything else is body.
pub fn level_from_style(style: &str) -> u8 {
    let lower = style.to_lowercase();
    let Some(caps) = heading_style().captures(&lower) else {
        return BODY_LEVEL;
    };

    match (caps.get(1), caps.get(2)) {
        (Some(token), _) => parse_level(token.as_str()).unwrap_or(UNNUMBERED_HEADING_LEVEL),
        (None, Some(digits)) => parse_level(digits.as_str()).unwrap_or(BODY_LEVEL),
        (None, None) => BODY_LEVEL,
    }
}

/// Clamp a signed integer token into 1..=6; out-of-range magnitudes saturate.
fn parse_level(token: &str) -> Option<u8> {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let level = if token.starts_with('-') {
        1
    } else {
        digits
            .parse::<u64>()
            .unwrap_or(u64::MAX)
            .clamp(1, MAX_HEADING_LEVEL as u64) as u8
    };
    Some(level)
}

/// Build sections from paragraphs in document order.
pub fn sectionize_docx(paragraphs: &[Paragraph]) -> Vec<Section> {
    let mut ids = SectionIds::default();

    let (mut sections, open) = paragraphs.iter().fold(
        (Vec::new(), None::<Section>),
        |(mut sections, mut open), paragraph| {
            let text = paragraph.text.trim();
            let level = level_from_style(&paragraph.style);

            if level <= MAX_HEADING_LEVEL && !text.is_empty() {
                sections.extend(open.take());
                open = Some(Section::new(ids.next_id(), level, text, 1));
            } else if let (Some(section), false) = (open.as_mut(), text.is_empty()) {
                section.push_text(text);
            }
            (sections, open)
        },
    );

    sections.extend(open);
    log::debug!("DOCX: {} sections from {} paragraphs", sections.len(), paragraphs.len());
    sections
}
