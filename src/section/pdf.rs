//! Sections from PDF line records.
//!
//! Two passes: the first collects every positive line size in the document
//! and takes the 85th percentile as the heading threshold, the second walks
//! the lines in page order and opens a section at each heading line.

use crate::model::{LineRecord, PageRecord, Section, SectionIds};

/// Percentile of the line size distribution used as the heading threshold.
const HEADING_PERCENTILE: f32 = 0.85;

/// Bold lines qualify as headings down to this fraction of the threshold.
const BOLD_HEADING_RATIO: f32 = 0.9;

/// Level of sections opened by a heading line.
pub const PDF_HEADING_LEVEL: u8 = 2;

/// Level of the synthetic section holding text before the first heading.
pub const PREAMBLE_LEVEL: u8 = 3;

/// Title of the synthetic preamble section.
pub const PREAMBLE_TITLE: &str = "Preamble";

/// Heading size threshold: the 85th percentile of positive line sizes,
/// or 0 when the document records no positive size.
pub fn size_threshold(pages: &[PageRecord]) -> f32 {
    let mut sizes: Vec<f32> = pages
        .iter()
        .flat_map(|p| p.lines.iter().map(|l| l.size))
        .filter(|&s| s > 0.0)
        .collect();

    if sizes.is_empty() {
        return 0.0;
    }

    sizes.sort_by(f32::total_cmp);
    let index = (HEADING_PERCENTILE * (sizes.len() - 1) as f32) as usize;
    sizes[index]
}

fn is_heading(line: &LineRecord, threshold: f32) -> bool {
    threshold > 0.0
        && (line.size >= threshold || (line.bold && line.size >= BOLD_HEADING_RATIO * threshold))
}

/// Build sections from the lines of every page, in page order.
pub fn sectionize_pdf(pages: &[PageRecord]) -> Vec<Section> {
    let threshold = size_threshold(pages);
    let mut ids = SectionIds::default();

    let lines = pages
        .iter()
        .flat_map(|page| page.lines.iter().map(move |line| (page.page_num, line)));

    let (mut sections, open) = lines.fold(
        (Vec::new(), None::<Section>),
        |(mut sections, mut open), (page, line)| {
            let text = line.text.trim();
            if text.is_empty() {
                return (sections, open);
            }

            if is_heading(line, threshold) {
                sections.extend(open.take());
                open = Some(Section::new(ids.next_id(), PDF_HEADING_LEVEL, text, page));
            } else if let Some(section) = open.as_mut() {
                section.push_text(text);
                section.extend_to_page(page);
            } else {
                let mut preamble = Section::new(ids.next_id(), PREAMBLE_LEVEL, PREAMBLE_TITLE, page);
                preamble.push_text(text);
                open = Some(preamble);
            }
            (sections, open)
        },
    );

    sections.extend(open);
    log::debug!(
        "PDF: {} sections from {} pages (heading threshold {:.1})",
        sections.len(),
        pages.len(),
        threshold
    );
    sections
}
