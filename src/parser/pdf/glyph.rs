//! Fallback text backend: per-glyph output from pdf-extract.
//!
//! pdf-extract renders each glyph through an [`OutputDev`]. Glyphs are
//! collected with their positions and bucketed into lines by their rounded
//! top coordinate; within a bucket they are ordered left to right. Font
//! names are not reported through this interface, so lines are never
//! flagged bold.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};

use super::backend::{assemble_page, Span, TextBackend};
use crate::error::{Error, Result};
use crate::model::{BBox, PageRecord};

/// Glyph backend built on pdf-extract.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlyphBackend;

impl TextBackend for GlyphBackend {
    fn name(&self) -> &'static str {
        "glyph"
    }

    fn extract(&self, data: &[u8]) -> Result<Vec<PageRecord>> {
        let doc = pdf_extract::Document::load_mem(data).map_err(OutputError::from)?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        // pdf-extract panics on some malformed fonts and streams
        let mut collector = GlyphCollector::default();
        panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::output_doc(&doc, &mut collector)
        }))
        .map_err(|_| Error::TextExtract("glyph output aborted on malformed input".to_string()))??;
        collector.finish_page();

        Ok(collector
            .pages
            .into_iter()
            .map(|page| {
                let lines = bucket_lines(page.glyphs);
                assemble_page(page.page_num, page.width, page.height, lines)
            })
            .collect())
    }
}

struct GlyphPage {
    page_num: u32,
    width: f32,
    height: f32,
    glyphs: Vec<Span>,
}

#[derive(Default)]
struct GlyphCollector {
    pages: Vec<GlyphPage>,
    current: Option<GlyphPage>,
}

impl GlyphCollector {
    fn finish_page(&mut self) {
        if let Some(page) = self.current.take() {
            self.pages.push(page);
        }
    }
}

impl OutputDev for GlyphCollector {
    fn begin_page(
        &mut self,
        page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.finish_page();
        self.current = Some(GlyphPage {
            page_num,
            width: (media_box.urx - media_box.llx) as f32,
            height: (media_box.ury - media_box.lly) as f32,
            glyphs: Vec::new(),
        });
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.finish_page();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        let Some(page) = self.current.as_mut() else {
            return Ok(());
        };

        // Font size transformed into device space, as the side of the
        // square with the same area as the transformed size vector
        let fx = font_size * trm.m11 + font_size * trm.m21;
        let fy = font_size * trm.m12 + font_size * trm.m22;
        let size = (fx * fy).abs().sqrt() as f32;

        let x0 = trm.m31 as f32;
        let baseline = page.height - trm.m32 as f32;
        let advance = (width as f32 * size).max(0.0);

        page.glyphs.push(Span::new(
            char,
            BBox::new(x0, baseline - size, x0 + advance, baseline),
            size,
            false,
        ));
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }
}

/// Group glyphs into lines keyed by rounded top coordinate.
fn bucket_lines(glyphs: Vec<Span>) -> Vec<Vec<Span>> {
    let mut buckets: BTreeMap<i64, Vec<Span>> = BTreeMap::new();
    for glyph in glyphs {
        buckets
            .entry(glyph.bbox.y0.round() as i64)
            .or_default()
            .push(glyph);
    }

    buckets
        .into_values()
        .map(|mut line| {
            line.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(c: &str, x: f32, top: f32) -> Span {
        Span::new(c, BBox::new(x, top, x + 6.0, top + 12.0), 12.0, false)
    }

    #[test]
    fn test_bucket_by_rounded_top_then_x() {
        let glyphs = vec![
            glyph("b", 80.0, 100.4),
            glyph("y", 80.0, 200.0),
            glyph("a", 74.0, 99.6),
            glyph("x", 74.0, 200.2),
        ];
        let lines = bucket_lines(glyphs);
        let texts: Vec<String> = lines
            .iter()
            .map(|l| l.iter().map(|s| s.text.as_str()).collect())
            .collect();
        assert_eq!(texts, vec!["ab", "xy"]);
    }

    #[test]
    fn test_glyph_lines_assemble() {
        let glyphs = vec![
            glyph("H", 72.0, 100.0),
            glyph("i", 78.0, 100.0),
            glyph("t", 100.0, 100.0),
            glyph("o", 106.0, 100.0),
        ];
        let page = assemble_page(1, 612.0, 792.0, bucket_lines(glyphs));
        assert_eq!(page.lines.len(), 1);
        assert_eq!(page.lines[0].text, "Hi to");
        assert!(!page.lines[0].bold);
        assert_eq!(page.words.len(), 2);
    }
}
