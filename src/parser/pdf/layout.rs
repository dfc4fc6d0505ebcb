//! Primary text backend: content stream layout analysis over lopdf.
//!
//! Walks each page's content stream, tracking the graphics and text state,
//! and records every shown string as a span with its font, effective size
//! and position. Spans sharing a baseline become one line unless a column
//! gutter separates them.

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Encoding, Object, ObjectId};

use super::backend::{
    assemble_page, decode_text_simple, is_bold_font_name, is_spaceless_script_char, Span,
    TextBackend,
};
use crate::error::{Error, Result};
use crate::model::{BBox, PageRecord};

/// Letter size, used when a page has no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Glyph width assumed when a font carries no metrics (thousandths of em).
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// TJ adjustments beyond this many thousandths of an em read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Gap between spans on one baseline, in ems, that separates columns.
const COLUMN_GAP_EMS: f32 = 2.5;

/// Layout backend built on lopdf.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayoutBackend;

impl TextBackend for LayoutBackend {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn extract(&self, data: &[u8]) -> Result<Vec<PageRecord>> {
        let doc = LopdfDocument::load_mem(data)?;
        let mut pages = Vec::new();

        for (page_num, page_id) in doc.get_pages() {
            let [llx, lly, urx, ury] = media_box(&doc, page_id);
            let (width, height) = (urx - llx, ury - lly);

            let content = page_content(&doc, page_id)?;
            let walker = PageWalker::new(&doc, page_id, llx, lly, height)?;
            let spans = walker.walk(&content)?;

            log::trace!("Page {}: {} spans", page_num, spans.len());
            pages.push(assemble_page(page_num, width, height, group_into_lines(spans)));
        }

        Ok(pages)
    }
}

/// Decoded content stream bytes of a page.
///
/// lopdf's own accessor is tried first; documents it rejects are read by
/// walking the Contents entry directly.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    match doc.get_page_content(page_id) {
        Ok(content) => Ok(content),
        Err(e) => {
            log::debug!("get_page_content failed ({}), walking Contents", e);
            page_content_manual(doc, page_id)
        }
    }
}

fn page_content_manual(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;
    let contents = match page_dict.get(b"Contents") {
        Ok(obj) => obj,
        Err(_) => return Ok(Vec::new()),
    };

    let refs: Vec<ObjectId> = match contents {
        Object::Reference(r) => match doc.get_object(*r)? {
            Object::Array(arr) => arr.iter().filter_map(|o| o.as_reference().ok()).collect(),
            _ => vec![*r],
        },
        Object::Array(arr) => arr.iter().filter_map(|o| o.as_reference().ok()).collect(),
        _ => return Err(Error::PdfParse("Invalid content stream".to_string())),
    };

    let mut content = Vec::new();
    for r in refs {
        if let Ok(Object::Stream(s)) = doc.get_object(r) {
            let data = s
                .decompressed_content()
                .unwrap_or_else(|_| s.content.clone());
            content.extend_from_slice(&data);
            content.push(b'\n');
        }
    }
    Ok(content)
}

/// A content stream with non-blank bytes must decode to some operators.
fn check_decoded(raw: &[u8], operations: usize) -> Result<()> {
    if operations == 0 && raw.iter().any(|b| !b.is_ascii_whitespace()) {
        return Err(Error::PdfParse(
            "content stream could not be decoded".to_string(),
        ));
    }
    Ok(())
}

/// MediaBox of a page, inherited through the page tree.
fn media_box(doc: &LopdfDocument, page_id: ObjectId) -> [f32; 4] {
    let mut dict = doc.get_dictionary(page_id).ok();
    let mut depth = 0;

    while let Some(d) = dict {
        if let Ok(obj) = d.get(b"MediaBox") {
            let resolved = doc.dereference(obj).map(|(_, o)| o);
            if let Ok(Object::Array(arr)) = resolved {
                let nums: Vec<f32> = arr.iter().filter_map(number).collect();
                if nums.len() == 4 && nums[2] > nums[0] && nums[3] > nums[1] {
                    return [nums[0], nums[1], nums[2], nums[3]];
                }
            }
        }

        depth += 1;
        if depth > 32 {
            break;
        }
        dict = d
            .get(b"Parent")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .ok();
    }

    DEFAULT_MEDIA_BOX
}

/// A 2D affine transform [a b c d e f] in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(ops: &[Object]) -> Option<Matrix> {
        let n: Vec<f32> = ops.iter().take(6).filter_map(number).collect();
        (n.len() == 6).then(|| Matrix {
            a: n[0],
            b: n[1],
            c: n[2],
            d: n[3],
            e: n[4],
            f: n[5],
        })
    }

    fn translation(tx: f32, ty: f32) -> Matrix {
        Matrix {
            e: tx,
            f: ty,
            ..Matrix::IDENTITY
        }
    }

    /// `self × other`
    fn mul(&self, o: &Matrix) -> Matrix {
        Matrix {
            a: self.a * o.a + self.b * o.c,
            b: self.a * o.b + self.b * o.d,
            c: self.c * o.a + self.d * o.c,
            d: self.c * o.b + self.d * o.d,
            e: self.e * o.a + self.f * o.c + o.e,
            f: self.e * o.b + self.f * o.d + o.f,
        }
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text state parameters, saved and restored with the graphics state.
#[derive(Debug, Clone)]
struct TextState {
    font: Vec<u8>,
    size: f32,
    char_spacing: f32,
    word_spacing: f32,
    /// Horizontal scaling as a fraction (Tz / 100)
    scaling: f32,
    leading: Option<f32>,
    rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: Vec::new(),
            size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            scaling: 1.0,
            leading: None,
            rise: 0.0,
        }
    }
}

/// Text object matrices.
#[derive(Debug, Clone, Copy, Default)]
struct TextMatrix {
    tm: Matrix,
    tlm: Matrix,
}

impl TextMatrix {
    fn set(&mut self, m: Matrix) {
        self.tm = m;
        self.tlm = m;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translation(tx, ty).mul(&self.tlm);
        self.tm = self.tlm;
    }

    fn advance(&mut self, tx: f32) {
        self.tm = Matrix::translation(tx, 0.0).mul(&self.tm);
    }
}

/// Per-font data needed to decode and measure strings.
struct FontInfo<'a> {
    bold: bool,
    encoding: Option<Encoding<'a>>,
    metrics: FontMetrics,
}

/// Glyph advance widths in thousandths of an em.
#[derive(Debug, Clone, Default)]
struct FontMetrics {
    two_byte: bool,
    first_char: u32,
    widths: Vec<f32>,
    cid_widths: HashMap<u32, f32>,
    default_width: f32,
}

impl FontMetrics {
    fn from_font(doc: &LopdfDocument, font: &Dictionary) -> Self {
        let subtype = font
            .get(b"Subtype")
            .and_then(Object::as_name)
            .unwrap_or_default();

        if subtype == b"Type0" {
            return Self::from_type0(doc, font);
        }

        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(number)
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0);
        let widths: Vec<f32> = font
            .get_deref(b"Widths", doc)
            .and_then(Object::as_array)
            .map(|arr| arr.iter().filter_map(|o| resolve_number(doc, o)).collect())
            .unwrap_or_default();
        let missing = font
            .get_deref(b"FontDescriptor", doc)
            .and_then(Object::as_dict)
            .ok()
            .and_then(|fd| fd.get(b"MissingWidth").ok().and_then(number))
            .filter(|w| *w > 0.0);

        Self {
            two_byte: false,
            first_char,
            default_width: missing.unwrap_or(DEFAULT_GLYPH_WIDTH),
            widths,
            cid_widths: HashMap::new(),
        }
    }

    fn from_type0(doc: &LopdfDocument, font: &Dictionary) -> Self {
        let descendant = font
            .get_deref(b"DescendantFonts", doc)
            .and_then(Object::as_array)
            .ok()
            .and_then(|arr| arr.first())
            .and_then(|o| doc.dereference(o).ok())
            .and_then(|(_, o)| o.as_dict().ok());

        let mut metrics = Self {
            two_byte: true,
            default_width: 1000.0,
            ..Self::default()
        };

        let Some(cid_font) = descendant else {
            return metrics;
        };
        if let Some(dw) = cid_font.get(b"DW").ok().and_then(number) {
            metrics.default_width = dw;
        }

        // W: [c [w1 w2 ...]] or [c_first c_last w]
        if let Ok(w) = cid_font.get_deref(b"W", doc).and_then(Object::as_array) {
            let mut i = 0;
            while i < w.len() {
                let Some(start) = resolve_number(doc, &w[i]).map(|n| n as u32) else {
                    break;
                };
                match w.get(i + 1).map(|o| doc.dereference(o).map(|(_, o)| o)) {
                    Some(Ok(Object::Array(list))) => {
                        for (k, o) in list.iter().enumerate() {
                            if let Some(width) = resolve_number(doc, o) {
                                metrics.cid_widths.insert(start + k as u32, width);
                            }
                        }
                        i += 2;
                    }
                    Some(Ok(obj)) => {
                        let end = number(obj).map(|n| n as u32).unwrap_or(start);
                        if let Some(width) = w.get(i + 2).and_then(|o| resolve_number(doc, o)) {
                            for cid in start..=end.min(start.saturating_add(0xFFFF)) {
                                metrics.cid_widths.insert(cid, width);
                            }
                        }
                        i += 3;
                    }
                    _ => break,
                }
            }
        }
        metrics
    }

    fn glyph_width(&self, code: u32) -> f32 {
        if self.two_byte {
            return self
                .cid_widths
                .get(&code)
                .copied()
                .unwrap_or(self.default_width);
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(self.default_width)
    }

    /// Horizontal advance of a string in unscaled text space.
    fn string_advance(&self, bytes: &[u8], state: &TextState) -> f32 {
        let mut advance = 0.0;
        if self.two_byte {
            for pair in bytes.chunks(2) {
                let code = pair.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32);
                advance += self.glyph_width(code) / 1000.0 * state.size + state.char_spacing;
            }
        } else {
            for &b in bytes {
                advance += self.glyph_width(b as u32) / 1000.0 * state.size + state.char_spacing;
                if b == b' ' {
                    advance += state.word_spacing;
                }
            }
        }
        advance * state.scaling
    }
}

/// Content stream interpreter for one page.
struct PageWalker<'a> {
    fonts: HashMap<Vec<u8>, FontInfo<'a>>,
    fallback_metrics: FontMetrics,
    llx: f32,
    lly: f32,
    height: f32,
}

/// A span with its baseline, before line grouping.
struct PlacedSpan {
    span: Span,
    baseline: f32,
}

impl<'a> PageWalker<'a> {
    fn new(doc: &'a LopdfDocument, page_id: ObjectId, llx: f32, lly: f32, height: f32) -> Result<Self> {
        let mut fonts = HashMap::new();
        for (name, font) in doc.get_page_fonts(page_id)? {
            let base_font = font
                .get(b"BaseFont")
                .and_then(Object::as_name)
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_default();
            let heavy_weight = font
                .get_deref(b"FontDescriptor", doc)
                .and_then(Object::as_dict)
                .ok()
                .and_then(|fd| fd.get(b"FontWeight").ok().and_then(number))
                .map(|w| w >= 700.0)
                .unwrap_or(false);

            fonts.insert(
                name,
                FontInfo {
                    bold: is_bold_font_name(&base_font) || heavy_weight,
                    encoding: font.get_font_encoding(doc).ok(),
                    metrics: FontMetrics::from_font(doc, font),
                },
            );
        }

        Ok(Self {
            fonts,
            fallback_metrics: FontMetrics {
                default_width: DEFAULT_GLYPH_WIDTH,
                ..FontMetrics::default()
            },
            llx,
            lly,
            height,
        })
    }

    fn walk(&self, raw: &[u8]) -> Result<Vec<PlacedSpan>> {
        let content = Content::decode(raw).map_err(|e| Error::PdfParse(e.to_string()))?;
        check_decoded(raw, content.operations.len())?;

        let mut spans = Vec::new();
        let mut ctm = Matrix::IDENTITY;
        let mut state = TextState::default();
        let mut stack: Vec<(Matrix, TextState)> = Vec::new();
        let mut text = TextMatrix::default();
        let mut in_text = false;

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => stack.push((ctm, state.clone())),
                "Q" => {
                    if let Some((saved_ctm, saved_state)) = stack.pop() {
                        ctm = saved_ctm;
                        state = saved_state;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        ctm = m.mul(&ctm);
                    }
                }
                "BT" => {
                    in_text = true;
                    text = TextMatrix::default();
                }
                "ET" => in_text = false,
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        state.font = name.clone();
                    }
                    if let Some(size) = operands.get(1).and_then(number) {
                        state.size = size;
                    }
                }
                "Tc" => state.char_spacing = first_number(operands).unwrap_or(0.0),
                "Tw" => state.word_spacing = first_number(operands).unwrap_or(0.0),
                "Tz" => state.scaling = first_number(operands).unwrap_or(100.0) / 100.0,
                "TL" => state.leading = first_number(operands),
                "Ts" => state.rise = first_number(operands).unwrap_or(0.0),
                "Td" | "TD" => {
                    let tx = operands.first().and_then(number).unwrap_or(0.0);
                    let ty = operands.get(1).and_then(number).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = Some(-ty);
                    }
                    text.translate(tx, ty);
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        text.set(m);
                    }
                }
                "T*" => text.translate(0.0, -self.leading(&state)),
                "Tj" if in_text => {
                    let shown = &operands[..operands.len().min(1)];
                    self.show(shown, &state, &mut text, &ctm, &mut spans);
                }
                "TJ" if in_text => {
                    if let Some(Object::Array(items)) = operands.first() {
                        self.show(items, &state, &mut text, &ctm, &mut spans);
                    }
                }
                "'" | "\"" => {
                    if op.operator == "\"" {
                        state.word_spacing = operands.first().and_then(number).unwrap_or(0.0);
                        state.char_spacing = operands.get(1).and_then(number).unwrap_or(0.0);
                    }
                    text.translate(0.0, -self.leading(&state));
                    let idx = if op.operator == "\"" { 2 } else { 0 };
                    if let (true, Some(shown)) = (in_text, operands.get(idx)) {
                        self.show(std::slice::from_ref(shown), &state, &mut text, &ctm, &mut spans);
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }

    fn leading(&self, state: &TextState) -> f32 {
        state.leading.unwrap_or(state.size * 1.2)
    }

    /// Show a TJ-style array of strings and kerning adjustments as one span.
    fn show(
        &self,
        items: &[Object],
        state: &TextState,
        text: &mut TextMatrix,
        ctm: &Matrix,
        spans: &mut Vec<PlacedSpan>,
    ) {
        let font = self.fonts.get(&state.font);
        let metrics = font.map(|f| &f.metrics).unwrap_or(&self.fallback_metrics);

        // Rendering matrix at the start of the run
        let start = Matrix {
            a: state.size * state.scaling,
            b: 0.0,
            c: 0.0,
            d: state.size,
            e: 0.0,
            f: state.rise,
        }
        .mul(&text.tm)
        .mul(ctm);
        let device = text.tm.mul(ctm);

        let mut combined = String::new();
        let mut advance = 0.0f32;

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let decoded = font
                        .and_then(|f| f.encoding.as_ref())
                        .and_then(|enc| LopdfDocument::decode_text(enc, bytes).ok())
                        .unwrap_or_else(|| decode_text_simple(bytes));
                    combined.push_str(&decoded);
                    advance += metrics.string_advance(bytes, state);
                }
                Object::Integer(_) | Object::Real(_) => {
                    let adjustment = -number(item).unwrap_or(0.0);
                    advance += adjustment / 1000.0 * state.size * state.scaling;
                    if adjustment > TJ_SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with([' ', '\u{00A0}'])
                        && !combined
                            .chars()
                            .last()
                            .map(is_spaceless_script_char)
                            .unwrap_or(false)
                    {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }
        text.advance(advance);

        if combined.trim().is_empty() {
            return;
        }

        let size = start.vertical_scale();
        let x0 = start.e - self.llx;
        let baseline = self.height - (start.f - self.lly);
        let width = (advance * device.horizontal_scale()).max(0.0);

        spans.push(PlacedSpan {
            span: Span::new(
                combined,
                BBox::new(x0, baseline - size * 0.8, x0 + width, baseline + size * 0.2),
                size,
                font.map(|f| f.bold).unwrap_or(false),
            ),
            baseline,
        });
    }
}

/// Group spans into visual lines: spans whose baselines lie within 30% of
/// the font size of the line's first baseline share a line.
fn group_into_lines(mut spans: Vec<PlacedSpan>) -> Vec<Vec<Span>> {
    spans.sort_by(|a, b| {
        a.baseline
            .total_cmp(&b.baseline)
            .then(a.span.bbox.x0.total_cmp(&b.span.bbox.x0))
    });

    let mut lines: Vec<Vec<Span>> = Vec::new();
    let mut current: Vec<Span> = Vec::new();
    let mut current_y: Option<f32> = None;

    for placed in spans {
        let tolerance = placed.span.size * 0.3;
        match current_y {
            Some(y) if (placed.baseline - y).abs() <= tolerance => current.push(placed.span),
            _ => {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current_y = Some(placed.baseline);
                current.push(placed.span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
    }
    lines.into_iter().flat_map(split_columns).collect()
}

/// Split a baseline group where the horizontal gap between neighbouring
/// spans is wide enough to be a column gutter.
fn split_columns(line: Vec<Span>) -> Vec<Vec<Span>> {
    let mut parts: Vec<Vec<Span>> = Vec::new();
    for span in line {
        let joins = parts.last().and_then(|part| part.last()).is_some_and(|prev| {
            span.bbox.x0 - prev.bbox.x1 <= COLUMN_GAP_EMS * prev.size.max(span.size)
        });
        match parts.last_mut() {
            Some(part) if joins => part.push(span),
            _ => parts.push(vec![span]),
        }
    }
    parts
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn first_number(operands: &[Object]) -> Option<f32> {
    operands.first().and_then(number)
}

fn resolve_number(doc: &LopdfDocument, obj: &Object) -> Option<f32> {
    doc.dereference(obj).ok().and_then(|(_, o)| number(o))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;
    use lopdf::{dictionary, Stream};

    /// Build a one-page PDF with a Helvetica and a Helvetica-Bold font.
    fn build_pdf(operations: Vec<Operation>) -> Vec<u8> {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let resources = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => regular, "F2" => bold },
        });
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    fn text_at(font: &str, size: i64, x: i64, y: i64, text: &str) -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]
    }

    #[test]
    fn test_extract_lines_with_size_and_bold() {
        let mut ops = text_at("F2", 24, 72, 720, "Introduction");
        ops.extend(text_at("F1", 12, 72, 690, "Body text line."));
        let pages = LayoutBackend.extract(&build_pdf(ops)).unwrap();

        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert_eq!((page.width, page.height), (612.0, 792.0));
        assert_eq!(page.lines.len(), 2);

        assert_eq!(page.lines[0].text, "Introduction");
        assert_eq!(page.lines[0].size, 24.0);
        assert!(page.lines[0].bold);

        assert_eq!(page.lines[1].text, "Body text line.");
        assert_eq!(page.lines[1].size, 12.0);
        assert!(!page.lines[1].bold);

        // Top-left origin: the heading sits above the body line
        assert!(page.lines[0].bbox.y0 < page.lines[1].bbox.y0);
        assert!((page.lines[0].bbox.x0 - 72.0).abs() < 0.01);

        let words: Vec<&str> = page.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(words, vec!["Introduction", "Body", "text", "line."]);
    }

    #[test]
    fn test_spans_on_one_baseline_merge() {
        let mut ops = text_at("F2", 12, 72, 700, "Bold");
        ops.extend(text_at("F1", 12, 120, 700, "regular"));
        let pages = LayoutBackend.extract(&build_pdf(ops)).unwrap();

        assert_eq!(pages[0].lines.len(), 1);
        let line = &pages[0].lines[0];
        assert_eq!(line.text, "Bold regular");
        assert!(line.bold);
    }

    #[test]
    fn test_columns_on_one_baseline_stay_apart() {
        let mut ops = text_at("F1", 12, 72, 700, "Left column");
        ops.extend(text_at("F1", 12, 320, 700, "Right column"));
        ops.extend(text_at("F1", 12, 72, 686, "more left"));
        let pages = LayoutBackend.extract(&build_pdf(ops)).unwrap();

        let texts: Vec<&str> = pages[0].lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Left column", "Right column", "more left"]);
    }

    #[test]
    fn test_tj_kerning_inserts_space() {
        let ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Hello"),
                    Object::Integer(-300),
                    Object::string_literal("world"),
                ])],
            ),
            Operation::new("ET", vec![]),
        ];
        let pages = LayoutBackend.extract(&build_pdf(ops)).unwrap();
        assert_eq!(pages[0].lines[0].text, "Hello world");
    }

    #[test]
    fn test_ctm_scales_font_size() {
        let mut ops = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![2.into(), 0.into(), 0.into(), 2.into(), 0.into(), 0.into()],
            ),
        ];
        ops.extend(text_at("F1", 10, 36, 350, "Scaled"));
        ops.push(Operation::new("Q", vec![]));
        ops.extend(text_at("F1", 10, 72, 100, "Plain"));
        let pages = LayoutBackend.extract(&build_pdf(ops)).unwrap();

        let sizes: Vec<(String, f32)> = pages[0]
            .lines
            .iter()
            .map(|l| (l.text.clone(), l.size))
            .collect();
        assert_eq!(
            sizes,
            vec![("Scaled".to_string(), 20.0), ("Plain".to_string(), 10.0)]
        );
    }

    #[test]
    fn test_next_line_uses_leading() {
        let ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("TL", vec![14.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal("first")]),
            Operation::new("T*", vec![]),
            Operation::new("Tj", vec![Object::string_literal("second")]),
            Operation::new("ET", vec![]),
        ];
        let pages = LayoutBackend.extract(&build_pdf(ops)).unwrap();
        let lines = &pages[0].lines;
        assert_eq!(lines.len(), 2);
        assert!((lines[1].bbox.y1 - lines[0].bbox.y1 - 14.0).abs() < 0.01);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(LayoutBackend.extract(b"%PDF-1.4 not really").is_err());
    }

    #[test]
    fn test_undecodable_content_is_an_error() {
        assert!(check_decoded(b"  \n", 0).is_ok());
        assert!(check_decoded(b"BT ET", 2).is_ok());
        assert!(matches!(
            check_decoded(b"(unclosed string Tj", 0),
            Err(Error::PdfParse(_))
        ));
    }

    #[test]
    fn test_matrix_mul() {
        let scale = Matrix {
            a: 2.0,
            d: 3.0,
            ..Matrix::IDENTITY
        };
        let moved = Matrix::translation(10.0, 20.0).mul(&scale);
        assert_eq!((moved.e, moved.f), (20.0, 60.0));
        assert_eq!(moved.horizontal_scale(), 2.0);
        assert_eq!(moved.vertical_scale(), 3.0);
    }
}
