//! Page rendering options.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Default rasterization resolution.
pub const DEFAULT_DPI: u32 = 300;

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Options for rasterizing PDF pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Output resolution in dots per inch
    pub dpi: u32,

    /// Pages to render
    #[serde(skip)]
    pub pages: PageSelection,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output resolution. Zero is raised to 1.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi.max(1);
        self
    }

    /// Restrict rendering to a page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Scale from page points to pixels.
    pub fn scale(&self) -> f32 {
        self.dpi as f32 / POINTS_PER_INCH
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            pages: PageSelection::All,
        }
    }
}

/// Pages chosen for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page of the document
    #[default]
    All,
    /// Inclusive 1-indexed ranges, ascending and disjoint
    Ranges(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// A single page.
    pub fn page(page: u32) -> Self {
        PageSelection::Ranges(vec![page..=page])
    }

    /// Whether `page` is selected.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Ranges(ranges) => ranges.iter().any(|r| r.contains(&page)),
        }
    }

    /// Selected pages of a document with `page_count` pages, ascending.
    ///
    /// Ranges reaching past the last page are cut at `page_count`.
    pub fn resolve(&self, page_count: u32) -> Vec<u32> {
        match self {
            PageSelection::All => (1..=page_count).collect(),
            PageSelection::Ranges(ranges) => ranges
                .iter()
                .flat_map(|r| *r.start()..=(*r.end()).min(page_count))
                .collect(),
        }
    }

    /// Parse "all", "3", "2-5" or a comma list such as "1,3,7-10".
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let mut ranges = s
            .split(',')
            .map(parse_range)
            .collect::<Result<Vec<_>, _>>()?;
        ranges.sort_by_key(|r| *r.start());

        let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if *range.start() <= last.end().saturating_add(1) => {
                    *last = *last.start()..=(*last.end()).max(*range.end());
                }
                _ => merged.push(range),
            }
        }
        Ok(PageSelection::Ranges(merged))
    }
}

fn parse_range(part: &str) -> Result<RangeInclusive<u32>, String> {
    let (start, end) = match part.split_once('-') {
        Some((start, end)) => (parse_page(start)?, parse_page(end)?),
        None => {
            let page = parse_page(part)?;
            (page, page)
        }
    };
    if start == 0 {
        return Err("pages are numbered from 1".to_string());
    }
    if end < start {
        return Err(format!("descending range {}-{}", start, end));
    }
    Ok(start..=end)
}

fn parse_page(s: &str) -> Result<u32, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("Invalid page number: {:?}", s.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_dpi(144)
            .with_pages(PageSelection::page(2));
        assert_eq!(options.dpi, 144);
        assert_eq!(options.scale(), 2.0);
        assert!(!options.pages.includes(1));

        assert_eq!(RenderOptions::default().dpi, 300);
        assert_eq!(RenderOptions::new().with_dpi(0).dpi, 1);
    }

    #[test]
    fn test_page_selection_includes() {
        assert!(PageSelection::All.includes(100));

        let selection = PageSelection::Ranges(vec![2..=2, 5..=10]);
        assert!(selection.includes(2));
        assert!(!selection.includes(4));
        assert!(selection.includes(10));
        assert!(!selection.includes(11));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse(" ").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("3").unwrap(), PageSelection::page(3));
        assert_eq!(
            PageSelection::parse("9, 1,3-4,2,4-6").unwrap(),
            PageSelection::Ranges(vec![1..=6, 9..=9])
        );
        assert!(PageSelection::parse("1,x").is_err());
        assert!(PageSelection::parse("0-3").is_err());
        assert!(PageSelection::parse("5-2").is_err());
    }

    #[test]
    fn test_huge_range_is_cut_to_page_count() {
        let selection = PageSelection::parse("2-4000000000").unwrap();
        assert_eq!(selection, PageSelection::Ranges(vec![2..=4_000_000_000]));
        assert_eq!(selection.resolve(4), vec![2, 3, 4]);
        assert!(PageSelection::parse("7-9").unwrap().resolve(4).is_empty());
        assert_eq!(PageSelection::All.resolve(3), vec![1, 2, 3]);
    }
}
