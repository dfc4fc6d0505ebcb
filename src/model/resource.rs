//! Rasterized page images.

use serde::{Deserialize, Serialize};

/// A PDF page rendered to a PNG image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedPage {
    /// Page number (1-indexed)
    pub page_num: u32,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// PNG-encoded image
    #[serde(skip)]
    pub image_bytes: Vec<u8>,
}

impl RenderedPage {
    /// MIME type of `image_bytes`.
    pub fn mime_type(&self) -> &'static str {
        "image/png"
    }

    /// Suggested file name for the page image.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}_page{:04}.png", stem, self.page_num)
    }
}
