//! Page rasterization.
//!
//! Renders PDF pages to PNG images at a configurable resolution. The
//! pipeline never consumes these images; they are offered for callers that
//! want page previews or an OCR stage of their own.
//!
//! Rasterization uses the system PDFium library through `pdfium-render`.
//! When the crate is built without the `render` feature, or PDFium cannot
//! be loaded at run time, rendering fails with
//! [`Error::RenderUnavailable`](crate::Error::RenderUnavailable).

mod options;
pub mod png;

pub use options::{PageSelection, RenderOptions, DEFAULT_DPI, POINTS_PER_INCH};

use std::path::Path;

use crate::error::Result;
use crate::model::RenderedPage;

/// Render the pages of a PDF file.
pub fn render_pages<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<Vec<RenderedPage>> {
    let data = std::fs::read(path)?;
    render_pages_bytes(&data, options)
}

/// Render the pages of an in-memory PDF.
pub fn render_pages_bytes(data: &[u8], options: &RenderOptions) -> Result<Vec<RenderedPage>> {
    imp::render(data, options)
}

#[cfg(feature = "render")]
mod imp {
    use pdfium_render::prelude::*;

    use super::png;
    use super::RenderOptions;
    use crate::error::{Error, Result};
    use crate::model::RenderedPage;

    pub(super) fn render(data: &[u8], options: &RenderOptions) -> Result<Vec<RenderedPage>> {
        let bindings = Pdfium::bind_to_system_library()
            .map_err(|e| Error::RenderUnavailable(format!("{:?}", e)))?;
        let pdfium = Pdfium::new(bindings);

        let document = pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|e| Error::Render(format!("{:?}", e)))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(options.scale());
        let mut rendered = Vec::new();

        let pages = document.pages();
        for page_num in options.pages.resolve(pages.len() as u32) {
            let page = pages
                .get((page_num - 1) as PdfPageIndex)
                .map_err(|e| Error::Render(format!("page {}: {:?}", page_num, e)))?;

            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| Error::Render(format!("page {}: {:?}", page_num, e)))?;
            let width = bitmap.width() as u32;
            let height = bitmap.height() as u32;
            let rgb = png::rgba_to_rgb(&bitmap.as_rgba_bytes());

            rendered.push(RenderedPage {
                page_num,
                width,
                height,
                image_bytes: png::encode_rgb(width, height, &rgb)?,
            });
        }

        log::debug!("Rendered {} pages at {} dpi", rendered.len(), options.dpi);
        Ok(rendered)
    }
}

#[cfg(not(feature = "render"))]
mod imp {
    use super::RenderOptions;
    use crate::error::{Error, Result};
    use crate::model::RenderedPage;

    pub(super) fn render(_data: &[u8], _options: &RenderOptions) -> Result<Vec<RenderedPage>> {
        Err(Error::RenderUnavailable(
            "built without the `render` feature".to_string(),
        ))
    }
}
