//! Minimal PNG encoder for 8-bit RGB rasters.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::{Compression, Crc};

use crate::error::{Error, Result};

const SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const BIT_DEPTH: u8 = 8;
const COLOR_TYPE_RGB: u8 = 2;
const FILTER_NONE: u8 = 0;

/// Encode packed RGB pixels (3 bytes per pixel, rows top to bottom).
pub fn encode_rgb(width: u32, height: u32, pixels: &[u8]) -> Result<Vec<u8>> {
    let stride = width as usize * 3;
    if width == 0 || height == 0 || pixels.len() != stride * height as usize {
        return Err(Error::Render(format!(
            "raster of {} bytes does not match {}x{} RGB",
            pixels.len(),
            width,
            height
        )));
    }

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[BIT_DEPTH, COLOR_TYPE_RGB, 0, 0, 0]);

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    for row in pixels.chunks_exact(stride) {
        encoder.write_all(&[FILTER_NONE])?;
        encoder.write_all(row)?;
    }
    let idat = encoder.finish()?;

    let mut out = Vec::with_capacity(SIGNATURE.len() + idat.len() + 64);
    out.extend_from_slice(SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr);
    write_chunk(&mut out, b"IDAT", &idat);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}

/// Drop the alpha channel of packed RGBA pixels.
pub fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}

fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);

    let mut crc = Crc::new();
    crc.update(kind);
    crc.update(data);
    out.extend_from_slice(&crc.sum().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn chunk_at(png: &[u8], offset: usize) -> (&[u8], &[u8], usize) {
        let len = u32::from_be_bytes(png[offset..offset + 4].try_into().unwrap()) as usize;
        let kind = &png[offset + 4..offset + 8];
        let data = &png[offset + 8..offset + 8 + len];
        (kind, data, offset + 12 + len)
    }

    #[test]
    fn test_encode_layout() {
        let pixels = vec![255u8; 3 * 4 * 2];
        let png = encode_rgb(4, 2, &pixels).unwrap();
        assert!(png.starts_with(SIGNATURE));

        let (kind, ihdr, next) = chunk_at(&png, 8);
        assert_eq!(kind, b"IHDR");
        assert_eq!(&ihdr[0..4], &4u32.to_be_bytes());
        assert_eq!(&ihdr[4..8], &2u32.to_be_bytes());
        assert_eq!(ihdr[8], 8);
        assert_eq!(ihdr[9], 2);

        let (kind, idat, next) = chunk_at(&png, next);
        assert_eq!(kind, b"IDAT");
        let mut raw = Vec::new();
        ZlibDecoder::new(idat).read_to_end(&mut raw).unwrap();
        assert_eq!(raw.len(), (1 + 12) * 2);
        assert_eq!(raw[0], 0);
        assert_eq!(raw[13], 0);

        let (kind, data, end) = chunk_at(&png, next);
        assert_eq!(kind, b"IEND");
        assert!(data.is_empty());
        assert_eq!(end, png.len());
        // Well-known CRC of an empty IEND chunk
        assert_eq!(&png[end - 4..], &[0xAE, 0x42, 0x60, 0x82]);
    }

    #[test]
    fn test_rejects_mismatched_raster() {
        assert!(matches!(encode_rgb(2, 2, &[0u8; 5]), Err(Error::Render(_))));
        assert!(matches!(encode_rgb(0, 2, &[]), Err(Error::Render(_))));
    }

    #[test]
    fn test_rgba_to_rgb() {
        let rgba = [1, 2, 3, 255, 4, 5, 6, 0];
        assert_eq!(rgba_to_rgb(&rgba), vec![1, 2, 3, 4, 5, 6]);
    }
}
