//! Uncompressed 24-bit BMP writer.
//!
//! Layout: a 14-byte file header followed by a 40-byte BITMAPINFOHEADER,
//! all fields little-endian, then the pixel table. Each row of the table is
//! stored as B, G, R triples and zero-padded to a multiple of 4 bytes.

use std::io::{self, Write};

use crate::{EncodeError, EncodeResult, Framebuffer, OutputFormat};

/// Size of the file header plus the info header.
pub const BMP_HEADER_SIZE: usize = 54;

/// BITMAPINFOHEADER size.
const INFO_HEADER_SIZE: i32 = 40;

/// 'BM' read as a little-endian 16-bit integer.
const BMP_MAGIC: i16 = 0x4D42;

/// BI_RGB (no compression).
const BI_RGB: i32 = 0;

/// 3780 px/m is roughly 96 dpi.
const DENSITY_PX_PER_METER: i32 = 3780;

/// Row traversal order for the pixel table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmpOrder {
    /// Negative height field, rows stored first-to-last.
    TopToBottom,
    /// Positive height field, rows stored last-to-first. The canonical order.
    BottomToTop,
}

/// Bytes in one pixel-table row after padding to a 4-byte boundary.
pub fn padded_row_len(width: u32) -> usize {
    (width as usize * 3).div_ceil(4) * 4
}

/// The 54-byte BMP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeader {
    pub file_size: i32,
    pub pixel_offset: i32,
    pub width: i32,
    /// Negative for top-to-bottom row order
    pub height: i32,
    pub color_planes: i16,
    pub bits_per_pixel: i16,
    pub compression: i32,
    pub image_size: i32,
    pub horiz_density: i32,
    pub vert_density: i32,
    pub palette_size: i32,
    pub important_colors: i32,
}

impl BmpHeader {
    /// Build the header for an RGB24 image.
    ///
    /// Returns None if the pixel table would not fit the 32-bit size fields.
    pub fn rgb24(width: u32, height: u32, order: BmpOrder) -> Option<Self> {
        let image_size = padded_row_len(width).checked_mul(height as usize)?;
        let file_size = image_size.checked_add(BMP_HEADER_SIZE)?;
        let width = i32::try_from(width).ok()?;
        let height = i32::try_from(height).ok()?;

        Some(Self {
            file_size: i32::try_from(file_size).ok()?,
            pixel_offset: BMP_HEADER_SIZE as i32,
            width,
            height: match order {
                BmpOrder::TopToBottom => -height,
                BmpOrder::BottomToTop => height,
            },
            color_planes: 1,
            bits_per_pixel: 24,
            compression: BI_RGB,
            image_size: i32::try_from(image_size).ok()?,
            horiz_density: DENSITY_PX_PER_METER,
            vert_density: DENSITY_PX_PER_METER,
            palette_size: 0,
            important_colors: 0,
        })
    }

    /// Serialize to the packed little-endian on-disk layout.
    pub fn to_bytes(&self) -> [u8; BMP_HEADER_SIZE] {
        let mut bytes = [0u8; BMP_HEADER_SIZE];
        let mut cursor = 0;
        let mut put = |field: &[u8]| {
            bytes[cursor..cursor + field.len()].copy_from_slice(field);
            cursor += field.len();
        };

        put(&BMP_MAGIC.to_le_bytes());
        put(&self.file_size.to_le_bytes());
        put(&0i16.to_le_bytes()); // reserved
        put(&0i16.to_le_bytes()); // reserved
        put(&self.pixel_offset.to_le_bytes());
        put(&INFO_HEADER_SIZE.to_le_bytes());
        put(&self.width.to_le_bytes());
        put(&self.height.to_le_bytes());
        put(&self.color_planes.to_le_bytes());
        put(&self.bits_per_pixel.to_le_bytes());
        put(&self.compression.to_le_bytes());
        put(&self.image_size.to_le_bytes());
        put(&self.horiz_density.to_le_bytes());
        put(&self.vert_density.to_le_bytes());
        put(&self.palette_size.to_le_bytes());
        put(&self.important_colors.to_le_bytes());

        bytes
    }
}

/// Write the framebuffer as a 24-bit BMP in the given row order.
pub fn write_bmp<W: Write>(fb: &Framebuffer, out: &mut W, order: BmpOrder) -> EncodeResult<()> {
    let header = BmpHeader::rgb24(fb.width(), fb.height(), order).ok_or(EncodeError::TooLarge {
        format: OutputFormat::Bmp,
        width: fb.width(),
        height: fb.height(),
    })?;

    out.write_all(&header.to_bytes())?;

    let mut row_buf = vec![0u8; padded_row_len(fb.width())];
    match order {
        BmpOrder::TopToBottom => write_rows(out, fb.rows(), &mut row_buf)?,
        BmpOrder::BottomToTop => write_rows(out, fb.rows().rev(), &mut row_buf)?,
    }

    Ok(())
}

fn write_rows<'a, W: Write>(
    out: &mut W,
    rows: impl Iterator<Item = &'a [u8]>,
    row_buf: &mut [u8],
) -> io::Result<()> {
    for row in rows {
        // Padding bytes at the tail of row_buf are never touched, so stay zero
        for (dst, src) in row_buf.chunks_exact_mut(3).zip(row.chunks_exact(3)) {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
        }
        out.write_all(row_buf)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_i32(bytes: &[u8], offset: usize) -> i32 {
        i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn read_i16(bytes: &[u8], offset: usize) -> i16 {
        i16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn test_padded_row_len() {
        assert_eq!(padded_row_len(1), 4);
        assert_eq!(padded_row_len(2), 8);
        assert_eq!(padded_row_len(3), 12);
        assert_eq!(padded_row_len(4), 12);
        assert_eq!(padded_row_len(5), 16);
        assert_eq!(padded_row_len(0), 0);
    }

    #[test]
    fn test_header_fields() {
        let header = BmpHeader::rgb24(3, 2, BmpOrder::BottomToTop).unwrap();
        let bytes = header.to_bytes();

        assert_eq!(bytes.len(), 54);
        assert_eq!(&bytes[0..2], b"BM");
        assert_eq!(read_i32(&bytes, 2), 54 + 12 * 2);
        assert_eq!(read_i16(&bytes, 6), 0);
        assert_eq!(read_i16(&bytes, 8), 0);
        assert_eq!(read_i32(&bytes, 10), 0x36);
        assert_eq!(read_i32(&bytes, 14), 40);
        assert_eq!(read_i32(&bytes, 18), 3);
        assert_eq!(read_i32(&bytes, 22), 2);
        assert_eq!(read_i16(&bytes, 26), 1);
        assert_eq!(read_i16(&bytes, 28), 24);
        assert_eq!(read_i32(&bytes, 30), 0);
        assert_eq!(read_i32(&bytes, 34), 24);
        assert_eq!(read_i32(&bytes, 38), 3780);
        assert_eq!(read_i32(&bytes, 42), 3780);
        assert_eq!(read_i32(&bytes, 46), 0);
        assert_eq!(read_i32(&bytes, 50), 0);
    }

    #[test]
    fn test_header_top_to_bottom_negates_height() {
        let header = BmpHeader::rgb24(7, 5, BmpOrder::TopToBottom).unwrap();
        assert_eq!(header.height, -5);
        assert_eq!(read_i32(&header.to_bytes(), 22), -5);
    }

    #[test]
    fn test_header_rejects_oversized_image() {
        assert!(BmpHeader::rgb24(u32::MAX, 2, BmpOrder::BottomToTop).is_none());
        assert!(BmpHeader::rgb24(40_000, 40_000, BmpOrder::BottomToTop).is_none());
    }

    #[test]
    fn test_bmp_file_size_matches_header() {
        for (w, h) in [(1, 1), (2, 3), (5, 4), (16, 9)] {
            let fb = Framebuffer::new(w, h);
            let mut out = Vec::new();
            write_bmp(&fb, &mut out, BmpOrder::BottomToTop).unwrap();

            assert_eq!(out.len(), 54 + padded_row_len(w) * h as usize);
            assert_eq!(read_i32(&out, 2) as usize, out.len());
        }
    }

    #[test]
    fn test_bmp_bottom_to_top_rows_and_bgr() {
        // 1 pixel wide: 3 bytes of color + 1 byte padding per row
        let mut fb = Framebuffer::new(1, 2);
        fb.write_pixel_rgb(0, 0, [1, 2, 3]); // top
        fb.write_pixel_rgb(1, 0, [4, 5, 6]); // bottom

        let mut out = Vec::new();
        write_bmp(&fb, &mut out, BmpOrder::BottomToTop).unwrap();

        assert_eq!(&out[54..], &[6, 5, 4, 0, 3, 2, 1, 0]);
    }

    #[test]
    fn test_bmp_top_to_bottom_rows_and_bgr() {
        let mut fb = Framebuffer::new(1, 2);
        fb.write_pixel_rgb(0, 0, [1, 2, 3]);
        fb.write_pixel_rgb(1, 0, [4, 5, 6]);

        let mut out = Vec::new();
        write_bmp(&fb, &mut out, BmpOrder::TopToBottom).unwrap();

        assert_eq!(&out[54..], &[3, 2, 1, 0, 6, 5, 4, 0]);
    }

    #[test]
    fn test_bmp_padding_is_zero() {
        let mut fb = Framebuffer::new(2, 2);
        for row in 0..2 {
            for col in 0..2 {
                fb.write_pixel_rgb(row, col, [255, 255, 255]);
            }
        }

        let mut out = Vec::new();
        write_bmp(&fb, &mut out, BmpOrder::BottomToTop).unwrap();

        let table = &out[54..];
        assert_eq!(table.len(), 16);
        for row in table.chunks_exact(8) {
            assert_eq!(&row[..6], &[255; 6]);
            assert_eq!(&row[6..], &[0, 0]);
        }
    }
}
