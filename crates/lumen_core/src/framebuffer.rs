//! Packed RGB24 framebuffer.
//!
//! Pixels are stored left-to-right, top-to-bottom, three bytes per pixel in
//! R, G, B order. The renderer writes linear-space colors; quantization to
//! gamma-corrected bytes happens on write, so the buffer always holds
//! display-ready data that encoders can stream directly.

use std::ops::Range;

use lumen_math::{Color, Interval};

/// Bytes per pixel (8 bits per channel, RGB).
const CHANNELS: usize = 3;

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear-space color to gamma-corrected 8-bit RGB.
///
/// Channels are clamped to [0.000, 0.999] and scaled by 256, so 1.0 maps to
/// 255 without wrapping and 0.0 maps to 0.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let quantize = |c: f32| (256.0 * Interval::INTENSITY.clamp(linear_to_gamma(c))) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// An RGB24 image owned by a single render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Framebuffer {
    /// Create a black framebuffer.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * CHANNELS;
        Self {
            width,
            height,
            pixels: vec![0; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes in one unpadded row.
    pub fn row_len(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// The whole buffer, rows packed top-to-bottom.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Iterate the rows top-to-bottom as packed RGB byte slices.
    ///
    /// This is the view handed to external codecs.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[u8]> + ExactSizeIterator {
        // chunks_exact(0) panics; a zero-width image simply has no row bytes
        self.pixels.chunks_exact(self.row_len().max(1))
    }

    /// Read back a pixel, or None if out of bounds.
    pub fn pixel(&self, row: u32, column: u32) -> Option<[u8; 3]> {
        if row >= self.height || column >= self.width {
            return None;
        }
        let index = self.index(row, column);
        let mut rgb = [0u8; 3];
        rgb.copy_from_slice(&self.pixels[index..index + CHANNELS]);
        Some(rgb)
    }

    /// Write a linear-space color at (row, column).
    ///
    /// Out-of-bounds writes are logged and dropped.
    pub fn write_pixel(&mut self, row: u32, column: u32, color: Color) {
        self.write_pixel_rgb(row, column, color_to_rgb(color));
    }

    /// Write raw bytes at (row, column).
    ///
    /// Out-of-bounds writes are logged and dropped.
    pub fn write_pixel_rgb(&mut self, row: u32, column: u32, rgb: [u8; 3]) {
        if !check_address(row, column, 0..self.height, self.width) {
            return;
        }
        let index = self.index(row, column);
        self.pixels[index..index + CHANNELS].copy_from_slice(&rgb);
    }

    /// Split the buffer into mutable views over the given row ranges.
    ///
    /// Ranges must be ascending and non-overlapping. A range that starts
    /// before the end of the previous one, or runs past the last row, is
    /// logged and skipped. The returned regions borrow disjoint parts of the
    /// buffer and can be handed to different threads.
    pub fn regions_mut(&mut self, ranges: &[Range<u32>]) -> Vec<FramebufferRegion<'_>> {
        let width = self.width;
        let height = self.height;
        let row_len = self.row_len();

        let mut regions = Vec::with_capacity(ranges.len());
        let mut rest: &mut [u8] = &mut self.pixels;
        let mut cursor = 0u32;

        for range in ranges {
            if range.start < cursor || range.end > height || range.start > range.end {
                log::warn!(
                    "Skipping framebuffer region {:?} (next free row {}, height {})",
                    range,
                    cursor,
                    height
                );
                continue;
            }

            let skip = (range.start - cursor) as usize * row_len;
            let take = (range.end - range.start) as usize * row_len;
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(skip);
            let (pixels, tail) = tail.split_at_mut(take);
            rest = tail;
            cursor = range.end;

            regions.push(FramebufferRegion {
                width,
                rows: range.clone(),
                pixels,
            });
        }

        regions
    }

    fn index(&self, row: u32, column: u32) -> usize {
        (row as usize * self.width as usize + column as usize) * CHANNELS
    }
}

/// A mutable view over a contiguous band of framebuffer rows.
///
/// Rows are addressed with their global index, so a worker can use the same
/// coordinates it would use against the full framebuffer.
pub struct FramebufferRegion<'a> {
    width: u32,
    rows: Range<u32>,
    pixels: &'a mut [u8],
}

impl<'a> FramebufferRegion<'a> {
    /// The global rows covered by this region.
    pub fn rows(&self) -> Range<u32> {
        self.rows.clone()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Write a linear-space color at (row, column).
    ///
    /// Writes outside this region are logged and dropped.
    pub fn write_pixel(&mut self, row: u32, column: u32, color: Color) {
        if !check_address(row, column, self.rows.clone(), self.width) {
            return;
        }
        let index = ((row - self.rows.start) as usize * self.width as usize + column as usize)
            * CHANNELS;
        self.pixels[index..index + CHANNELS].copy_from_slice(&color_to_rgb(color));
    }
}

fn check_address(row: u32, column: u32, rows: Range<u32>, width: u32) -> bool {
    if !rows.contains(&row) {
        log::warn!("Row index {} is out of bounds ({:?}), dropping write", row, rows);
        return false;
    }
    if column >= width {
        log::warn!(
            "Column index {} is out of bounds (width {}), dropping write",
            column,
            width
        );
        return false;
    }
    true
}
