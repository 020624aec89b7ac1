//! Framebuffer serialization.
//!
//! PPM and BMP are written directly from the framebuffer rows. PNG (through
//! the `image` crate) and JPEG (through `jpeg-encoder`) are encoded into
//! memory first, so a codec failure leaves the output stream
//! untouched.

mod bmp;
mod codec;
mod ppm;

use std::io::Write;

use thiserror::Error;

use crate::{Framebuffer, OutputFormat};

pub use bmp::{padded_row_len, write_bmp, BmpHeader, BmpOrder, BMP_HEADER_SIZE};
pub use codec::{write_jpeg, write_png, JPEG_DPI, JPEG_QUALITY};
pub use ppm::write_ppm;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "png")]
    #[error("Image encoding error: {0}")]
    Codec(#[from] image::ImageError),

    #[cfg(feature = "jpeg")]
    #[error("JPEG encoding error: {0}")]
    Jpeg(#[from] jpeg_encoder::EncodingError),

    #[error("{0} support not built in")]
    Unsupported(OutputFormat),

    #[error("Image of {width}x{height} is too large for {format}")]
    TooLarge {
        format: OutputFormat,
        width: u32,
        height: u32,
    },
}

pub type EncodeResult<T> = Result<T, EncodeError>;

/// Write the framebuffer in the requested format.
///
/// BMP output uses the canonical bottom-to-top row order.
pub fn write_to<W: Write>(fb: &Framebuffer, out: &mut W, format: OutputFormat) -> EncodeResult<()> {
    if !format.is_supported() {
        return Err(EncodeError::Unsupported(format));
    }

    log::debug!(
        "Encoding {}x{} framebuffer as {}",
        fb.width(),
        fb.height(),
        format
    );

    match format {
        OutputFormat::Ppm => write_ppm(fb, out)?,
        OutputFormat::Bmp => write_bmp(fb, out, BmpOrder::BottomToTop)?,
        OutputFormat::Png => write_png(fb, out)?,
        OutputFormat::Jpeg => write_jpeg(fb, out)?,
    }

    out.flush()?;
    Ok(())
}

impl Framebuffer {
    /// Write this framebuffer in the requested format.
    pub fn write_to<W: Write>(&self, out: &mut W, format: OutputFormat) -> EncodeResult<()> {
        write_to(self, out, format)
    }
}
