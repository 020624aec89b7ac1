//! PNG output through the `image` crate, JPEG through `jpeg-encoder`.
//!
//! Both encoders receive the packed top-to-bottom RGB24 rows and encode into
//! an in-memory buffer. Nothing reaches `out` unless encoding succeeded.

use std::io::Write;

#[cfg(any(not(feature = "png"), feature = "jpeg"))]
use crate::{EncodeError, OutputFormat};
use crate::{EncodeResult, Framebuffer};

/// JPEG quality setting (0-100).
pub const JPEG_QUALITY: u8 = 95;

/// Pixel density recorded in JPEG output.
pub const JPEG_DPI: u16 = 96;

/// Write the framebuffer as a PNG.
#[cfg(feature = "png")]
pub fn write_png<W: Write>(fb: &Framebuffer, out: &mut W) -> EncodeResult<()> {
    use image::codecs::png::PngEncoder;
    use image::{ColorType, ImageEncoder};

    let mut buf = Vec::new();
    let encoded = PngEncoder::new(&mut buf).write_image(
        fb.pixels(),
        fb.width(),
        fb.height(),
        ColorType::Rgb8,
    );
    if let Err(err) = encoded {
        log::error!("Failed to encode PNG: {}", err);
        return Err(err.into());
    }

    log::debug!("Encoded PNG: {} bytes", buf.len());
    out.write_all(&buf)?;
    Ok(())
}

/// Write the framebuffer as a PNG.
#[cfg(not(feature = "png"))]
pub fn write_png<W: Write>(_fb: &Framebuffer, _out: &mut W) -> EncodeResult<()> {
    Err(EncodeError::Unsupported(OutputFormat::Png))
}

/// Write the framebuffer as a baseline JPEG at [`JPEG_QUALITY`] with 4:2:0
/// chroma subsampling.
#[cfg(feature = "jpeg")]
pub fn write_jpeg<W: Write>(fb: &Framebuffer, out: &mut W) -> EncodeResult<()> {
    use jpeg_encoder::{ColorType, Density, Encoder, SamplingFactor};

    // JPEG dimensions are 16-bit
    let too_large = || EncodeError::TooLarge {
        format: OutputFormat::Jpeg,
        width: fb.width(),
        height: fb.height(),
    };
    let width = u16::try_from(fb.width()).map_err(|_| too_large())?;
    let height = u16::try_from(fb.height()).map_err(|_| too_large())?;

    let mut buf = Vec::new();
    let encoded = {
        let mut encoder = Encoder::new(&mut buf, JPEG_QUALITY);
        encoder.set_sampling_factor(SamplingFactor::R_4_2_0);
        encoder.set_density(Density::Inch {
            x: JPEG_DPI,
            y: JPEG_DPI,
        });
        encoder.encode(fb.pixels(), width, height, ColorType::Rgb)
    };
    if let Err(err) = encoded {
        log::error!("Failed to encode JPEG: {}", err);
        return Err(err.into());
    }

    log::debug!("Encoded JPEG: {} bytes", buf.len());
    out.write_all(&buf)?;
    Ok(())
}

/// Write the framebuffer as a baseline JPEG at [`JPEG_QUALITY`].
#[cfg(not(feature = "jpeg"))]
pub fn write_jpeg<W: Write>(_fb: &Framebuffer, _out: &mut W) -> EncodeResult<()> {
    Err(EncodeError::Unsupported(OutputFormat::Jpeg))
}
