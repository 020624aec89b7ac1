//! Output file formats.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Image formats the framebuffer can be serialized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// ASCII portable pixmap (P3)
    Ppm,
    /// Uncompressed 24-bit Windows bitmap
    Bmp,
    /// PNG via the `image` crate (feature `png`)
    Png,
    /// JPEG via the `image` crate (feature `jpeg`)
    Jpeg,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Ppm,
        OutputFormat::Bmp,
        OutputFormat::Png,
        OutputFormat::Jpeg,
    ];

    /// Whether an encoder for this format was compiled in.
    pub fn is_supported(self) -> bool {
        match self {
            OutputFormat::Ppm | OutputFormat::Bmp => true,
            OutputFormat::Png => cfg!(feature = "png"),
            OutputFormat::Jpeg => cfg!(feature = "jpeg"),
        }
    }

    /// All formats with a compiled-in encoder.
    pub fn supported() -> impl Iterator<Item = OutputFormat> {
        Self::ALL.into_iter().filter(|f| f.is_supported())
    }

    /// The canonical (lowercase) name, also used as the file extension.
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Ppm => "ppm",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    /// Guess the format from a file extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<OutputFormat> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized file type: {0}")]
pub struct UnknownFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ppm" => Ok(OutputFormat::Ppm),
            "bmp" => Ok(OutputFormat::Bmp),
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}
