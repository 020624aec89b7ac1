//! Command line arguments.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::builder::{PossibleValue, PossibleValuesParser, TypedValueParser};
use clap::Parser;
use lumen_core::OutputFormat;

/// Offline CPU path tracer.
///
/// Renders the scene and writes the image to FILE, or to stdout when FILE is
/// omitted or "-".
#[derive(Parser, Debug, Clone)]
#[command(name = "lumen", version)]
pub struct Args {
    /// File to write to (defaults to stdout). The file type follows the
    /// extension unless --type is given
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Output file type. Defaults to ppm when writing to stdout
    #[arg(short = 't', long = "type", value_name = "TYPE", value_parser = format_parser())]
    pub format: Option<OutputFormat>,

    /// Number of worker threads, 0 uses every hardware thread
    #[arg(
        short = 'T',
        long,
        value_name = "NUM",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    pub threads: i64,

    /// Image width in pixels
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Samples per pixel
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Maximum ray bounce depth
    #[arg(short, long)]
    pub depth: Option<u32>,

    /// Random seed, for reproducible scenes and images
    #[arg(long)]
    pub seed: Option<u64>,

    /// Render a small demo scene instead of the full cover scene
    #[arg(long)]
    pub quick: bool,
}

/// Only formats with a compiled-in encoder are accepted (and listed in --help).
fn format_parser() -> impl TypedValueParser<Value = OutputFormat> {
    let values = OutputFormat::supported().map(|format| match format {
        OutputFormat::Jpeg => PossibleValue::new(format.name()).alias("jpeg"),
        _ => PossibleValue::new(format.name()),
    });
    PossibleValuesParser::new(values).try_map(|name| name.parse::<OutputFormat>())
}

/// Where the image goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

/// Resolved destination and format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub destination: Destination,
    pub format: OutputFormat,
}

impl Args {
    /// Work out the destination and format from FILE and --type.
    pub fn output(&self) -> Result<Output> {
        let destination = match &self.file {
            None => Destination::Stdout,
            Some(path) if path.as_os_str() == "-" => Destination::Stdout,
            Some(path) => Destination::File(path.clone()),
        };

        let format = match (&destination, self.format) {
            (_, Some(format)) => format,
            (Destination::Stdout, None) => OutputFormat::Ppm,
            (Destination::File(path), None) => format_from_extension(path)?,
        };

        if !format.is_supported() {
            bail!(
                "Output type {} is not supported by this build (supported: {})",
                format,
                supported_list()
            );
        }

        Ok(Output {
            destination,
            format,
        })
    }
}

fn format_from_extension(path: &Path) -> Result<OutputFormat> {
    match OutputFormat::from_path(path) {
        Some(format) => Ok(format),
        None => bail!(
            "Unrecognized extension on file {} (use --type to pick one of: {})",
            path.display(),
            supported_list()
        ),
    }
}

fn supported_list() -> String {
    OutputFormat::supported()
        .map(OutputFormat::name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("lumen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_command_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_stdout_ppm() {
        let args = parse(&[]);
        assert_eq!(args.threads, 0);
        assert!(!args.quick);
        assert_eq!(
            args.output().unwrap(),
            Output {
                destination: Destination::Stdout,
                format: OutputFormat::Ppm,
            }
        );
    }

    #[test]
    fn test_dash_means_stdout() {
        let output = parse(&["-"]).output().unwrap();
        assert_eq!(output.destination, Destination::Stdout);
        assert_eq!(output.format, OutputFormat::Ppm);

        let output = parse(&["-t", "bmp", "-"]).output().unwrap();
        assert_eq!(output.destination, Destination::Stdout);
        assert_eq!(output.format, OutputFormat::Bmp);
    }

    #[test]
    fn test_two_files_rejected() {
        let result = Args::try_parse_from(["lumen", "a.ppm", "-"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_from_extension() {
        let output = parse(&["render.BMP"]).output().unwrap();
        assert_eq!(output.destination, Destination::File(PathBuf::from("render.BMP")));
        assert_eq!(output.format, OutputFormat::Bmp);

        assert!(parse(&["render.tga"]).output().is_err());
        assert!(parse(&["render"]).output().is_err());
    }

    #[test]
    fn test_explicit_type_overrides_extension() {
        let output = parse(&["--type", "ppm", "render.bmp"]).output().unwrap();
        assert_eq!(output.format, OutputFormat::Ppm);

        // Also rescues an unknown extension
        let output = parse(&["-t", "bmp", "render.img"]).output().unwrap();
        assert_eq!(output.format, OutputFormat::Bmp);
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(Args::try_parse_from(["lumen", "-t", "gif"]).is_err());
    }

    #[cfg(feature = "jpeg")]
    #[test]
    fn test_jpeg_alias() {
        assert_eq!(parse(&["-t", "jpeg"]).format, Some(OutputFormat::Jpeg));
        assert_eq!(parse(&["-t", "jpg"]).format, Some(OutputFormat::Jpeg));
    }

    #[test]
    fn test_negative_threads_parse() {
        // Parsed here, rejected when converted to a thread count
        let args = parse(&["-T", "-3", "out.ppm"]);
        assert_eq!(args.threads, -3);
        assert_eq!(args.file, Some(PathBuf::from("out.ppm")));
    }

    #[test]
    fn test_render_settings() {
        let args = parse(&[
            "--width", "320", "-s", "16", "-d", "8", "--seed", "42", "--quick", "-T", "4",
        ]);
        assert_eq!(args.width, Some(320));
        assert_eq!(args.samples, Some(16));
        assert_eq!(args.depth, Some(8));
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.threads, 4);
        assert!(args.quick);
    }
}
