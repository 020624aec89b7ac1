mod args;
mod scene;

use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_core::{Framebuffer, OutputFormat};
use lumen_renderer::{progress, ThreadCount};
use rand::rngs::StdRng;
use rand::SeedableRng;

use args::{Args, Destination};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    run(Args::parse())
}

fn run(args: Args) -> Result<()> {
    // Reject bad settings before any work is done
    let threads = ThreadCount::from_i64(args.threads)?;
    let output = args.output()?;

    // Open the file now so a bad path fails before a long render
    let partial = PartialOutput::default();
    let file = match &output.destination {
        Destination::File(path) => {
            let file =
                File::create(path).with_context(|| format!("Failed to open {}", path.display()))?;
            partial.track(path.clone());
            remove_on_interrupt(&partial);
            Some(file)
        }
        Destination::Stdout => {
            if output.format != OutputFormat::Ppm && io::stdout().is_terminal() {
                log::warn!("Writing binary {} data to a terminal", output.format);
            }
            None
        }
    };

    let scene = if args.quick {
        scene::quick()
    } else {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        scene::cover(&mut rng)
    };
    log::info!("Scene has {} objects", scene.world.len());

    let mut camera = scene.camera;
    if let Some(width) = args.width {
        camera = camera.with_image_width(width);
    }
    if args.samples.is_some() || args.depth.is_some() {
        let samples = args.samples.unwrap_or(camera.samples_per_pixel());
        let depth = args.depth.unwrap_or(camera.max_depth());
        camera = camera.with_quality(samples, depth);
    }
    if let Some(seed) = args.seed {
        camera = camera.with_seed(seed);
    }

    let start = Instant::now();
    let image = camera.render_threaded(&scene.world, threads, &*progress::detect());
    log::info!("Rendered in {:.2?}", start.elapsed());

    match (output.destination, file) {
        (Destination::File(path), Some(file)) => {
            if let Err(e) = write_image(&image, file, output.format) {
                partial.discard();
                return Err(e).with_context(|| format!("Failed to write {}", path.display()));
            }
            partial.keep();
            log::info!("Saved {} image to {}", output.format, path.display());
        }
        _ => {
            let stdout = io::stdout().lock();
            write_image(&image, stdout, output.format).context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

fn write_image<W: Write>(image: &Framebuffer, out: W, format: OutputFormat) -> Result<()> {
    let mut out = BufWriter::new(out);
    image.write_to(&mut out, format)?;
    out.flush()?;
    Ok(())
}

/// Exit status after Ctrl-C, following the shell's 128 + SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Output file that has been created but not completely written.
#[derive(Clone, Default)]
struct PartialOutput(Arc<Mutex<Option<PathBuf>>>);

impl PartialOutput {
    fn track(&self, path: PathBuf) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(path);
    }

    /// The file is complete; stop tracking it.
    fn keep(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    /// Remove the file, if one is still tracked.
    fn discard(&self) {
        let path = self.0.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(path) = path {
            if let Err(e) = fs::remove_file(&path) {
                log::warn!("Could not remove {}: {}", path.display(), e);
            }
        }
    }
}

fn remove_on_interrupt(partial: &PartialOutput) {
    let partial = partial.clone();
    let result = ctrlc::set_handler(move || {
        partial.discard();
        process::exit(INTERRUPTED_EXIT_CODE);
    });
    if let Err(e) = result {
        log::warn!("Could not install Ctrl-C handler: {}", e);
    }
}
