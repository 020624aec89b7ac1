//! Scanline scheduling for multithreaded renders.
//!
//! The image is cut into one contiguous band of rows per worker. Each band
//! is a disjoint `FramebufferRegion`, so workers write without locking; the
//! scene is shared read-only.

use std::num::NonZeroUsize;
use std::ops::Range;

use crate::camera::{Camera, CameraFrame, RenderState};
use crate::hittable::Hittable;
use crate::progress::ProgressReporter;
use crate::renderer::{render_region, LineCounter};
use lumen_core::Framebuffer;
use thiserror::Error;

/// Errors from render configuration.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    #[error("the number of threads must be 0 or greater, got {0}")]
    InvalidThreadCount(i64),
}

/// Result type for render configuration.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// How many worker threads a render uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadCount {
    /// One per hardware thread
    #[default]
    Auto,
    Fixed(NonZeroUsize),
}

impl ThreadCount {
    /// Interpret a user-supplied count: 0 is automatic, negatives are rejected.
    pub fn from_i64(n: i64) -> RenderResult<Self> {
        if n < 0 {
            return Err(RenderError::InvalidThreadCount(n));
        }
        Ok(match NonZeroUsize::new(n as usize) {
            Some(n) => ThreadCount::Fixed(n),
            None => ThreadCount::Auto,
        })
    }

    /// Concrete number of threads, at least 1.
    pub fn resolve(self) -> usize {
        match self {
            ThreadCount::Fixed(n) => n.get(),
            ThreadCount::Auto => {
                let n = std::thread::available_parallelism()
                    .map(NonZeroUsize::get)
                    .unwrap_or(1);
                log::info!("Setting number of threads automatically to {}", n);
                n
            }
        }
    }
}

/// Split `[0, height)` into `n` contiguous bands.
///
/// Every band gets `height / n` rows and the last also takes the remainder.
/// `n` is clamped to `height` so no band is empty.
pub fn partition_scanlines(height: u32, n: usize) -> Vec<Range<u32>> {
    if height == 0 {
        return Vec::new();
    }

    let n = n.max(1);
    let n = if n > height as usize {
        log::warn!(
            "More threads requested than possible: reducing {} to {}",
            n,
            height
        );
        height
    } else {
        n as u32
    };

    let block_size = height / n;
    let remainder = height % n;

    let mut ranges = Vec::with_capacity(n as usize);
    let mut begin = 0;
    for index in 0..n {
        let mut end = begin + block_size;
        if index == n - 1 {
            end += remainder;
        }
        ranges.push(begin..end);
        begin = end;
    }
    ranges
}

impl Camera {
    /// Render on the calling thread.
    ///
    /// Blocks while another render on this camera is running.
    pub fn render(&self, world: &dyn Hittable, progress: &dyn ProgressReporter) -> Framebuffer {
        let _guard = self.lock_render();
        self.render_single(world, progress)
    }

    /// Render with `threads` workers, one band of scanlines each.
    ///
    /// One worker falls back to the single-threaded path. For a fixed seed
    /// the output is identical whatever the thread count.
    pub fn render_threaded(
        &self,
        world: &dyn Hittable,
        threads: ThreadCount,
        progress: &dyn ProgressReporter,
    ) -> Framebuffer {
        let _guard = self.lock_render();

        let n = threads.resolve();
        if n == 1 {
            log::info!("Using single-threaded implementation");
            return self.render_single(world, progress);
        }

        let (frame, seed) = self.begin();
        let mut fb = Framebuffer::new(frame.image_width, frame.image_height);
        let ranges = partition_scanlines(frame.image_height, n);
        log::info!("Using {} threads", ranges.len());
        log::debug!("Scanline partition: {:?}", ranges);

        let counter = LineCounter::new(frame.image_height, progress);
        {
            let regions = fb.regions_mut(&ranges);
            match rayon::ThreadPoolBuilder::new()
                .num_threads(regions.len())
                .thread_name(|i| format!("lumen-worker-{}", i))
                .build()
            {
                Ok(pool) => pool.scope(|s| {
                    for mut region in regions {
                        let frame = &frame;
                        let counter = &counter;
                        s.spawn(move |_| render_region(frame, world, &mut region, seed, counter));
                    }
                }),
                Err(e) => {
                    log::warn!("Could not start worker threads ({}), rendering sequentially", e);
                    for mut region in regions {
                        render_region(&frame, world, &mut region, seed, &counter);
                    }
                }
            }
        }

        progress.done();
        self.set_state(RenderState::Complete);
        fb
    }

    /// Single-threaded render; the caller holds the render lock.
    fn render_single(&self, world: &dyn Hittable, progress: &dyn ProgressReporter) -> Framebuffer {
        let (frame, seed) = self.begin();
        let mut fb = Framebuffer::new(frame.image_width, frame.image_height);

        let counter = LineCounter::new(frame.image_height, progress);
        let all_rows = [0..frame.image_height];
        for mut region in fb.regions_mut(&all_rows) {
            render_region(&frame, world, &mut region, seed, &counter);
        }

        progress.done();
        self.set_state(RenderState::Complete);
        fb
    }

    fn begin(&self) -> (CameraFrame, u64) {
        self.set_state(RenderState::Initializing);
        let frame = self.initialize();
        let seed = self.seed().unwrap_or_else(rand::random);
        log::info!(
            "Rendering {}x{} at {} samples per pixel, max depth {}",
            frame.image_width,
            frame.image_height,
            frame.samples_per_pixel,
            frame.max_depth
        );
        log::debug!("Render seed {}", seed);
        self.set_state(RenderState::Rendering);
        (frame, seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dielectric, HittableList, Lambertian, Metal, SilentProgress, Sphere};
    use lumen_core::OutputFormat;
    use lumen_math::{Color, Vec3};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::{mpsc, Mutex};
    use std::time::Duration;

    fn small_scene() -> HittableList {
        let mut world = HittableList::new();
        world.add(Sphere::new(
            Vec3::new(0.0, -100.5, -1.0),
            100.0,
            Lambertian::new(Color::new(0.8, 0.8, 0.0)),
        ));
        world.add(Sphere::new(
            Vec3::new(0.0, 0.0, -1.2),
            0.5,
            Lambertian::new(Color::new(0.1, 0.2, 0.5)),
        ));
        world.add(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, Dielectric::new(1.5)));
        world.add(Sphere::new(
            Vec3::new(1.0, 0.0, -1.0),
            0.5,
            Metal::new(Color::new(0.8, 0.6, 0.2), 0.4),
        ));
        world
    }

    fn small_camera() -> Camera {
        Camera::new()
            .with_aspect_ratio(16.0 / 9.0)
            .with_image_width(32)
            .with_quality(4, 6)
            .with_lens(90.0, 0.0, 1.0)
            .with_seed(1234)
    }

    fn ppm(fb: &Framebuffer) -> Vec<u8> {
        let mut out = Vec::new();
        fb.write_to(&mut out, OutputFormat::Ppm).unwrap();
        out
    }

    fn fixed(n: usize) -> ThreadCount {
        ThreadCount::Fixed(NonZeroUsize::new(n).unwrap())
    }

    #[test]
    fn test_thread_count_from_i64() {
        assert_eq!(ThreadCount::from_i64(0), Ok(ThreadCount::Auto));
        assert_eq!(ThreadCount::from_i64(3), Ok(fixed(3)));
        assert_eq!(
            ThreadCount::from_i64(-2),
            Err(RenderError::InvalidThreadCount(-2))
        );
        assert!(ThreadCount::Auto.resolve() >= 1);
        assert_eq!(fixed(5).resolve(), 5);
    }

    #[test]
    fn test_partition_covers_all_rows() {
        for height in 1..40u32 {
            for n in 1..12usize {
                let ranges = partition_scanlines(height, n);
                assert_eq!(ranges.len(), n.min(height as usize));

                let mut next = 0;
                for range in &ranges {
                    assert_eq!(range.start, next);
                    assert!(range.end > range.start);
                    next = range.end;
                }
                assert_eq!(next, height);
            }
        }
    }

    #[test]
    fn test_partition_last_absorbs_remainder() {
        let ranges = partition_scanlines(10, 3);
        assert_eq!(ranges, vec![0..3, 3..6, 6..10]);

        let ranges = partition_scanlines(2, 8);
        assert_eq!(ranges, vec![0..1, 1..2]);

        assert!(partition_scanlines(0, 4).is_empty());
    }

    #[test]
    fn test_render_dimensions_and_state() {
        let camera = small_camera();
        let fb = camera.render(&small_scene(), &SilentProgress);

        assert_eq!(fb.width(), 32);
        assert_eq!(fb.height(), 18);
        assert_eq!(camera.state(), RenderState::Complete);
    }

    #[test]
    fn test_same_seed_same_image() {
        let world = small_scene();
        let camera = small_camera();

        let a = ppm(&camera.render(&world, &SilentProgress));
        let b = ppm(&camera.render(&world, &SilentProgress));
        assert_eq!(a, b);
    }

    #[test]
    fn test_output_independent_of_thread_count() {
        let world = small_scene();
        let camera = small_camera();

        let single = ppm(&camera.render(&world, &SilentProgress));
        for n in [1, 2, 3, 7, 64] {
            let threaded = ppm(&camera.render_threaded(&world, fixed(n), &SilentProgress));
            assert_eq!(single, threaded, "{} threads", n);
        }
        let auto = ppm(&camera.render_threaded(&world, ThreadCount::Auto, &SilentProgress));
        assert_eq!(single, auto);
    }

    struct CountingProgress {
        started: AtomicU32,
        lines: AtomicU32,
        last: AtomicU32,
        done: AtomicU32,
    }

    impl CountingProgress {
        fn new() -> Self {
            Self {
                started: AtomicU32::new(0),
                lines: AtomicU32::new(0),
                last: AtomicU32::new(u32::MAX),
                done: AtomicU32::new(0),
            }
        }
    }

    impl ProgressReporter for CountingProgress {
        fn start(&self, total: u32) {
            self.started.store(total, Ordering::SeqCst);
        }

        fn line(&self, remaining: u32) {
            self.lines.fetch_add(1, Ordering::SeqCst);
            self.last.fetch_min(remaining, Ordering::SeqCst);
        }

        fn done(&self) {
            assert_eq!(self.last.load(Ordering::SeqCst), 0);
            self.done.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_progress_reports_every_line() {
        let world = small_scene();
        let camera = small_camera();

        for threads in [fixed(1), fixed(4)] {
            let progress = CountingProgress::new();
            camera.render_threaded(&world, threads, &progress);

            assert_eq!(progress.started.load(Ordering::SeqCst), 18);
            assert_eq!(progress.lines.load(Ordering::SeqCst), 18);
            assert_eq!(progress.done.load(Ordering::SeqCst), 1);
        }
    }

    /// Keeps every remaining-line count in the order the reporter saw it.
    struct RecordingProgress {
        values: Mutex<Vec<u32>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn start(&self, _total: u32) {}

        fn line(&self, remaining: u32) {
            self.values.lock().unwrap().push(remaining);
            // Give other bands a chance to interleave
            std::thread::yield_now();
        }

        fn done(&self) {}
    }

    #[test]
    fn test_progress_only_counts_down() {
        let world = small_scene();
        let camera = small_camera()
            .with_aspect_ratio(0.25)
            .with_image_width(16)
            .with_quality(1, 2);
        let height = camera.image_height();
        assert_eq!(height, 64);

        for _ in 0..4 {
            let progress = RecordingProgress {
                values: Mutex::new(Vec::new()),
            };
            camera.render_threaded(&world, fixed(8), &progress);

            let values = progress.values.into_inner().unwrap();
            assert_eq!(values.len(), height as usize);
            assert!(values.windows(2).all(|w| w[0] > w[1]), "{:?}", values);
            assert_eq!(values.first(), Some(&(height - 1)));
            assert_eq!(values.last(), Some(&0));
        }
    }

    /// Holds the first line of a render until the test releases it.
    struct GatedProgress {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl ProgressReporter for GatedProgress {
        fn start(&self, _total: u32) {
            let _ = self.entered.lock().unwrap().send(());
            let _ = self.release.lock().unwrap().recv();
        }
        fn line(&self, _remaining: u32) {}
        fn done(&self) {}
    }

    #[test]
    fn test_second_render_waits_for_first() {
        let world = small_scene();
        let camera = small_camera().with_image_width(8);

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let gated = GatedProgress {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        let second_finished = AtomicBool::new(false);

        std::thread::scope(|s| {
            let first = s.spawn(|| camera.render(&world, &gated));

            // First render now holds the lock
            entered_rx.recv().unwrap();
            assert_eq!(camera.state(), RenderState::Rendering);

            let second = s.spawn(|| {
                let fb = camera.render_threaded(&world, fixed(2), &SilentProgress);
                second_finished.store(true, Ordering::SeqCst);
                fb
            });

            std::thread::sleep(Duration::from_millis(100));
            assert!(!second_finished.load(Ordering::SeqCst));

            release_tx.send(()).unwrap();
            let a = first.join().unwrap();
            let b = second.join().unwrap();

            assert!(second_finished.load(Ordering::SeqCst));
            assert_eq!(ppm(&a), ppm(&b));
        });
    }

    #[test]
    fn test_single_thread_fallback_does_not_deadlock() {
        let world = small_scene();
        let camera = small_camera();

        // Takes the lock, then runs the single-threaded path under it
        let fb = camera.render_threaded(&world, fixed(1), &SilentProgress);
        assert_eq!(fb.height(), 18);

        // Lock was released
        let fb = camera.render(&world, &SilentProgress);
        assert_eq!(fb.height(), 18);
    }

    #[test]
    fn test_two_by_two_sphere_image() {
        // The camera sits inside a closed sphere, so no path reaches the sky
        let mut world = HittableList::new();
        world.add(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            10.0,
            Lambertian::new(Color::new(0.5, 0.5, 0.5)),
        ));
        let camera = Camera::new()
            .with_image_width(2)
            .with_quality(4, 4)
            .with_lens(90.0, 0.0, 1.0)
            .with_seed(7);

        let expected = b"P3\n2 2\n255\n0 0 0\n0 0 0\n0 0 0\n0 0 0\n";
        let single = ppm(&camera.render(&world, &SilentProgress));
        let threaded = ppm(&camera.render_threaded(&world, fixed(2), &SilentProgress));
        assert_eq!(single, expected.to_vec());
        assert_eq!(threaded, expected.to_vec());
    }
}
