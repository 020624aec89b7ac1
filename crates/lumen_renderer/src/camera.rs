//! Camera for ray generation.
//!
//! `Camera` holds the user-facing settings. Each render derives a
//! `CameraFrame` from them once, and every worker thread reads the frame
//! without further synchronization.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::random::{random_in_unit_disk, sample_square};
use lumen_math::{Point3, Ray, Vec3};
use rand::RngCore;

/// Lifecycle of the most recent render on a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RenderState {
    Idle = 0,
    Initializing = 1,
    Rendering = 2,
    Complete = 3,
}

impl RenderState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RenderState::Initializing,
            2 => RenderState::Rendering,
            3 => RenderState::Complete,
            _ => RenderState::Idle,
        }
    }
}

/// Camera for generating rays into the scene.
pub struct Camera {
    // Image settings
    aspect_ratio: f32,
    image_width: u32,
    samples_per_pixel: u32,
    max_depth: u32,

    // Camera positioning
    look_from: Point3,
    look_at: Point3,
    vup: Vec3,

    // Lens settings
    vfov: f32,          // Vertical field of view in degrees
    defocus_angle: f32, // Variation angle of rays through each pixel
    focus_dist: f32,    // Distance from camera to plane of perfect focus

    seed: Option<u64>,

    // One render at a time per camera
    render_lock: Mutex<()>,
    state: AtomicU8,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            samples_per_pixel: 10,
            max_depth: 10,
            look_from: Point3::ZERO,
            look_at: Point3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 10.0,
            seed: None,
            render_lock: Mutex::new(()),
            state: AtomicU8::new(RenderState::Idle as u8),
        }
    }

    /// Set the ratio of image width over height.
    ///
    /// Zero, negative and non-finite ratios fall back to 1.0.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
        } else {
            log::warn!("Invalid aspect ratio {}, using 1.0", aspect_ratio);
            self.aspect_ratio = 1.0;
        }
        self
    }

    /// Set the rendered image width in pixels.
    pub fn with_image_width(mut self, image_width: u32) -> Self {
        self.image_width = image_width;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Fix the random seed, making renders reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    /// Image height derived from width and aspect ratio, at least 1.
    pub fn image_height(&self) -> u32 {
        ((self.image_width as f32 / self.aspect_ratio) as u32).max(1)
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// State of the current or most recent render.
    pub fn state(&self) -> RenderState {
        RenderState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: RenderState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Take the render lock, waiting for a render in progress to finish.
    pub(crate) fn lock_render(&self) -> MutexGuard<'_, ()> {
        match self.render_lock.try_lock() {
            Ok(guard) => guard,
            Err(std::sync::TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(std::sync::TryLockError::WouldBlock) => {
                log::warn!(
                    "Trying to render when already rendering! Thread will hang until previous job finishes."
                );
                self.render_lock
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
            }
        }
    }

    /// Compute the per-render derived state.
    pub fn initialize(&self) -> CameraFrame {
        let image_width = self.image_width;
        let image_height = self.image_height();
        let samples_scale = 1.0 / self.samples_per_pixel.max(1) as f32;
        let center = self.look_from;

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * (image_width as f32 / image_height as f32);

        // Calculate camera basis vectors
        let w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        // Viewport edges, v runs down the image
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let pixel_delta_u = viewport_u / image_width.max(1) as f32;
        let pixel_delta_v = viewport_v / image_height as f32;

        let viewport_upper_left = center - self.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius = self.focus_dist * (self.defocus_angle / 2.0).to_radians().tan();

        CameraFrame {
            image_width,
            image_height,
            samples_per_pixel: self.samples_per_pixel,
            max_depth: self.max_depth,
            samples_scale,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            defocus_angle: self.defocus_angle,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Camera {
    /// Copies the settings. The clone gets its own render lock and starts idle.
    fn clone(&self) -> Self {
        Self {
            aspect_ratio: self.aspect_ratio,
            image_width: self.image_width,
            samples_per_pixel: self.samples_per_pixel,
            max_depth: self.max_depth,
            look_from: self.look_from,
            look_at: self.look_at,
            vup: self.vup,
            vfov: self.vfov,
            defocus_angle: self.defocus_angle,
            focus_dist: self.focus_dist,
            seed: self.seed,
            render_lock: Mutex::new(()),
            state: AtomicU8::new(RenderState::Idle as u8),
        }
    }
}

impl std::fmt::Debug for Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Camera")
            .field("aspect_ratio", &self.aspect_ratio)
            .field("image_width", &self.image_width)
            .field("samples_per_pixel", &self.samples_per_pixel)
            .field("max_depth", &self.max_depth)
            .field("look_from", &self.look_from)
            .field("look_at", &self.look_at)
            .field("vup", &self.vup)
            .field("vfov", &self.vfov)
            .field("defocus_angle", &self.defocus_angle)
            .field("focus_dist", &self.focus_dist)
            .field("seed", &self.seed)
            .field("state", &self.state())
            .finish()
    }
}

/// Immutable viewport geometry for one render.
#[derive(Debug, Clone, Copy)]
pub struct CameraFrame {
    pub image_width: u32,
    pub image_height: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    /// 1 / samples_per_pixel
    pub samples_scale: f32,
    center: Point3,
    pixel00_loc: Point3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    defocus_angle: f32,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl CameraFrame {
    /// Generate a ray for pixel (i, j) with random sampling.
    ///
    /// `i` is the column and `j` the row, counted from the top-left.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    pub fn center(&self) -> Point3 {
        self.center
    }

    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Point3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}
