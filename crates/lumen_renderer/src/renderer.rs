//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with bounded depth
//! - Anti-aliasing via multi-sampling
//! - A per-scanline random stream, so the image depends only on the seed

use std::sync::{Mutex, PoisonError};

use crate::camera::CameraFrame;
use crate::hittable::{HitRecord, Hittable};
use crate::material::Scatter;
use crate::progress::ProgressReporter;
use lumen_core::FramebufferRegion;
use lumen_math::{Color, Interval, Ray};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Smallest accepted hit distance; avoids self-intersection ("shadow acne").
pub const T_MIN: f32 = 0.001;

/// Compute the color seen by a ray.
///
/// Traces the ray through the scene, bouncing off surfaces and multiplying
/// in their attenuation. Returns black once `depth` bounces are used up or
/// when a surface absorbs the ray.
pub fn ray_color(ray: &Ray, depth: u32, world: &dyn Hittable, rng: &mut dyn RngCore) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    let mut rec = HitRecord::default();

    if !world.hit(ray, Interval::new(T_MIN, f32::INFINITY), &mut rec) {
        return sky_gradient(ray);
    }

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => result.attenuation * ray_color(&result.scattered, depth - 1, world, rng),
        None => Color::ZERO,
    }
}

/// Background: white at the horizon blending to light blue overhead.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Render a single pixel with multi-sampling.
///
/// Returns the averaged linear color.
pub fn render_pixel(
    frame: &CameraFrame,
    world: &dyn Hittable,
    i: u32,
    j: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..frame.samples_per_pixel {
        let ray = frame.get_ray(i, j, rng);
        pixel_color += ray_color(&ray, frame.max_depth, world, rng);
    }

    frame.samples_scale * pixel_color
}

/// Random stream for one scanline.
pub fn row_rng(seed: u64, row: u32) -> StdRng {
    // Spread consecutive rows across the seed space
    StdRng::seed_from_u64(seed ^ (row as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Shared countdown of unfinished scanlines.
///
/// The decrement and its progress report happen under one lock, so the
/// reporter sees a strictly decreasing sequence.
pub(crate) struct LineCounter<'a> {
    remaining: Mutex<u32>,
    reporter: &'a dyn ProgressReporter,
}

impl<'a> LineCounter<'a> {
    pub(crate) fn new(total: u32, reporter: &'a dyn ProgressReporter) -> Self {
        reporter.start(total);
        Self {
            remaining: Mutex::new(total),
            reporter,
        }
    }

    pub(crate) fn finish_line(&self) {
        let mut remaining = self.remaining.lock().unwrap_or_else(PoisonError::into_inner);
        *remaining = remaining.saturating_sub(1);
        self.reporter.line(*remaining);
    }

    pub(crate) fn remaining(&self) -> u32 {
        *self.remaining.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Render every row of `region`, left to right, top to bottom.
pub(crate) fn render_region(
    frame: &CameraFrame,
    world: &dyn Hittable,
    region: &mut FramebufferRegion<'_>,
    seed: u64,
    counter: &LineCounter<'_>,
) {
    for j in region.rows() {
        let mut rng = row_rng(seed, j);
        for i in 0..frame.image_width {
            let color = render_pixel(frame, world, i, j, &mut rng);
            region.write_pixel(j, i, color);
        }
        counter.finish_line();
    }
}
