//! Lumen renderer - CPU path tracing
//!
//! A Monte Carlo path tracer over spheres with diffuse, metal and glass
//! materials. Renders are reproducible from a seed and split into bands of
//! scanlines across worker threads.
//!
//! ```ignore
//! use lumen_renderer::{Camera, HittableList, Lambertian, Sphere, ThreadCount, Vec3};
//!
//! let mut world = HittableList::new();
//! world.add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, Lambertian::new(Vec3::splat(0.5))));
//!
//! let camera = Camera::new().with_image_width(400).with_seed(7);
//! let fb = camera.render_threaded(&world, ThreadCount::Auto, &*lumen_renderer::progress::detect());
//! ```

mod camera;
mod hittable;
mod material;
pub mod progress;
pub mod random;
mod renderer;
mod scheduler;
mod sphere;

pub use camera::{Camera, CameraFrame, RenderState};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Dielectric, Lambertian, Material, Metal, Scatter, ScatterResult};
pub use progress::{AnsiProgress, PlainProgress, ProgressReporter, SilentProgress};
pub use renderer::{ray_color, render_pixel, row_rng, sky_gradient, T_MIN};
pub use scheduler::{partition_scanlines, RenderError, RenderResult, ThreadCount};
pub use sphere::Sphere;

/// Re-export common math types from lumen_math
pub use lumen_math::{Color, Interval, Point3, Ray, Vec3};
