//! Simple path tracer example.
//!
//! Renders three spheres on a ground plane and saves to PPM format.

use lumen_core::OutputFormat;
use lumen_renderer::{
    progress, Camera, Color, Dielectric, HittableList, Lambertian, Metal, Sphere, ThreadCount,
    Vec3,
};
use std::fs::File;
use std::io::BufWriter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let world = build_scene();

    let camera = Camera::new()
        .with_aspect_ratio(16.0 / 9.0)
        .with_image_width(400)
        .with_quality(50, 10)
        .with_position(Vec3::new(-2.0, 2.0, 1.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_lens(20.0, 10.0, 3.4);

    let start = std::time::Instant::now();
    let image = camera.render_threaded(&world, ThreadCount::Auto, &*progress::detect());
    log::info!("Rendered in {:?}", start.elapsed());

    let filename = "output.ppm";
    let mut out = BufWriter::new(File::create(filename)?);
    image.write_to(&mut out, OutputFormat::Ppm)?;
    log::info!("Saved to {}", filename);
    Ok(())
}

fn build_scene() -> HittableList {
    let mut world = HittableList::new();

    // Ground
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

    // Hollow glass: an air bubble inside a glass ball
    world.add(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, Dielectric::new(1.5)));
    world.add(Sphere::new(
        Vec3::new(-1.0, 0.0, -1.0),
        0.4,
        Dielectric::new(1.0 / 1.5),
    ));

    world.add(Sphere::new(
        Vec3::new(1.0, 0.0, -1.0),
        0.5,
        Metal::new(Color::new(0.8, 0.6, 0.2), 1.0),
    ));

    world
}
