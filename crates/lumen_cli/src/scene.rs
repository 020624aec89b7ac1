//! Built-in scenes.

use std::sync::Arc;

use lumen_math::{Color, Point3, Vec3};
use lumen_renderer::random::{gen_f32, gen_range, random_vec3};
use lumen_renderer::{Camera, Dielectric, HittableList, Lambertian, Material, Metal, Sphere};
use rand::RngCore;

/// A world together with the camera that frames it.
pub struct Scene {
    pub world: HittableList,
    pub camera: Camera,
}

/// Large and small spheres on a ground plane, shot with a shallow depth of field.
///
/// The small spheres are placed at random from `rng`.
pub fn cover(rng: &mut dyn RngCore) -> Scene {
    let mut world = HittableList::new();

    let ground = Lambertian::new(Color::new(0.5, 0.5, 0.5));
    world.add(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, ground));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f32(rng);
            let center = Point3::new(
                a as f32 + 0.9 * gen_f32(rng),
                0.2,
                b as f32 + 0.9 * gen_f32(rng),
            );

            // Keep clear of the big metal sphere
            if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let material: Material = if choose_mat < 0.8 {
                let albedo = random_vec3(rng, 0.0, 1.0) * random_vec3(rng, 0.0, 1.0);
                Lambertian::new(albedo).into()
            } else if choose_mat < 0.95 {
                let albedo = random_vec3(rng, 0.5, 1.0);
                let fuzz = gen_range(rng, 0.0, 0.5);
                Metal::new(albedo, fuzz).into()
            } else {
                Dielectric::new(1.5).into()
            };
            world.add(Sphere::new(center, 0.2, material));
        }
    }

    world.add(Sphere::new(Point3::new(0.0, 1.0, 0.0), 1.0, Dielectric::new(1.5)));
    world.add(Sphere::new(
        Point3::new(-4.0, 1.0, 0.0),
        1.0,
        Lambertian::new(Color::new(0.4, 0.2, 0.1)),
    ));
    world.add(Sphere::new(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Metal::new(Color::new(0.7, 0.6, 0.5), 0.0),
    ));

    let camera = Camera::new()
        .with_aspect_ratio(16.0 / 9.0)
        .with_image_width(1200)
        .with_quality(500, 50)
        .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0);

    Scene { world, camera }
}

/// Five spheres in front of the camera, fast enough for a quick look.
pub fn quick() -> Scene {
    let mut world = HittableList::new();

    world.add(Sphere::new(
        Point3::new(0.0, -100.5, -1.0),
        100.0,
        Lambertian::new(Color::new(0.8, 0.8, 0.0)),
    ));
    world.add(Sphere::new(
        Point3::new(0.0, 0.0, -1.2),
        0.5,
        Lambertian::new(Color::new(0.1, 0.2, 0.5)),
    ));

    // Glass shell around an air bubble
    let glass = Arc::new(Material::from(Dielectric::new(1.5)));
    world.add(Sphere::with_shared(Point3::new(-1.0, 0.0, -1.0), 0.5, glass));
    world.add(Sphere::new(
        Point3::new(-1.0, 0.0, -1.0),
        0.4,
        Dielectric::new(1.0 / 1.5),
    ));

    world.add(Sphere::new(
        Point3::new(1.0, 0.0, -1.0),
        0.5,
        Metal::new(Color::new(0.8, 0.6, 0.2), 1.0),
    ));

    let camera = Camera::new()
        .with_aspect_ratio(16.0 / 9.0)
        .with_image_width(400)
        .with_quality(50, 20)
        .with_position(Point3::new(-2.0, 2.0, 1.0), Point3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_lens(20.0, 10.0, 3.4);

    Scene { world, camera }
}
