use kernels::camera::Camera;
use kernels::path::{calculate_path_color, trace_path};
use kernels::rng::Rng;
use rayon::prelude::*;
use shared_structs::{HitRecord, PixelBuffer, Point, TracerConfig, MAX_BOUNCES};

use crate::scene::Scene;

const GAMMA: f64 = 1.0 / 2.2;

fn gamma_correct(channel: f64) -> u8 {
    (channel.min(1.0).max(0.0).powf(GAMMA) * 255.0) as u8
}

fn shade_pixel(scene: &Scene, camera: &Camera, x: u32, y: u32, config: &TracerConfig, rng: &mut Rng) -> [u8; 4] {
    let mut color = shared_structs::Vector::ZERO;
    let scene_ref = scene.as_ref();

    for _ in 0..config.samples {
        let jitter_x = x as f64 + (rng.next_f64() - 0.5);
        let jitter_y = y as f64 + (rng.next_f64() - 0.5);
        let ray = camera.primary_ray(jitter_x, jitter_y);

        let mut path = [HitRecord {
            distance: 0.0,
            point: Point::ZERO,
            normal: shared_structs::Vector::ZERO,
            material_id: 0,
        }; MAX_BOUNCES as usize];
        let hits = trace_path(ray, &mut path, &scene.materials, &scene_ref, rng);
        color += calculate_path_color(&path[..hits], &scene.materials, scene.light.as_ref(), &scene_ref);
    }

    color /= config.samples as f64;
    [
        gamma_correct(color.x),
        gamma_correct(color.y),
        gamma_correct(color.z),
        255,
    ]
}

/// Renders the whole image on the calling thread with a single shared RNG
/// stream, iterating pixels in row-major order. Bit-identical across runs
/// given the same seed.
pub fn render_single_threaded(scene: &Scene, camera: &Camera, config: &TracerConfig) -> PixelBuffer {
    let mut buffer = PixelBuffer::new(config.width, config.height);
    let mut rng = Rng::new(config.seed);

    for y in 0..config.height {
        for x in 0..config.width {
            let rgba = shade_pixel(scene, camera, x, y, config, &mut rng);
            buffer.set_pixel(x, y, rgba);
        }
    }

    buffer
}

/// Renders the image split into horizontal scanline bands, one per `rayon`
/// worker. Each band gets an RNG stream derived from `(config.seed,
/// band_index)` and writes only into its own disjoint slice of the output
/// raster, so no synchronization beyond the final join is needed.
pub fn render_tile_parallel(scene: &Scene, camera: &Camera, config: &TracerConfig) -> PixelBuffer {
    let width = config.width;
    let height = config.height;
    let mut buffer = PixelBuffer::new(width, height);

    let row_bytes = width as usize * 4;
    buffer
        .pixels
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            let mut rng = Rng::for_tile(config.seed, y as u64);
            for x in 0..width {
                let rgba = shade_pixel(scene, camera, x, y as u32, config, &mut rng);
                let idx = x as usize * 4;
                row[idx..idx + 4].copy_from_slice(&rgba);
            }
        });

    buffer
}

/// Dispatches to the single-threaded or tile-parallel driver based on
/// `config.threads`. A thread count of 1 forces the deterministic
/// single-threaded path; anything higher uses the `rayon` global pool.
pub fn render(scene: &Scene, camera: &Camera, config: &TracerConfig) -> PixelBuffer {
    if config.threads <= 1 {
        render_single_threaded(scene, camera, config)
    } else {
        render_tile_parallel(scene, camera, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene_renders_all_black() {
        let scene = Scene::build(Vec::new(), Vec::new(), Vec::new());
        let camera = Camera::new(4, 4);
        let config = TracerConfig {
            width: 4,
            height: 4,
            samples: 1,
            ..Default::default()
        };
        let buffer = render_single_threaded(&scene, &camera, &config);
        for chunk in buffer.pixels.chunks(4) {
            assert_eq!(chunk, &[0, 0, 0, 255]);
        }
    }

    #[test]
    fn single_threaded_render_is_deterministic() {
        let materials = vec![shared_structs::Material {
            color: shared_structs::Vector::splat(0.5),
            emission: shared_structs::Vector::ONE,
            kind: shared_structs::MaterialKind::Diffuse,
            index_of_refraction: 1.0,
        }];
        let triangles = vec![shared_structs::Triangle::new(
            Point::new(-5.0, -5.0, -5.0),
            Point::new(5.0, -5.0, -5.0),
            Point::new(0.0, 5.0, -5.0),
            0,
        )];
        let scene = Scene::build(triangles, Vec::new(), materials);
        let camera = Camera::new(8, 8);
        let config = TracerConfig {
            width: 8,
            height: 8,
            samples: 2,
            seed: 99,
            ..Default::default()
        };
        let a = render_single_threaded(&scene, &camera, &config);
        let b = render_single_threaded(&scene, &camera, &config);
        assert_eq!(a.pixels, b.pixels);
    }
}
