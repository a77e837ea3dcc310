use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use kernels::camera::Camera;
use metropolis::{driver, loader};
use shared_structs::TracerConfig;

/// Unbiased Monte-Carlo path tracer: renders a triangle/sphere scene with
/// diffuse, mirror and glass materials into a gamma-corrected PNG.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Wavefront OBJ scene to render.
    #[arg(long, default_value = "scenes/cornell.obj")]
    scene: PathBuf,

    #[arg(long, default_value_t = 500)]
    width: u32,

    #[arg(long, default_value_t = 500)]
    height: u32,

    #[arg(long, default_value_t = shared_structs::TOTAL_SAMPLES)]
    samples: u32,

    #[arg(long, default_value_t = TracerConfig::default().seed)]
    seed: u64,

    /// Number of render threads. 1 forces the deterministic single-threaded
    /// driver; anything higher renders on the rayon global pool.
    #[arg(long, default_value_t = num_cpus())]
    threads: usize,

    #[arg(long, default_value = "render.png")]
    output: PathBuf,
}

fn num_cpus() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = TracerConfig {
        width: args.width,
        height: args.height,
        samples: args.samples,
        fov_degrees: 39.0,
        seed: args.seed,
        threads: args.threads,
    };

    let load_start = Instant::now();
    let scene = match loader::load_scene(&args.scene) {
        Ok(scene) => scene,
        Err(err) => {
            log::error!("failed to load scene {}: {err}", args.scene.display());
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "loaded {}: {} triangles, {} spheres, {} materials in {:?}",
        args.scene.display(),
        scene.triangles.len(),
        scene.spheres.len(),
        scene.materials.len(),
        load_start.elapsed()
    );
    log::info!(
        "bvh built with {} nodes over {} primitives",
        scene.bvh_nodes.len(),
        scene.primitive_count()
    );

    let camera = Camera::frame_scene(config.width, config.height, &scene.bounding_box);

    let render_start = Instant::now();
    let buffer = driver::render(&scene, &camera, &config);
    let elapsed = render_start.elapsed();

    let rays_per_second = (config.width as f64 * config.height as f64 * config.samples as f64) / elapsed.as_secs_f64();
    log::info!(
        "rendered {}x{} in {:?} ({:.0} rays/sec)",
        config.width,
        config.height,
        elapsed,
        rays_per_second
    );

    if let Err(err) = image::save_buffer(
        &args.output,
        &buffer.pixels,
        buffer.width,
        buffer.height,
        image::ColorType::Rgba8,
    ) {
        log::error!("failed to write {}: {err}", args.output.display());
        return ExitCode::FAILURE;
    }
    log::info!("wrote {}", args.output.display());

    ExitCode::SUCCESS
}
