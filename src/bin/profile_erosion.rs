//! Profiling tool to identify performance bottlenecks

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use terrain_erosion::erosion::{self, ErosionParams};
use terrain_erosion::export::{self, HeightRange};
use terrain_erosion::heightmap::{self, TerrainParams};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let width = 512;
    let height = 512;
    let drops = 70_000;
    let seed = 1337u64;

    println!("=== Performance Profiling ===");
    println!("Map size: {}x{} ({} cells)", width, height, width * height);
    println!();

    let start = Instant::now();
    let mut heightmap = heightmap::generate_heightmap(width, height, &TerrainParams::default(), seed);
    let terrain_time = start.elapsed();
    println!("Heightmap generation: {:?}", terrain_time);

    let params = ErosionParams::default();
    println!("\nErosion parameters:");
    println!("  Droplets: {}", drops);
    println!("  Max path: {}", params.max_path);
    println!();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let start = Instant::now();
    let stats = erosion::simulate(&mut heightmap, &params, drops, &mut rng)?;
    let erosion_time = start.elapsed();
    println!("Erosion simulation: {:?}", erosion_time);
    println!(
        "  {:.1} ns per step over {} steps",
        erosion_time.as_nanos() as f64 / stats.steps_taken.max(1) as f64,
        stats.steps_taken
    );

    let start = Instant::now();
    let img = export::smooth(&export::to_luma16(&heightmap, HeightRange::Unit), 2.0);
    let export_time = start.elapsed();
    println!("Render + blur: {:?} ({}x{})", export_time, img.width(), img.height());

    let total = terrain_time + erosion_time + export_time;
    println!("\n=== Summary ===");
    println!("Heightmap:        {:>8.2}% ({:?})", 100.0 * terrain_time.as_secs_f64() / total.as_secs_f64(), terrain_time);
    println!("Erosion:          {:>8.2}% ({:?})", 100.0 * erosion_time.as_secs_f64() / total.as_secs_f64(), erosion_time);
    println!("Render:           {:>8.2}% ({:?})", 100.0 * export_time.as_secs_f64() / total.as_secs_f64(), export_time);
    println!("─────────────────────────────────");
    println!("TOTAL:            {:>8}  {:?}", "100%", total);
    Ok(())
}
