//! Debug tool for comparing erosion presets visually
//! Renders one base terrain eroded with each preset as a hill-shaded grid

use std::error::Error;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use terrain_erosion::erosion::{self, DepositionMode, ErosionParams, ErosionPreset};
use terrain_erosion::export;
use terrain_erosion::heightmap::{self, TerrainParams};
use terrain_erosion::seeds::Seeds;

const WIDTH: usize = 256;
const HEIGHT: usize = 256;
const DROPS: usize = 40_000;
const SEED: u64 = 42;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    println!("Generating erosion comparison grid...");

    let seeds = Seeds::from_master(SEED);
    let base = heightmap::generate_heightmap(WIDTH, HEIGHT, &TerrainParams::default(), seeds.terrain);

    // First cell is the untouched terrain; the rest share the erosion seed
    let mut variants: Vec<(String, Option<ErosionParams>)> = vec![("no erosion".to_string(), None)];
    for &preset in ErosionPreset::all() {
        variants.push((preset.to_string(), Some(ErosionParams::from_preset(preset))));
    }
    variants.push((
        "default + terrain deposition".to_string(),
        Some(ErosionParams {
            deposition_mode: DepositionMode::Terrain,
            ..ErosionParams::default()
        }),
    ));

    let mut images = Vec::with_capacity(variants.len());
    for (idx, (name, params)) in variants.iter().enumerate() {
        let mut hm = base.clone();
        if let Some(params) = params {
            let mut rng = ChaCha8Rng::seed_from_u64(seeds.erosion);
            let stats = erosion::simulate(&mut hm, params, DROPS, &mut rng)?;
            println!(
                "  [{}] {:<28} eroded {:>10.3}  deposited {:>10.3}",
                idx, name, stats.total_eroded, stats.total_deposited
            );
        } else {
            println!("  [{}] {}", idx, name);
        }
        images.push(export::render_hillshade(&hm));
    }

    let grid = export::tile_images(&images, 3);
    grid.save("erosion_comparison.png")?;

    println!("Saved erosion_comparison.png (cells numbered left to right, top to bottom)");
    Ok(())
}
