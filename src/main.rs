use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use terrain_erosion::erosion::{self, DepositionMode, ErosionParams, ErosionPreset};
use terrain_erosion::export::{self, HeightRange};
use terrain_erosion::heightmap::{self, TerrainParams};
use terrain_erosion::seeds::Seeds;

#[derive(Parser, Debug)]
#[command(name = "terrain_erosion")]
#[command(about = "Generate a noise heightmap and carve it with hydraulic erosion droplets")]
struct Args {
    /// Width of the heightmap in cells
    #[arg(short = 'W', long, default_value = "512")]
    width: usize,

    /// Height of the heightmap in cells
    #[arg(short = 'H', long, default_value = "512")]
    height: usize,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Override the derived terrain noise seed
    #[arg(long)]
    terrain_seed: Option<u64>,

    /// Override the derived droplet seed
    #[arg(long)]
    erosion_seed: Option<u64>,

    /// Number of droplets to simulate
    #[arg(short, long, default_value = "70000")]
    drops: usize,

    /// Noise octaves
    #[arg(long, default_value = "6")]
    octaves: u32,

    /// Amplitude decay per octave
    #[arg(long, default_value = "0.5")]
    persistence: f64,

    /// Frequency multiplier per octave
    #[arg(long, default_value = "2.0")]
    lacunarity: f64,

    /// Rotation of the noise field in radians
    #[arg(long, default_value = "0.0")]
    rotation: f64,

    /// Weight of a finer detail noise layer (0-1)
    #[arg(long, default_value = "0.0")]
    detail_blend: f32,

    /// Erosion preset (default, classic, gentle, aggressive)
    #[arg(short, long, default_value = "default")]
    preset: ErosionPreset,

    /// JSON file with erosion parameters (overrides the preset)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Add shed sediment back onto the terrain instead of discarding it
    #[arg(long)]
    deposit_to_terrain: bool,

    /// Output PNG for the eroded heightmap (16-bit grayscale)
    #[arg(short, long, default_value = "terrain_eroded.png")]
    output: PathBuf,

    /// Also write the un-eroded heightmap here
    #[arg(long)]
    raw_output: Option<PathBuf>,

    /// Write an erosion/deposition difference map here
    #[arg(long)]
    diff_output: Option<PathBuf>,

    /// Gaussian blur sigma applied to the exported image (0 disables)
    #[arg(long, default_value = "0.0")]
    blur: f32,

    /// Stretch the heightmap's own range over the 16-bit output instead of clamping 0-1
    #[arg(long)]
    auto_range: bool,
}

/// Master seed from the command line (or random), with per-stage overrides applied.
fn resolve_seeds(args: &Args) -> Seeds {
    let mut seeds = Seeds::from_master(args.seed.unwrap_or_else(rand::random));
    if let Some(seed) = args.terrain_seed {
        seeds = seeds.with_terrain(seed);
    }
    if let Some(seed) = args.erosion_seed {
        seeds = seeds.with_erosion(seed);
    }
    seeds
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let seeds = resolve_seeds(&args);
    println!("Generating terrain with seeds: {}", seeds);
    println!("Map size: {}x{}", args.width, args.height);

    let mut params = match &args.config {
        Some(path) => {
            println!("Loading erosion parameters from {}", path.display());
            ErosionParams::load_json(path)?
        }
        None => ErosionParams::from_preset(args.preset),
    };
    if args.deposit_to_terrain {
        params.deposition_mode = DepositionMode::Terrain;
    }

    let terrain_params = TerrainParams {
        octaves: args.octaves,
        persistence: args.persistence,
        lacunarity: args.lacunarity,
        rotation: args.rotation,
        detail_blend: args.detail_blend,
        ..Default::default()
    };

    println!("Generating heightmap...");
    let mut heightmap = heightmap::generate_heightmap(args.width, args.height, &terrain_params, seeds.terrain);
    let original = heightmap.clone();
    let (min_h, max_h) = heightmap.min_max();
    println!("Heightmap range: {:.4} to {:.4}", min_h, max_h);

    let range = if args.auto_range { HeightRange::Auto } else { HeightRange::Unit };
    if let Some(path) = &args.raw_output {
        export::export_heightmap_png(&original, path, range, args.blur)?;
        println!("Saved raw heightmap: {}", path.display());
    }

    println!("Simulating erosion ({} droplets, preset {})...", args.drops, args.preset);
    let mut rng = ChaCha8Rng::seed_from_u64(seeds.erosion);
    let stats = erosion::simulate(&mut heightmap, &params, args.drops, &mut rng)?;
    println!("{}", stats);

    let (min_h, max_h) = heightmap.min_max();
    println!("Eroded range: {:.4} to {:.4}", min_h, max_h);

    export::export_heightmap_png(&heightmap, &args.output, range, args.blur)?;
    println!("Saved eroded heightmap: {}", args.output.display());

    if let Some(path) = &args.diff_output {
        let diff = export::difference_map(&original, &heightmap)?;
        export::render_difference(&diff).save(path)?;
        println!("Saved difference map: {}", path.display());
    }

    Ok(())
}
