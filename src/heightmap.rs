//! Noise-based heightmap generation.
//!
//! Produces the starting terrain for erosion: multi-octave Perlin fBm mapped
//! to `[0, 1]`, optionally rotated and blended with a finer detail layer.

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::tilemap::{Tilemap, TilemapError};

// =============================================================================
// TERRAIN PARAMETERS
// =============================================================================

/// Parameters for terrain generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Number of noise octaves
    pub octaves: u32,
    /// Amplitude decay per octave (0.0-1.0)
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
    /// Feature size relative to the larger map side (1.0 = one noise period per map)
    pub scale_factor: f64,
    /// Rotation of the sampling grid about the map centre, in radians
    pub rotation: f64,
    /// Weight of the detail layer (0.0 = base only, 1.0 = detail only)
    pub detail_blend: f32,
    /// Detail layer feature size relative to the base layer
    pub detail_scale: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
            scale_factor: 1.0,
            rotation: 0.0,
            detail_blend: 0.0,
            detail_scale: 0.25,
        }
    }
}

// =============================================================================
// GENERATION
// =============================================================================

/// Generate a `[0, 1]` heightmap of the given size.
pub fn generate_heightmap(width: usize, height: usize, params: &TerrainParams, seed: u64) -> Tilemap<f32> {
    let base = noise_field(width, height, params, params.scale_factor, seed);

    let weight = params.detail_blend.clamp(0.0, 1.0);
    if weight == 0.0 {
        return base;
    }

    let detail = noise_field(
        width,
        height,
        params,
        params.scale_factor * params.detail_scale,
        seed.wrapping_add(1),
    );
    blend_fields(&base, &detail, weight)
}

/// Linear mix `base * (1 - weight) + overlay * weight`, with `weight` clamped
/// to `[0, 1]`. Both maps must have the same dimensions.
pub fn blend_heightmap(
    base: &Tilemap<f32>,
    overlay: &Tilemap<f32>,
    weight: f32,
) -> Result<Tilemap<f32>, TilemapError> {
    base.check_shape(overlay)?;
    Ok(blend_fields(base, overlay, weight.clamp(0.0, 1.0)))
}

fn blend_fields(base: &Tilemap<f32>, overlay: &Tilemap<f32>, weight: f32) -> Tilemap<f32> {
    let mut result = base.clone();
    for (x, y, h) in result.iter_mut() {
        *h = *h * (1.0 - weight) + *overlay.get(x, y) * weight;
    }
    result
}

/// Sample one fBm layer over the grid.
fn noise_field(width: usize, height: usize, params: &TerrainParams, scale_factor: f64, seed: u64) -> Tilemap<f32> {
    let perlin = Perlin::new(seed as u32);
    let scale = (width.max(height) as f64 * scale_factor).max(f64::EPSILON);

    let (sin_r, cos_r) = params.rotation.sin_cos();
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;

    let mut map = Tilemap::new_with(width, height, 0.0f32);
    for (x, y, h) in map.iter_mut() {
        let dx = x as f64 - cx;
        let dy = y as f64 - cy;
        let rx = dx * cos_r - dy * sin_r + cx;
        let ry = dx * sin_r + dy * cos_r + cy;

        let n = fbm_noise(
            &perlin,
            rx / scale,
            ry / scale,
            params.octaves,
            params.persistence,
            params.lacunarity,
        );
        *h = ((n + 1.0) / 2.0).clamp(0.0, 1.0) as f32;
    }
    map
}

/// Fractal Brownian motion, normalized by the summed amplitudes.
fn fbm_noise(
    noise: &impl NoiseFn<f64, 2>,
    x: f64,
    y: f64,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        total += amplitude * noise.get([x * frequency, y * frequency]);
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    if max_value > 0.0 { total / max_value } else { 0.0 }
}
