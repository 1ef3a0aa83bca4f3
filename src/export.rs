//! Heightmap rendering and image export.

use std::path::Path;

use image::{imageops, ImageBuffer, Luma, Rgb, RgbImage};

use crate::tilemap::{Tilemap, TilemapError};

/// 16-bit grayscale image
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// How elevations map onto the 16-bit output range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HeightRange {
    /// Values are expected in `[0, 1]`; anything outside is clamped
    #[default]
    Unit,
    /// Stretch the map's own min..max over the full range
    Auto,
}

/// Convert a heightmap to 16-bit grayscale.
pub fn to_luma16(heightmap: &Tilemap<f32>, range: HeightRange) -> Gray16Image {
    let (low, span) = match range {
        HeightRange::Unit => (0.0, 1.0),
        HeightRange::Auto => {
            let (min_h, max_h) = heightmap.min_max();
            let span = max_h - min_h;
            (min_h, if span > 0.0 { span } else { 1.0 })
        }
    };

    ImageBuffer::from_fn(heightmap.width as u32, heightmap.height as u32, |x, y| {
        let h = *heightmap.get(x as usize, y as usize);
        let t = ((h - low) / span).clamp(0.0, 1.0);
        Luma([(t * u16::MAX as f32).round() as u16])
    })
}

/// Gaussian smoothing of the rendered image. `sigma <= 0` returns a copy.
pub fn smooth(image: &Gray16Image, sigma: f32) -> Gray16Image {
    if sigma > 0.0 {
        imageops::blur(image, sigma)
    } else {
        image.clone()
    }
}

/// Write a heightmap as a 16-bit grayscale PNG, optionally smoothed.
pub fn export_heightmap_png(
    heightmap: &Tilemap<f32>,
    path: impl AsRef<Path>,
    range: HeightRange,
    sigma: f32,
) -> Result<(), image::ImageError> {
    let img = smooth(&to_luma16(heightmap, range), sigma);
    img.save(path)
}

/// Per-cell `after - before`. Negative cells were eroded.
pub fn difference_map(before: &Tilemap<f32>, after: &Tilemap<f32>) -> Result<Tilemap<f32>, TilemapError> {
    before.check_shape(after)?;
    let mut diff = after.clone();
    for (x, y, h) in diff.iter_mut() {
        *h -= *before.get(x, y);
    }
    Ok(diff)
}

/// Render a difference map: red for removed material, blue for added, black
/// for unchanged. Intensity is relative to the largest change.
pub fn render_difference(diff: &Tilemap<f32>) -> RgbImage {
    let (min_d, max_d) = diff.min_max();
    let peak = min_d.abs().max(max_d.abs());
    let peak = if peak > 0.0 { peak } else { 1.0 };

    ImageBuffer::from_fn(diff.width as u32, diff.height as u32, |x, y| {
        let d = *diff.get(x as usize, y as usize) / peak;
        // Square root lifts small changes out of the black
        let level = (d.abs().sqrt() * 255.0) as u8;
        if d < 0.0 {
            Rgb([level, 0, 0])
        } else {
            Rgb([0, level / 3, level])
        }
    })
}

/// Lit terrain render: elevation colour ramp with diffuse shading from the
/// upper left. Heights are normalised to the map's own range first, so the
/// shading works the same on unit and metre-scale maps.
pub fn render_hillshade(heightmap: &Tilemap<f32>) -> RgbImage {
    let width = heightmap.width;
    let height = heightmap.height;

    let (min_h, max_h) = heightmap.min_max();
    let range = if max_h > min_h { max_h - min_h } else { 1.0 };
    let norm = |x: usize, y: usize| (*heightmap.get(x, y) - min_h) / range;

    // Light direction (from upper-left)
    let (lx, ly, lz) = {
        let (x, y, z) = (-0.7f32, -0.7f32, 0.5f32);
        let len = (x * x + y * y + z * z).sqrt();
        (x / len, y / len, z / len)
    };

    // Exaggeration so that a unit-range map shows relief at pixel scale
    let relief = width.max(height) as f32 * 0.05;

    ImageBuffer::from_fn(width as u32, height as u32, |px, py| {
        let (x, y) = (px as usize, py as usize);
        let h = norm(x, y);

        let h_left = if x > 0 { norm(x - 1, y) } else { h };
        let h_right = if x + 1 < width { norm(x + 1, y) } else { h };
        let h_up = if y > 0 { norm(x, y - 1) } else { h };
        let h_down = if y + 1 < height { norm(x, y + 1) } else { h };

        let nx = (h_left - h_right) * relief;
        let ny = (h_up - h_down) * relief;
        let nz = 1.0f32;
        let nlen = (nx * nx + ny * ny + nz * nz).sqrt();

        let diffuse = ((nx * lx + ny * ly + nz * lz) / nlen).max(0.0);
        let ambient = 0.3;
        let lighting = (ambient + (1.0 - ambient) * diffuse).min(1.0);

        let base = elevation_color(h);
        Rgb([
            (base[0] as f32 * lighting) as u8,
            (base[1] as f32 * lighting) as u8,
            (base[2] as f32 * lighting) as u8,
        ])
    })
}

/// Colour ramp for a normalised elevation: lowland green, brown slopes, grey rock, snow.
fn elevation_color(t: f32) -> [u8; 3] {
    if t < 0.3 {
        [80, 140, 60]
    } else if t < 0.6 {
        let s = (t - 0.3) / 0.3;
        [(80.0 + s * 80.0) as u8, (140.0 - s * 60.0) as u8, (60.0 - s * 20.0) as u8]
    } else if t < 0.85 {
        let v = 160.0 - (t - 0.6) / 0.25 * 40.0;
        [v as u8, (v - 10.0) as u8, (v - 20.0) as u8]
    } else {
        [240, 240, 245]
    }
}

/// Tile equally sized images into a grid, left to right then top to bottom.
pub fn tile_images(images: &[RgbImage], cols: usize) -> RgbImage {
    let Some(first) = images.first() else {
        return ImageBuffer::new(1, 1);
    };

    let cols = cols.max(1);
    let rows = images.len().div_ceil(cols);
    let (cell_w, cell_h) = first.dimensions();
    let gap = 4u32;

    let mut grid: RgbImage = ImageBuffer::from_pixel(
        cell_w * cols as u32 + gap * (cols as u32 - 1),
        cell_h * rows as u32 + gap * (rows as u32 - 1),
        Rgb([40, 40, 40]),
    );

    for (idx, img) in images.iter().enumerate() {
        let x = (idx % cols) as u32 * (cell_w + gap);
        let y = (idx / cols) as u32 * (cell_h + gap);
        imageops::replace(&mut grid, img, x as i64, y as i64);
    }

    grid
}
