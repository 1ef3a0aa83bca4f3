//! Sampling helpers shared by the droplet simulation

use crate::tilemap::Tilemap;

/// Estimate the surface gradient at a floating-point position.
///
/// Edge differences of the enclosing 2x2 cell block are blended across the
/// other axis: the x difference is weighted by the fractional y offset and the
/// y difference by the fractional x offset. Positions are clamped so the
/// block never leaves the grid. Returns `(grad_x, grad_y)` pointing uphill.
///
/// The caller guarantees the map is at least 2x2; narrower maps panic in the clamp.
pub fn gradient_at(heightmap: &Tilemap<f32>, x: f32, y: f32) -> (f32, f32) {
    let x = x.clamp(0.0, heightmap.width as f32 - 1.001);
    let y = y.clamp(0.0, heightmap.height as f32 - 1.001);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(heightmap.width - 1);
    let y1 = (y0 + 1).min(heightmap.height - 1);

    let u = x - x0 as f32;
    let v = y - y0 as f32;

    let h00 = *heightmap.get(x0, y0);
    let h10 = *heightmap.get(x1, y0);
    let h01 = *heightmap.get(x0, y1);
    let h11 = *heightmap.get(x1, y1);

    let gx0 = h10 - h00;
    let gx1 = h11 - h01;
    let gy0 = h01 - h00;
    let gy1 = h11 - h10;

    (gx0 * (1.0 - v) + gx1 * v, gy0 * (1.0 - u) + gy1 * u)
}

/// Cell containing a floating-point position (truncation, no interpolation).
/// The caller guarantees the position lies inside the grid.
#[inline]
pub fn cell_of(x: f32, y: f32) -> (usize, usize) {
    (x as usize, y as usize)
}

/// Height of the cell containing a floating-point position.
#[inline]
pub fn cell_height(heightmap: &Tilemap<f32>, x: f32, y: f32) -> f32 {
    let (cx, cy) = cell_of(x, y);
    *heightmap.get(cx, cy)
}

/// Half-open bounds test against the grid extent.
#[inline]
pub fn in_bounds(heightmap: &Tilemap<f32>, x: f32, y: f32) -> bool {
    x >= 0.0 && y >= 0.0 && x < heightmap.width as f32 && y < heightmap.height as f32
}
