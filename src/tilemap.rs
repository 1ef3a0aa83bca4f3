//! Rectangular 2D grid used for heightmaps and derived per-cell maps.
//!
//! Cells are addressed as `(x, y)`: `x` is the column in `[0, width)` and `y`
//! is the row in `[0, height)`. Storage is row-major, so `rows[y][x]` in
//! nested-row form maps to `get(x, y)`.

use thiserror::Error;

/// Errors raised while building a tilemap from external data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TilemapError {
    #[error("heightmap has no cells")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("buffer holds {found} cells, expected {expected} for {width}x{height}")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        found: usize,
    },
    #[error("expected a {expected_width}x{expected_height} map, got {width}x{height}")]
    ShapeMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
}

/// A 2D grid with no wrapping at any edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a tilemap from nested rows (`rows[y][x]`).
    /// Every row must have the same length as the first.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self, TilemapError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(TilemapError::Empty);
        }

        let mut data = Vec::with_capacity(width * rows.len());
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(TilemapError::RaggedRow {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
            data.extend_from_slice(cells);
        }

        Ok(Self {
            width,
            height: rows.len(),
            data,
        })
    }

    /// Wrap a row-major buffer.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, TilemapError> {
        if width * height != data.len() {
            return Err(TilemapError::SizeMismatch {
                width,
                height,
                expected: width * height,
                found: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Copy the grid back out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.data.chunks(self.width.max(1)).map(<[T]>::to_vec).collect()
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) outside {}x{}",
            self.width,
            self.height
        );
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Whether `other` has the same dimensions.
    pub fn same_shape<U>(&self, other: &Tilemap<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Error unless `other` has the same dimensions.
    pub fn check_shape<U>(&self, other: &Tilemap<U>) -> Result<(), TilemapError> {
        if self.same_shape(other) {
            Ok(())
        } else {
            Err(TilemapError::ShapeMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: other.width,
                height: other.height,
            })
        }
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data.iter_mut().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }
}

impl Tilemap<f32> {
    /// Lowest and highest value in the map.
    pub fn min_max(&self) -> (f32, f32) {
        let mut min_h = f32::MAX;
        let mut max_h = f32::MIN;
        for &h in &self.data {
            if h < min_h { min_h = h; }
            if h > max_h { max_h = h; }
        }
        (min_h, max_h)
    }

    /// Sum of all cells, accumulated in f64.
    pub fn total(&self) -> f64 {
        self.data.iter().map(|&h| h as f64).sum()
    }

    /// Largest absolute per-cell difference to another map of the same shape.
    pub fn max_abs_diff(&self, other: &Tilemap<f32>) -> f32 {
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }
}
