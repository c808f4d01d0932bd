//! Decoded raster grids.

use serde::{Deserialize, Serialize};

/// A single-band floating-point raster in row-major order, row 0 at the
/// north edge. Missing samples are NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedGrid {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl DecodedGrid {
    /// Wrap row-major samples. Returns `None` unless
    /// `data.len() == width * height`.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> Option<Self> {
        if width.checked_mul(height)? != data.len() {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample at `(col, row)`, or `None` outside the grid.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Sample at `(col, row)` if it is present and finite.
    pub fn finite_at(&self, col: usize, row: usize) -> Option<f32> {
        self.get(col, row).filter(|v| v.is_finite())
    }

    /// Fraction of finite samples.
    pub fn valid_ratio(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let valid = self.data.iter().filter(|v| v.is_finite()).count();
        valid as f64 / self.data.len() as f64
    }
}
