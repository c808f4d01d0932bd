//! Test data generators for creating synthetic index rasters.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that a pixel lookup hit the right cell.
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0);  // col=1, row=0
/// assert_eq!(grid[10], 1.0);    // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a vegetation-index-like grid.
///
/// Values run from -0.2 at the west edge to 0.9 at the east edge, with a
/// small per-month shift so grids for different months differ.
pub fn create_ndvi_grid(width: usize, height: usize, month_index: u32) -> Vec<f32> {
    let shift = (month_index % 12) as f32 * 0.01;
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            let x = col as f32 / (width.max(2) - 1) as f32;
            data.push(-0.2 + x * 1.1 + shift);
        }
    }
    data
}

/// Creates a grid where each cell holds `value`.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Replaces every `stride`-th sample with NaN (masked cloud pixels).
pub fn with_nan_holes(mut data: Vec<f32>, stride: usize) -> Vec<f32> {
    if stride == 0 {
        return data;
    }
    for v in data.iter_mut().step_by(stride) {
        *v = f32::NAN;
    }
    data
}
