//! Turning decoded grids into display images.

use image::RgbaImage;
use rayon::prelude::*;

use crate::colormap::{value_to_color, Palette};
use raster_common::{ColorRange, DecodedGrid};

/// Alpha of every colored pixel, so the base map shows through.
pub const DISPLAY_ALPHA: u8 = 200;

/// Minimum pixel count before rows are colored in parallel.
const PARALLEL_THRESHOLD: usize = 4096;

/// Render a row-major grid to an RGBA image.
///
/// Finite samples get their palette color at [`DISPLAY_ALPHA`]; non-finite
/// samples (and any samples missing from a short buffer) are fully
/// transparent. The output depends only on the inputs.
pub fn composite(
    data: &[f32],
    width: usize,
    height: usize,
    range: &ColorRange,
    palette: &Palette,
) -> RgbaImage {
    if width == 0 || height == 0 {
        return RgbaImage::new(width as u32, height as u32);
    }

    let mut pixels = vec![0u8; width * height * 4];

    let fill_row = |(y, row): (usize, &mut [u8])| {
        for x in 0..width {
            let sample = data.get(y * width + x).copied().unwrap_or(f32::NAN);
            if let Some(color) = value_to_color(sample, range, palette) {
                let px = &mut row[x * 4..x * 4 + 4];
                px[0] = color.r;
                px[1] = color.g;
                px[2] = color.b;
                px[3] = DISPLAY_ALPHA;
            }
        }
    };

    if width * height >= PARALLEL_THRESHOLD {
        pixels.par_chunks_mut(width * 4).enumerate().for_each(fill_row);
    } else {
        pixels.chunks_mut(width * 4).enumerate().for_each(fill_row);
    }

    RgbaImage::from_raw(width as u32, height as u32, pixels)
        .unwrap_or_else(|| RgbaImage::new(width as u32, height as u32))
}

/// Render a [`DecodedGrid`] to an RGBA image.
pub fn composite_grid(grid: &DecodedGrid, range: &ColorRange, palette: &Palette) -> RgbaImage {
    composite(grid.data(), grid.width(), grid.height(), range, palette)
}
