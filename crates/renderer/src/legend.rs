//! Legend gradient strips.

use image::{Rgba, RgbaImage};

use crate::colormap::{value_to_color, Palette, Rgb};
use raster_common::ColorRange;

/// Sample the colormap from `range.max` (index 0) down to `range.min` (last
/// index) through [`value_to_color`].
pub fn legend_strip(range: &ColorRange, palette: &Palette, length: usize) -> Vec<Rgb> {
    match length {
        0 => Vec::new(),
        1 => vec![palette.sample(range.normalize(range.max))],
        _ => (0..length)
            .map(|i| {
                let value = range.max - range.span() * i as f32 / (length - 1) as f32;
                value_to_color(value, range, palette).unwrap_or_else(|| palette.first())
            })
            .collect(),
    }
}

/// Render a vertical, opaque legend bar: max at the top row, min at the bottom.
pub fn legend_image(range: &ColorRange, palette: &Palette, width: u32, height: u32) -> RgbaImage {
    let strip = legend_strip(range, palette, height as usize);
    RgbaImage::from_fn(width, height, |_, y| {
        let c = strip[y as usize];
        Rgba([c.r, c.g, c.b, 255])
    })
}
