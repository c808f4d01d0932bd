//! Image rendering for monthly index rasters.
//!
//! - Colormaps: per-indicator palettes and value-to-color mapping
//! - Compositing: decoded grid to semi-transparent RGBA overlay
//! - Legends: gradient strips sampled through the same colormap
//! - PNG encoding of display images

pub mod colormap;
pub mod compositor;
pub mod legend;
pub mod png;

pub use colormap::{value_to_color, EmptyPalette, Palette, Rgb};
pub use compositor::{composite, composite_grid, DISPLAY_ALPHA};
pub use legend::{legend_image, legend_strip};
pub use png::encode_png;
