//! Tests for compositing grids into display images.

use raster_common::{ColorRange, DecodedGrid, Indicator};
use renderer::{composite, composite_grid, value_to_color, Palette, DISPLAY_ALPHA};
use test_utils::{create_ndvi_grid, with_nan_holes};

// ============================================================================
// composite tests
// ============================================================================

#[test]
fn test_composite_dimensions() {
    let data = create_ndvi_grid(100, 80, 0);
    let img = composite(
        &data,
        100,
        80,
        &Indicator::Ndvi.default_range(),
        &Palette::for_indicator(Indicator::Ndvi),
    );
    assert_eq!(img.width(), 100);
    assert_eq!(img.height(), 80);
}

#[test]
fn test_composite_matches_colormap() {
    let range = Indicator::Ndvi.default_range();
    let palette = Palette::for_indicator(Indicator::Ndvi);
    let data = with_nan_holes(create_ndvi_grid(128, 64, 4), 5);
    let img = composite(&data, 128, 64, &range, &palette);

    for (i, sample) in data.iter().enumerate() {
        let px = img.get_pixel((i % 128) as u32, (i / 128) as u32).0;
        match value_to_color(*sample, &range, &palette) {
            Some(c) => assert_eq!(px, [c.r, c.g, c.b, DISPLAY_ALPHA]),
            None => assert_eq!(px, [0, 0, 0, 0]),
        }
    }
}

#[test]
fn test_composite_is_deterministic() {
    let range = Indicator::Lst.default_range();
    let palette = Palette::for_indicator(Indicator::Lst);
    let data: Vec<f32> = (0..200 * 50).map(|i| (i % 50) as f32).collect();

    let a = composite(&data, 200, 50, &range, &palette);
    let b = composite(&data, 200, 50, &range, &palette);
    assert_eq!(a.as_raw(), b.as_raw());
}

#[test]
fn test_range_change_changes_colors_only() {
    let palette = Palette::for_indicator(Indicator::Ndvi);
    let data = create_ndvi_grid(32, 32, 0);
    let grid = DecodedGrid::new(data.clone(), 32, 32).unwrap();

    let before = composite_grid(&grid, &ColorRange::new(-0.2, 0.9), &palette);
    let after = composite_grid(&grid, &ColorRange::new(0.0, 0.6), &palette);

    assert_ne!(before.as_raw(), after.as_raw());
    assert_eq!(grid.data(), data.as_slice());
}

#[test]
fn test_short_buffer_is_transparent() {
    let palette = Palette::for_indicator(Indicator::Evi);
    let img = composite(&[0.5, 0.5], 2, 2, &ColorRange::new(0.0, 1.0), &palette);
    assert_eq!(img.get_pixel(0, 1).0[3], 0);
    assert_eq!(img.get_pixel(1, 0).0[3], DISPLAY_ALPHA);
}
