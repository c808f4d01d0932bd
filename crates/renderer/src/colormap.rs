//! Palettes and value-to-color mapping.
//!
//! A colormap is a [`ColorRange`] plus a [`Palette`]. Samples are clamped to
//! the range, normalized, and linearly interpolated between the two palette
//! stops that bracket them.

use std::fmt;

use raster_common::{ColorRange, Indicator};
use serde::{Deserialize, Serialize};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation, `t` in `[0, 1]`.
    pub fn lerp(&self, other: &Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// CSS hex notation, e.g. `#1a9850`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// Diverging red-yellow-green
const NDVI_STOPS: &[Rgb] = &[
    Rgb::new(165, 0, 38),
    Rgb::new(244, 109, 67),
    Rgb::new(254, 224, 139),
    Rgb::new(217, 239, 139),
    Rgb::new(102, 189, 99),
    Rgb::new(0, 104, 55),
];

// Brown to teal
const EVI_STOPS: &[Rgb] = &[
    Rgb::new(140, 81, 10),
    Rgb::new(216, 179, 101),
    Rgb::new(246, 232, 195),
    Rgb::new(128, 205, 193),
    Rgb::new(1, 102, 94),
];

// Dry soil to open water
const NDWI_STOPS: &[Rgb] = &[
    Rgb::new(166, 97, 26),
    Rgb::new(223, 194, 125),
    Rgb::new(247, 251, 255),
    Rgb::new(107, 174, 214),
    Rgb::new(8, 48, 107),
];

// Cold blue to hot red
const LST_STOPS: &[Rgb] = &[
    Rgb::new(49, 54, 149),
    Rgb::new(69, 117, 180),
    Rgb::new(171, 217, 233),
    Rgb::new(255, 255, 191),
    Rgb::new(253, 174, 97),
    Rgb::new(215, 48, 39),
    Rgb::new(165, 0, 38),
];

/// Ordered color stops, evenly spaced over the value range. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgb>", into = "Vec<Rgb>")]
pub struct Palette {
    stops: Vec<Rgb>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyPalette;

impl fmt::Display for EmptyPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("palette needs at least one color stop")
    }
}

impl std::error::Error for EmptyPalette {}

impl TryFrom<Vec<Rgb>> for Palette {
    type Error = EmptyPalette;

    fn try_from(stops: Vec<Rgb>) -> Result<Self, Self::Error> {
        Palette::new(stops).ok_or(EmptyPalette)
    }
}

impl From<Palette> for Vec<Rgb> {
    fn from(palette: Palette) -> Self {
        palette.stops
    }
}

impl Palette {
    /// Build a palette. Returns `None` for an empty stop list.
    pub fn new(stops: Vec<Rgb>) -> Option<Self> {
        if stops.is_empty() {
            return None;
        }
        Some(Self { stops })
    }

    /// The fixed palette of an indicator.
    pub fn for_indicator(indicator: Indicator) -> Self {
        let stops = match indicator {
            Indicator::Ndvi => NDVI_STOPS,
            Indicator::Evi => EVI_STOPS,
            Indicator::Ndwi => NDWI_STOPS,
            Indicator::Lst => LST_STOPS,
        };
        Self {
            stops: stops.to_vec(),
        }
    }

    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    pub fn first(&self) -> Rgb {
        self.stops[0]
    }

    pub fn last(&self) -> Rgb {
        self.stops[self.stops.len() - 1]
    }

    /// Color at normalized position `t` in `[0, 1]`.
    pub fn sample(&self, t: f32) -> Rgb {
        let n = self.stops.len();
        if n == 1 {
            return self.stops[0];
        }

        let scaled = t.clamp(0.0, 1.0) * (n - 1) as f32;
        let lower = (scaled.floor() as usize).min(n - 2);
        let frac = scaled - lower as f32;
        self.stops[lower].lerp(&self.stops[lower + 1], frac)
    }
}

/// Map a sample to a color. `None` means transparent (non-finite sample).
pub fn value_to_color(sample: f32, range: &ColorRange, palette: &Palette) -> Option<Rgb> {
    if !sample.is_finite() {
        return None;
    }
    Some(palette.sample(range.normalize(sample)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stop() -> Palette {
        Palette::new(vec![Rgb::new(0, 0, 0), Rgb::new(200, 100, 50)]).unwrap()
    }

    #[test]
    fn test_palette_serde_rejects_empty() {
        let json = serde_json::to_string(&two_stop()).unwrap();
        assert_eq!(json, r#"[{"r":0,"g":0,"b":0},{"r":200,"g":100,"b":50}]"#);
        assert_eq!(serde_json::from_str::<Palette>(&json).unwrap(), two_stop());

        assert!(serde_json::from_str::<Palette>("[]").is_err());
    }

    #[test]
    fn test_non_finite_is_transparent() {
        let range = ColorRange::new(0.0, 1.0);
        let palette = two_stop();
        assert_eq!(value_to_color(f32::NAN, &range, &palette), None);
        assert_eq!(value_to_color(f32::INFINITY, &range, &palette), None);
        assert_eq!(value_to_color(f32::NEG_INFINITY, &range, &palette), None);
    }

    #[test]
    fn test_range_ends_hit_first_and_last_stop() {
        for indicator in Indicator::ALL {
            let range = indicator.default_range();
            let palette = Palette::for_indicator(indicator);
            assert_eq!(value_to_color(range.min, &range, &palette), Some(palette.first()));
            assert_eq!(value_to_color(range.max, &range, &palette), Some(palette.last()));
        }
    }

    #[test]
    fn test_out_of_range_clamps() {
        let range = ColorRange::new(0.0, 1.0);
        let palette = two_stop();
        assert_eq!(value_to_color(-3.0, &range, &palette), Some(palette.first()));
        assert_eq!(value_to_color(7.0, &range, &palette), Some(palette.last()));
    }

    #[test]
    fn test_midpoint_interpolates() {
        let range = ColorRange::new(0.0, 1.0);
        let color = value_to_color(0.5, &range, &two_stop()).unwrap();
        assert_eq!(color, Rgb::new(100, 50, 25));
    }

    #[test]
    fn test_interior_stop_is_exact() {
        let palette = Palette::new(vec![
            Rgb::new(0, 0, 0),
            Rgb::new(10, 20, 30),
            Rgb::new(255, 255, 255),
        ])
        .unwrap();
        assert_eq!(palette.sample(0.5), Rgb::new(10, 20, 30));
    }

    #[test]
    fn test_single_stop_palette() {
        let palette = Palette::new(vec![Rgb::new(1, 2, 3)]).unwrap();
        assert_eq!(palette.sample(0.0), Rgb::new(1, 2, 3));
        assert_eq!(palette.sample(1.0), Rgb::new(1, 2, 3));
        assert!(Palette::new(Vec::new()).is_none());
    }

    #[test]
    fn test_hex() {
        assert_eq!(Rgb::new(26, 152, 80).to_hex(), "#1a9850");
    }
}
