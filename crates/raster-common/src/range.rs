//! Display value ranges.

use serde::{Deserialize, Serialize};

use crate::error::{RasterError, RasterResult};

/// Value range mapped onto an indicator's palette.
///
/// Values below `min` take the first palette stop and values above `max`
/// take the last one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRange {
    pub min: f32,
    pub max: f32,
}

impl ColorRange {
    /// Build a range without validation. Use [`ColorRange::validated`] for
    /// user input.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Build a range from user input, rejecting non-finite bounds and
    /// `min >= max`.
    pub fn validated(min: f32, max: f32) -> RasterResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(RasterError::InvalidRange(
                "minimum and maximum must be numbers".to_string(),
            ));
        }
        if min >= max {
            return Err(RasterError::InvalidRange(format!(
                "minimum ({}) must be less than maximum ({})",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// Parse a range from the two text fields of a range editor.
    pub fn parse(min: &str, max: &str) -> RasterResult<Self> {
        let parse_bound = |s: &str| {
            s.trim().parse::<f32>().map_err(|_| {
                RasterError::InvalidRange(format!("'{}' is not a number", s.trim()))
            })
        };
        Self::validated(parse_bound(min)?, parse_bound(max)?)
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Normalize a value to `[0, 1]`, clamping outside the range.
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.span();
        if span <= 0.0 {
            return 0.0;
        }
        ((value.clamp(self.min, self.max) - self.min) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_rejects_equal_bounds() {
        let err = ColorRange::validated(5.0, 5.0).unwrap_err();
        assert!(matches!(err, RasterError::InvalidRange(_)));
    }

    #[test]
    fn test_validated_rejects_inverted_and_nan() {
        assert!(ColorRange::validated(1.0, 0.0).is_err());
        assert!(ColorRange::validated(f32::NAN, 1.0).is_err());
        assert!(ColorRange::validated(0.0, f32::INFINITY).is_err());
        assert!(ColorRange::validated(0.0, 0.6).is_ok());
    }

    #[test]
    fn test_parse_text_fields() {
        let range = ColorRange::parse(" -0.2", "0.9 ").unwrap();
        assert_eq!(range, ColorRange::new(-0.2, 0.9));

        let err = ColorRange::parse("low", "0.9").unwrap_err();
        assert!(err.to_string().contains("low"));
    }

    #[test]
    fn test_normalize_clamps() {
        let range = ColorRange::new(0.0, 10.0);
        assert_eq!(range.normalize(-5.0), 0.0);
        assert_eq!(range.normalize(5.0), 0.5);
        assert_eq!(range.normalize(50.0), 1.0);
    }
}
