//! Bounding box and raster georeferencing.

use serde::{Deserialize, Serialize};

use crate::error::{RasterError, RasterResult};

/// A geographic bounding box in degrees (EPSG:4326).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Default for BoundingBox {
    /// Ikuta Ryokuchi park, Kawasaki.
    fn default() -> Self {
        Self::new(139.543, 35.594, 139.582, 35.626)
    }
}

impl BoundingBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Parse a "west,south,east,north" string.
    pub fn parse(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))?;
        }

        let bbox = Self::new(values[0], values[1], values[2], values[3]);
        if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            return Err(BboxParseError::Degenerate(s.to_string()));
        }
        Ok(bbox)
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }

    /// Check if a point lies within this bbox (edges inclusive).
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lng >= self.west
            && point.lng <= self.east
            && point.lat >= self.south
            && point.lat <= self.north
    }
}

/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// Initial map view handed to the map widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: BoundingBox::default().center(),
            zoom: 15.0,
        }
    }
}

/// Georeferencing of one indicator's rasters: the configured bbox plus the
/// grid size of the first raster that decoded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialMeta {
    pub bbox: BoundingBox,
    pub width: usize,
    pub height: usize,
}

impl SpatialMeta {
    pub fn new(bbox: BoundingBox, width: usize, height: usize) -> Self {
        Self {
            bbox,
            width,
            height,
        }
    }

    /// Map a point to `(col, row)`. Row 0 is the north edge.
    pub fn pixel_of(&self, point: GeoPoint) -> RasterResult<(usize, usize)> {
        if !self.bbox.contains(point) || self.width == 0 || self.height == 0 {
            return Err(RasterError::OutOfArea {
                lng: point.lng,
                lat: point.lat,
            });
        }

        let fx = (point.lng - self.bbox.west) / self.bbox.width();
        let fy = (self.bbox.north - point.lat) / self.bbox.height();

        let col = ((fx * self.width as f64).floor() as i64).clamp(0, self.width as i64 - 1);
        let row = ((fy * self.height as f64).floor() as i64).clamp(0, self.height as i64 - 1);

        Ok((col as usize, row as usize))
    }

    /// Row-major offset of a point into the grid.
    pub fn offset_of(&self, point: GeoPoint) -> RasterResult<usize> {
        let (col, row) = self.pixel_of(point)?;
        Ok(row * self.width + col)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bbox format: {0}. Expected 'west,south,east,north'")]
    InvalidFormat(String),

    #[error("Invalid number in bbox: {0}")]
    InvalidNumber(String),

    #[error("Bbox has no area: {0}")]
    Degenerate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> SpatialMeta {
        SpatialMeta::new(BoundingBox::new(139.543, 35.594, 139.582, 35.626), 100, 80)
    }

    #[test]
    fn test_center_maps_to_middle_pixel() {
        let meta = meta();
        let (col, row) = meta.pixel_of(meta.bbox.center()).unwrap();
        assert!((49..=50).contains(&col), "col = {}", col);
        assert!((39..=40).contains(&row), "row = {}", row);
    }

    #[test]
    fn test_corners_clamp_into_grid() {
        let meta = meta();
        assert_eq!(meta.pixel_of(GeoPoint::new(139.543, 35.626)).unwrap(), (0, 0));
        assert_eq!(meta.pixel_of(GeoPoint::new(139.582, 35.594)).unwrap(), (99, 79));
    }

    #[test]
    fn test_west_of_bbox_is_out_of_area() {
        let err = meta().pixel_of(GeoPoint::new(139.5, 35.6)).unwrap_err();
        assert!(matches!(err, RasterError::OutOfArea { .. }));
    }

    #[test]
    fn test_offset_is_row_major() {
        let meta = SpatialMeta::new(BoundingBox::new(0.0, 0.0, 4.0, 2.0), 4, 2);
        // Second column of the southern row
        assert_eq!(meta.offset_of(GeoPoint::new(1.5, 0.5)).unwrap(), 5);
    }

    #[test]
    fn test_parse_bbox() {
        let bbox = BoundingBox::parse("139.543, 35.594, 139.582, 35.626").unwrap();
        assert_eq!(bbox, BoundingBox::default());
        assert!(BoundingBox::parse("1,2,3").is_err());
        assert!(BoundingBox::parse("1,2,x,4").is_err());
        assert!(BoundingBox::parse("3,2,1,4").is_err());
    }
}
