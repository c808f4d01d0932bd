//! Common test fixtures for raster pipeline tests.
//!
//! This module provides pre-defined areas and helpers that build GeoTIFF
//! bytes and on-disk archives shaped like the upstream pipeline output.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use raster_common::{Indicator, TimeCodec, TimeIndex, UrlTemplates};
use tempfile::TempDir;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

/// GDAL's ASCII nodata tag.
const GDAL_NODATA_TAG: u16 = 42113;

/// Common bounding box definitions for testing, as (west, south, east, north).
pub mod bbox {
    /// Ikuta Ryokuchi, the production area
    pub const IKUTA: (f64, f64, f64, f64) = (139.543, 35.594, 139.582, 35.626);

    /// A unit square for hand-checkable pixel math
    pub const UNIT: (f64, f64, f64, f64) = (0.0, 0.0, 1.0, 1.0);
}

/// Encode a single-band float32 TIFF in memory.
///
/// When `nodata` is set, the GDAL nodata tag is written so the parser masks
/// matching samples.
pub fn encode_float_tiff(data: &[f32], width: usize, height: usize, nodata: Option<f32>) -> Vec<u8> {
    assert_eq!(data.len(), width * height, "sample count must match size");

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buf).expect("create TIFF encoder");
        let mut image = encoder
            .new_image::<colortype::Gray32Float>(width as u32, height as u32)
            .expect("create TIFF image");
        if let Some(nodata) = nodata {
            let text = nodata.to_string();
            image
                .encoder()
                .write_tag(Tag::Unknown(GDAL_NODATA_TAG), text.as_str())
                .expect("write nodata tag");
        }
        image.write_data(data).expect("write TIFF samples");
    }
    buf.into_inner()
}

/// Encode an RGB TIFF, which the parser must reject as multi-band.
pub fn encode_rgb_tiff(width: usize, height: usize) -> Vec<u8> {
    let data = vec![128u8; width * height * 3];
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buf).expect("create TIFF encoder");
        encoder
            .write_image::<colortype::RGB8>(width as u32, height as u32, &data)
            .expect("write RGB image");
    }
    buf.into_inner()
}

/// A temporary directory laid out like the pipeline's `output/` folder:
/// `{indicator}/{indicator}_{yyyy}_{mm}.tif` and `summary_{indicator}.json`.
pub struct RasterArchive {
    dir: TempDir,
    codec: TimeCodec,
}

impl RasterArchive {
    pub fn new(codec: TimeCodec) -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
            codec,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// URL templates pointing at this archive (plain filesystem paths).
    pub fn templates(&self) -> UrlTemplates {
        UrlTemplates::with_base(&self.root().to_string_lossy())
    }

    /// Write one month's raster and return its path.
    pub fn write_raster(
        &self,
        indicator: Indicator,
        index: TimeIndex,
        data: &[f32],
        width: usize,
        height: usize,
    ) -> PathBuf {
        let url = self
            .templates()
            .raster_url(indicator, self.codec.to_calendar(index));
        let path = PathBuf::from(url);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create indicator dir");
        }
        std::fs::write(&path, encode_float_tiff(data, width, height, None)).expect("write raster");
        path
    }

    /// Write the summary JSON for an indicator.
    pub fn write_summary(&self, indicator: Indicator, json: &str) -> PathBuf {
        let path = PathBuf::from(self.templates().summary_url(indicator));
        std::fs::write(&path, json).expect("write summary");
        path
    }
}
