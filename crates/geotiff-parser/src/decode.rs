//! Decoding TIFF bytes into grids.

use std::io::Cursor;
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tiff::ColorType;
use tracing::debug;

use crate::error::{GeoTiffError, GeoTiffResult};
use raster_common::DecodedGrid;

/// GDAL's private tag holding the nodata value as ASCII text.
pub const GDAL_NODATA_TAG: u16 = 42113;

/// Decode a single-band TIFF from memory.
///
/// Integer sample formats are widened to f32. Samples equal to the GDAL
/// nodata value (when the tag is present) become NaN.
pub fn parse_grid(bytes: &[u8]) -> GeoTiffResult<DecodedGrid> {
    let mut decoder = Decoder::new(Cursor::new(bytes))?.with_limits(Limits::unlimited());

    match decoder.colortype()? {
        ColorType::Gray(_) => {}
        other => {
            return Err(GeoTiffError::Unsupported(format!(
                "expected a single band, found {:?}",
                other
            )))
        }
    }

    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);
    if width == 0 || height == 0 {
        return Err(GeoTiffError::InvalidFormat("empty image".to_string()));
    }

    let nodata = read_nodata(&mut decoder);
    let mut data = samples_to_f32(decoder.read_image()?);

    if data.len() != width * height {
        return Err(GeoTiffError::InvalidFormat(format!(
            "{} samples for a {}x{} image",
            data.len(),
            width,
            height
        )));
    }

    if let Some(nodata) = nodata {
        mask_nodata(&mut data, nodata);
    }

    debug!(width, height, nodata = ?nodata, "Decoded GeoTIFF");

    DecodedGrid::new(data, width, height)
        .ok_or_else(|| GeoTiffError::InvalidFormat("grid size mismatch".to_string()))
}

/// Decode a TIFF file from disk.
pub fn parse_grid_file(path: impl AsRef<Path>) -> GeoTiffResult<DecodedGrid> {
    let bytes = std::fs::read(path)?;
    parse_grid(&bytes)
}

fn read_nodata<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<f32> {
    decoder
        .get_tag_ascii_string(Tag::Unknown(GDAL_NODATA_TAG))
        .ok()
        .and_then(|s| parse_nodata(&s))
}

/// Parse the nodata text GDAL writes ("-9999", "nan", "-3.4e+38\0").
fn parse_nodata(text: &str) -> Option<f32> {
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if text.eq_ignore_ascii_case("nan") {
        return Some(f32::NAN);
    }
    text.parse::<f64>().ok().map(|v| v as f32)
}

fn mask_nodata(data: &mut [f32], nodata: f32) {
    if nodata.is_nan() {
        return;
    }
    for v in data.iter_mut() {
        if *v == nodata {
            *v = f32::NAN;
        }
    }
}

fn samples_to_f32(result: DecodingResult) -> Vec<f32> {
    match result {
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f32).collect(),
    }
}
