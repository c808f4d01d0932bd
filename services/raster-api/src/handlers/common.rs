//! Shared handler utilities.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use raster_common::{Indicator, RasterError};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

/// JSON error body with the status mapped from the error.
pub fn error_response(err: &RasterError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if !err.is_user_error() {
        warn!(error = %err, status = status.as_u16(), "Request failed");
    }
    let body = ErrorResponse {
        error: err.to_string(),
        status: status.as_u16(),
    };
    (status, Json(body)).into_response()
}

pub fn parse_indicator(name: &str) -> Result<Indicator, RasterError> {
    Ok(name.parse::<Indicator>()?)
}

pub fn png_response(bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        bytes,
    )
        .into_response()
}
