//! Router-level tests against an in-memory archive.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use raster_api::{build_router, state::AppState};
use raster_common::{Indicator, TimeCodec, TimeIndex, UrlTemplates, YearMonth};
use serde_json::Value;
use storage::MemoryFetcher;
use test_utils::fixtures::encode_float_tiff;
use test_utils::generators::create_constant_grid;
use tile_pipeline::PipelineConfig;
use tower::ServiceExt;

const BASE: &str = "mem://archive";

fn url(indicator: Indicator, index: u32) -> String {
    UrlTemplates::with_base(BASE).raster_url(
        indicator,
        TimeCodec::default().to_calendar(TimeIndex(index)),
    )
}

/// 2016-01 through 2016-12, NDVI present except 2016-04.
fn app() -> (Router, Arc<AppState>) {
    let fetcher = MemoryFetcher::new();
    for index in 0..12 {
        if index != 3 {
            let data = create_constant_grid(4, 4, index as f32 / 20.0);
            fetcher.insert(url(Indicator::Ndvi, index), encode_float_tiff(&data, 4, 4, None));
        }
    }

    let config = PipelineConfig {
        base_url: BASE.to_string(),
        end: Some(YearMonth::new(2016, 12)),
        prefetch_radius: 0,
        ..Default::default()
    };
    let state = Arc::new(AppState::with_fetcher(config, Arc::new(fetcher)));
    (build_router(state.clone()), state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::put(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "ok");
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let (app, _) = app();
    let (status, _) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_indicators() {
    let (app, _) = app();
    let (status, body) = get(app, "/api/indicators").await;
    assert_eq!(status, StatusCode::OK);

    let body = json(&body);
    assert_eq!(body["total_months"], 12);
    assert_eq!(body["epoch"], "2016-01");
    assert_eq!(body["indicators"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_render_png() {
    let (app, _) = app();
    let (status, body) = get(app, "/render/ndvi/5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..4], b"\x89PNG");
}

#[tokio::test]
async fn test_render_missing_month_is_no_content() {
    let (app, _) = app();
    let (status, body) = get(app, "/render/ndvi/3").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_render_past_archive_end() {
    let (app, _) = app();
    let (status, _) = get(app, "/render/ndvi/12").await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_unknown_indicator() {
    let (app, _) = app();
    let (status, body) = get(app, "/render/savi/0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["status"], 404);
}

#[tokio::test]
async fn test_put_range_accepts_strings_and_numbers() {
    let (app, state) = app();

    let (status, body) = send(
        app.clone(),
        put_json("/range/ndvi", serde_json::json!({"min": "0.1", "max": "0.6"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert!((body["min"].as_f64().unwrap() - 0.1).abs() < 1e-6);

    let (status, _) = send(
        app,
        put_json("/range/ndvi", serde_json::json!({"min": -0.2, "max": 0.9})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let range = state.service.range(Indicator::Ndvi);
    assert!((range.min + 0.2).abs() < 1e-6);
    assert!((range.max - 0.9).abs() < 1e-6);
}

#[tokio::test]
async fn test_put_invalid_range_is_rejected() {
    let (app, state) = app();
    let before = state.service.range(Indicator::Ndvi);

    let (status, _) = send(
        app.clone(),
        put_json("/range/ndvi", serde_json::json!({"min": "0.8", "max": "0.2"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        app,
        put_json("/range/ndvi", serde_json::json!({"min": "low", "max": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(state.service.range(Indicator::Ndvi), before);
}

#[tokio::test]
async fn test_put_range_recolors_cached_rasters() {
    let (app, _) = app();
    let (status, _) = get(app.clone(), "/render/ndvi/5").await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        app,
        put_json("/range/ndvi", serde_json::json!({"min": 0.0, "max": 0.5})),
    )
    .await;
    assert_eq!(json(&body)["recolored"], 1);
}

#[tokio::test]
async fn test_delete_range_restores_default() {
    let (app, state) = app();
    state.service.set_range(Indicator::Ndvi, 0.3, 0.4).unwrap();

    let request = Request::delete("/range/ndvi").body(Body::empty()).unwrap();
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        state.service.range(Indicator::Ndvi),
        Indicator::Ndvi.default_range()
    );
}

#[tokio::test]
async fn test_timeseries() {
    let (app, state) = app();
    let center = state.service.bbox().center();
    let uri = format!("/timeseries/ndvi?lng={}&lat={}", center.lng, center.lat);

    let (status, body) = get(app, &uri).await;
    assert_eq!(status, StatusCode::OK);

    let series = json(&body);
    let points = series.as_array().unwrap();
    assert_eq!(points.len(), 12);
    assert!(points[3]["value"].is_null());
    assert!((points[5]["value"].as_f64().unwrap() - 0.25).abs() < 1e-6);
}

#[tokio::test]
async fn test_timeseries_outside_area() {
    let (app, state) = app();
    let west = state.service.bbox().west - 1.0;
    let uri = format!("/timeseries/ndvi?lng={}&lat=35.6", west);

    let (status, _) = get(app, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_legend() {
    let (app, _) = app();
    let (status, body) = get(app.clone(), "/legend/ndvi?steps=8").await;
    assert_eq!(status, StatusCode::OK);
    let legend = json(&body);
    assert_eq!(legend["colors"].as_array().unwrap().len(), 8);

    let (status, body) = get(app, "/legend/ndvi/png?width=10&height=50").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..4], b"\x89PNG");
}

#[tokio::test]
async fn test_cache_stats() {
    let (app, _) = app();
    get(app.clone(), "/render/ndvi/1").await;
    get(app.clone(), "/render/ndvi/1").await;

    let (status, body) = get(app, "/api/cache/stats").await;
    assert_eq!(status, StatusCode::OK);
    let stats = json(&body);
    assert_eq!(stats["entries"], 1);
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["active_indicator"], "ndvi");
}

#[tokio::test]
async fn test_summary_document_absent() {
    let (app, _) = app();
    let (status, _) = get(app, "/summary/ndvi/0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
