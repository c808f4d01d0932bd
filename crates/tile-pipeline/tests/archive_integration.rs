//! End-to-end tests against an on-disk archive, fetched through the default
//! URL fetcher.

use raster_common::{Indicator, TimeCodec, TimeIndex, YearMonth};
use test_utils::fixtures::RasterArchive;
use test_utils::generators::{create_ndvi_grid, with_nan_holes};
use tile_pipeline::{PipelineConfig, RasterService, TileOutcome};

fn service_for(archive: &RasterArchive) -> RasterService {
    let config = PipelineConfig {
        base_url: archive.root().to_string_lossy().into_owned(),
        end: Some(YearMonth::new(2016, 12)),
        prefetch_radius: 1,
        ..Default::default()
    };
    RasterService::from_config(config).unwrap()
}

#[tokio::test]
async fn test_render_from_disk() {
    let archive = RasterArchive::new(TimeCodec::default());
    let data = with_nan_holes(create_ndvi_grid(8, 6, 4), 5);
    archive.write_raster(Indicator::Ndvi, TimeIndex(4), &data, 8, 6);

    let service = service_for(&archive);
    let png = service
        .render_png(Indicator::Ndvi, TimeIndex(4))
        .await
        .unwrap()
        .expect("raster present");
    assert_eq!(&png[..4], b"\x89PNG");

    // NaN holes are transparent
    match service.render(Indicator::Ndvi, TimeIndex(4)).await.unwrap() {
        TileOutcome::Ready(tile) => {
            assert_eq!(tile.image.get_pixel(0, 0).0[3], 0);
            assert_eq!(tile.image.get_pixel(1, 0).0[3], renderer::DISPLAY_ALPHA);
        }
        TileOutcome::Missing => panic!("expected a tile"),
    }
}

#[tokio::test]
async fn test_absent_file_is_missing() {
    let archive = RasterArchive::new(TimeCodec::default());
    let service = service_for(&archive);

    assert!(service
        .render_png(Indicator::Evi, TimeIndex(2))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_summary_from_disk() {
    let archive = RasterArchive::new(TimeCodec::default());
    archive.write_summary(
        Indicator::Lst,
        r#"[{"year": 2016, "month": 7, "mean": 31.5, "max": 42.0, "min": 22.1, "valid_ratio": 0.6}]"#,
    );

    let service = service_for(&archive);
    let july = service
        .area_summary(Indicator::Lst, TimeIndex(6))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(july.max, Some(42.0));
}
