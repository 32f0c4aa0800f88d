//! Integration tests for the repair pass and its scheduler.
//!
//! Base tiles are written directly to the store to simulate a process that
//! crashed between writing uploads and rebuilding their pyramid.

use chrono::Utc;
use gridmapper::compose::{encode_png, grid_image_path, ImageStore};
use gridmapper::coord::{Coord, BASE_ZOOM, MAX_ZOOM};
use gridmapper::notify::NoOpNotifier;
use gridmapper::service::{MapService, ServiceConfig};
use gridmapper::store::{ImageRef, MapId, MapStore, MemoryStore, TenantId, TileData, TileStore};
use image::{Rgba, RgbaImage};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn tenant() -> TenantId {
    TenantId::new("guild").unwrap()
}

/// Store holding one map with base tiles but no pyramid.
fn crashed_store(dir: &TempDir, coords: &[Coord]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let images = ImageStore::new(dir.path().to_path_buf()).unwrap();
    let map = store.create_map(&tenant(), Utc::now()).unwrap().id;
    let png = encode_png(&RgbaImage::from_pixel(100, 100, Rgba([0, 0, 255, 255]))).unwrap();

    for coord in coords {
        let image = ImageRef::new(grid_image_path(&tenant(), &format!("g{}", coord)));
        images.write(&image, &png).unwrap();
        store
            .put_tile(
                &tenant(),
                TileData {
                    map,
                    coord: *coord,
                    zoom: BASE_ZOOM,
                    image,
                    updated: Utc::now(),
                },
            )
            .unwrap();
    }
    store
}

fn service_over(dir: &TempDir, store: Arc<MemoryStore>, max_tiles: usize) -> MapService {
    MapService::new(
        ServiceConfig::builder(dir.path())
            .repair_interval(Duration::from_millis(20))
            .repair_max_tiles(max_tiles)
            .build(),
        store,
        Arc::new(NoOpNotifier),
    )
    .unwrap()
}

#[test]
fn zero_budget_pass_does_nothing() {
    let dir = TempDir::new().unwrap();
    let store = crashed_store(&dir, &[Coord::ORIGIN]);
    let service = service_over(&dir, store.clone(), 0);

    let stats = service.repair(0, &CancellationToken::new()).unwrap();

    assert_eq!(stats.tiles_repaired, 0);
    assert_eq!(stats.maps_scanned, 0);
    assert!(store.tiles_for_map(&tenant(), MapId(1), 1).unwrap().is_empty());
}

#[test]
fn bounded_passes_finish_the_pyramid() {
    let dir = TempDir::new().unwrap();
    let coords: Vec<Coord> = (0..8).map(|x| Coord::new(x, -x)).collect();
    let store = crashed_store(&dir, &coords);
    let service = service_over(&dir, store, 5);
    let cancel = CancellationToken::new();

    let mut passes = 0;
    loop {
        let stats = service.repair(5, &cancel).unwrap();
        passes += 1;
        if stats.tiles_repaired == 0 {
            break;
        }
        assert!(stats.tiles_repaired <= 5);
        assert!(passes < 50, "repair should converge");
    }

    assert!(passes > 2);
    assert!(service
        .get_tile(&tenant(), MapId(1), Coord::ORIGIN, 0)
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn daemon_repairs_until_shutdown() {
    let dir = TempDir::new().unwrap();
    let store = crashed_store(&dir, &[Coord::new(-5, 9)]);
    let service = service_over(&dir, store.clone(), 100);
    let shutdown = CancellationToken::new();

    let handle = tokio::spawn(service.repair_daemon().run(shutdown.clone()));

    let top = Coord::new(-5, 9);
    let top = (0..MAX_ZOOM).fold(top, |c, _| c.parent());
    let mut built = false;
    for _ in 0..250 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if store
            .get_tile(&tenant(), MapId(1), top, MAX_ZOOM)
            .unwrap()
            .is_some()
        {
            built = true;
            break;
        }
    }

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("daemon should stop")
        .unwrap();
    assert!(built);
}
