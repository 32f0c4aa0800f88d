//! Map service facade implementation.

use super::config::ServiceConfig;
use super::error::ServiceError;
use crate::compose::{ImageStore, PngCompositor};
use crate::config::METADATA_FILE_NAME;
use crate::coord::{from_exposed_zoom, Coord};
use crate::ingest::{GridIngest, IngestReport, UploadBatch};
use crate::notify::ChangeNotifier;
use crate::pyramid::{PyramidRebuilder, RepairDaemon, RepairStats};
use crate::store::{MapId, MapInfo, MapStore, MemoryStore, MetadataStore, TenantId, TileStore};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Bytes of a served tile plus its timestamp for HTTP caching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBlob {
    pub bytes: Vec<u8>,
    pub updated: DateTime<Utc>,
}

/// Snapshot-backed store opened by [`MapService::open`].
struct Snapshot {
    store: Arc<MemoryStore>,
    path: PathBuf,
}

/// High-level facade for map operations.
///
/// Wires the stores, compositor, notifier, ingest pipeline and rebuilder
/// together and converts zoom levels at the tile read boundary.
///
/// # Example
///
/// ```ignore
/// use gridmapper::service::{MapService, ServiceConfig};
/// use gridmapper::notify::NoOpNotifier;
///
/// let service = MapService::open(ServiceConfig::builder(root).build(), Arc::new(NoOpNotifier))?;
/// let report = service.ingest(&batch)?;
/// service.persist()?;
/// ```
pub struct MapService {
    config: ServiceConfig,
    store: Arc<dyn MetadataStore>,
    images: Arc<ImageStore>,
    ingest: GridIngest,
    rebuilder: PyramidRebuilder,
    snapshot: Option<Snapshot>,
}

impl MapService {
    /// Create a service over an existing metadata store.
    pub fn new(
        config: ServiceConfig,
        store: Arc<dyn MetadataStore>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Result<Self, ServiceError> {
        let images = Arc::new(ImageStore::with_tile_size(
            config.storage_root().to_path_buf(),
            config.tile_size(),
        )?);
        let compositor = Arc::new(PngCompositor::new(Arc::clone(&images)));
        let rebuilder =
            PyramidRebuilder::new(Arc::clone(&store), compositor, Arc::clone(&notifier));
        let ingest = GridIngest::new(
            Arc::clone(&store),
            Arc::clone(&images),
            rebuilder.clone(),
            notifier,
        )
        .with_update_interval(config.update_interval());

        debug!(
            root = %config.storage_root().display(),
            tile_size = config.tile_size(),
            "Map service created"
        );

        Ok(Self {
            config,
            store,
            images,
            ingest,
            rebuilder,
            snapshot: None,
        })
    }

    /// Open the in-memory store persisted under the storage root.
    ///
    /// Call [`persist`](Self::persist) to write it back.
    pub fn open(
        config: ServiceConfig,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Result<Self, ServiceError> {
        let path = config.storage_root().join(METADATA_FILE_NAME);
        let store = Arc::new(MemoryStore::load_snapshot(&path)?);

        let mut service = Self::new(config, store.clone(), notifier)?;
        service.snapshot = Some(Snapshot { store, path });
        Ok(service)
    }

    /// Write the metadata snapshot if the service was opened from one.
    pub fn persist(&self) -> Result<(), ServiceError> {
        if let Some(snapshot) = &self.snapshot {
            snapshot.store.save_snapshot(&snapshot.path)?;
        }
        Ok(())
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn rebuilder(&self) -> &PyramidRebuilder {
        &self.rebuilder
    }

    /// Place an upload batch and rebuild the affected pyramid.
    pub fn ingest(&self, batch: &UploadBatch) -> Result<IngestReport, ServiceError> {
        Ok(self.ingest.ingest(batch)?)
    }

    /// Read a tile by its externally exposed zoom level.
    ///
    /// Returns `Ok(None)` when no tile exists, including when its row is
    /// present but the image file has been removed.
    pub fn get_tile(
        &self,
        tenant: &TenantId,
        map: MapId,
        coord: Coord,
        exposed_zoom: u8,
    ) -> Result<Option<TileBlob>, ServiceError> {
        let zoom =
            from_exposed_zoom(exposed_zoom).map_err(|_| ServiceError::invalid_zoom(exposed_zoom))?;

        let Some(tile) = self.store.get_tile(tenant, map, coord, zoom)? else {
            return Ok(None);
        };

        match self.images.read(&tile.image)? {
            Some(bytes) => Ok(Some(TileBlob {
                bytes,
                updated: tile.updated,
            })),
            None => {
                warn!(
                    tenant = %tenant,
                    map = %map,
                    coord = %coord,
                    zoom,
                    image = %tile.image,
                    "Tile row references missing image"
                );
                Ok(None)
            }
        }
    }

    /// All maps of a tenant ordered by id.
    pub fn list_maps(&self, tenant: &TenantId) -> Result<Vec<MapInfo>, ServiceError> {
        Ok(self.store.list_maps(tenant)?)
    }

    /// Run one bounded repair pass.
    pub fn repair(
        &self,
        max_tiles: usize,
        cancel: &CancellationToken,
    ) -> Result<RepairStats, ServiceError> {
        Ok(self.rebuilder.repair(max_tiles, cancel)?)
    }

    /// A repair daemon using the configured interval and budget.
    pub fn repair_daemon(&self) -> RepairDaemon {
        info!(
            interval_secs = self.config.repair_interval().as_secs(),
            max_tiles = self.config.repair_max_tiles(),
            "Creating repair daemon"
        );
        RepairDaemon::new(self.rebuilder.clone())
            .with_interval(self.config.repair_interval())
            .with_max_tiles(self.config.repair_max_tiles())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::encode_png;
    use crate::coord::MAX_ZOOM;
    use crate::notify::NoOpNotifier;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn tenant() -> TenantId {
        TenantId::new("guild").unwrap()
    }

    fn open(dir: &TempDir) -> MapService {
        MapService::open(
            ServiceConfig::builder(dir.path()).build(),
            Arc::new(NoOpNotifier),
        )
        .unwrap()
    }

    fn upload(service: &MapService, id: &str) -> IngestReport {
        let png = encode_png(&RgbaImage::from_pixel(100, 100, Rgba([9, 8, 7, 255]))).unwrap();
        let batch = UploadBatch::new(tenant(), vec![vec![Some(id.to_string())]]).with_image(id, png);
        service.ingest(&batch).unwrap()
    }

    #[test]
    fn test_get_tile_uses_exposed_zoom() {
        let dir = TempDir::new().unwrap();
        let service = open(&dir);
        upload(&service, "g1");

        let base = service
            .get_tile(&tenant(), MapId(1), Coord::ORIGIN, MAX_ZOOM)
            .unwrap()
            .unwrap();
        let top = service
            .get_tile(&tenant(), MapId(1), Coord::ORIGIN, 0)
            .unwrap();

        assert!(!base.bytes.is_empty());
        assert!(top.is_some());
    }

    #[test]
    fn test_get_tile_rejects_invalid_zoom() {
        let dir = TempDir::new().unwrap();
        let service = open(&dir);

        assert!(matches!(
            service.get_tile(&tenant(), MapId(1), Coord::ORIGIN, MAX_ZOOM + 1),
            Err(ServiceError::InvalidZoom { zoom: 8, .. })
        ));
    }

    #[test]
    fn test_get_tile_miss_is_none() {
        let dir = TempDir::new().unwrap();
        let service = open(&dir);

        assert!(service
            .get_tile(&tenant(), MapId(1), Coord::new(4, 4), 3)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_image_file_is_none() {
        let dir = TempDir::new().unwrap();
        let service = open(&dir);
        upload(&service, "g1");
        std::fs::remove_file(dir.path().join("guild").join("grids").join("g1.png")).unwrap();

        assert!(service
            .get_tile(&tenant(), MapId(1), Coord::ORIGIN, MAX_ZOOM)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_persist_and_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let service = open(&dir);
            upload(&service, "g1");
            service.persist().unwrap();
        }

        let reopened = open(&dir);
        let maps = reopened.list_maps(&tenant()).unwrap();
        assert_eq!(maps.len(), 1);
        assert!(reopened
            .get_tile(&tenant(), MapId(1), Coord::ORIGIN, 0)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_repair_daemon_uses_config() {
        let dir = TempDir::new().unwrap();
        let service = MapService::open(
            ServiceConfig::builder(dir.path())
                .repair_max_tiles(42)
                .build(),
            Arc::new(NoOpNotifier),
        )
        .unwrap();

        assert_eq!(service.repair_daemon().max_tiles(), 42);
    }

    #[test]
    fn test_repair_with_zero_budget() {
        let dir = TempDir::new().unwrap();
        let service = open(&dir);
        upload(&service, "g1");

        let stats = service.repair(0, &CancellationToken::new()).unwrap();

        assert_eq!(stats, RepairStats::default());
    }
}
