//! Grid ingest pipeline.
//!
//! Places an upload batch on a map identity. Grids already known anchor the
//! batch in their map's coordinate space; when a batch spans grids of
//! several maps, those maps are the same physical area and are merged into
//! the one with the lowest id. Base tiles are written cell by cell and the
//! affected pyramid is rebuilt before returning.

use crate::compose::{decode_tile, grid_image_path, ImageError, ImageStore};
use crate::coord::{Coord, BASE_ZOOM};
use crate::ingest::types::{CellFailure, IngestError, IngestReport, Placement, UploadBatch};
use crate::merge::{MergeEngine, MergeOutcome};
use crate::notify::ChangeNotifier;
use crate::pyramid::PyramidRebuilder;
use crate::store::{
    is_safe_name, GridData, GridStore, ImageRef, MapId, MapStore, MetadataStore, StoreError,
    TenantId, TileData, TileStore,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Merge rounds allowed before giving up on a batch.
pub const MAX_MERGE_ATTEMPTS: usize = 3;

/// Default delay before a grid image is requested again (30 minutes).
pub const DEFAULT_GRID_UPDATE_INTERVAL_SECS: i64 = 1800;

/// A batch cell resolved against the grid store.
#[derive(Debug)]
struct Resolved {
    placement: Placement,
    found: Option<GridData>,
}

/// Per-cell failure causes; folded into [`CellFailure`].
#[derive(Debug, Error)]
enum CellError {
    #[error("{0}")]
    Image(#[from] ImageError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("grid id repeated within batch")]
    Duplicate,

    #[error("grid id is not a safe file name")]
    InvalidId,

    #[error("placement lies outside the coordinate range")]
    OutOfRange,
}

/// Places upload batches and keeps their map's pyramid current.
pub struct GridIngest {
    store: Arc<dyn MetadataStore>,
    images: Arc<ImageStore>,
    merger: MergeEngine,
    rebuilder: PyramidRebuilder,
    notifier: Arc<dyn ChangeNotifier>,
    update_interval: Duration,
}

impl GridIngest {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        images: Arc<ImageStore>,
        rebuilder: PyramidRebuilder,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            merger: MergeEngine::new(Arc::clone(&store), Arc::clone(&notifier)),
            store,
            images,
            rebuilder,
            notifier,
            update_interval: Duration::seconds(DEFAULT_GRID_UPDATE_INTERVAL_SECS),
        }
    }

    /// Sets how long an uploaded grid image stays fresh.
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Ingest a batch at the current time.
    pub fn ingest(&self, batch: &UploadBatch) -> Result<IngestReport, IngestError> {
        self.ingest_at(batch, Utc::now())
    }

    /// Ingest a batch as of `now`.
    pub fn ingest_at(
        &self,
        batch: &UploadBatch,
        now: DateTime<Utc>,
    ) -> Result<IngestReport, IngestError> {
        let tenant = &batch.tenant;
        let (placements, duplicates) = batch.placements();
        let (placements, invalid): (Vec<_>, Vec<_>) = placements
            .into_iter()
            .partition(|p| is_safe_name(&p.grid_id));

        let mut report = IngestReport {
            failures: duplicates
                .into_iter()
                .map(|p| failure(p.grid_id, CellError::Duplicate))
                .chain(
                    invalid
                        .into_iter()
                        .map(|p| failure(p.grid_id, CellError::InvalidId)),
                )
                .collect(),
            ..Default::default()
        };
        if placements.is_empty() {
            return Ok(report);
        }

        // Dirty base coords keyed by the map they currently belong to
        let mut pending: HashMap<MapId, HashSet<Coord>> = HashMap::new();
        let mut rounds = 0;

        let (target, offset, resolved) = loop {
            let resolved = self.resolve(tenant, &placements)?;
            let groups = group_offsets(&resolved);
            let live = self.lowest_live_map(tenant, &groups)?;

            match (groups.len(), live) {
                (0, _) => {
                    // Nothing known yet: the batch's top-left cell is the origin
                    let map = self.store.create_map(tenant, now)?;
                    info!(tenant = %tenant, map = %map.id, "Created map for new grids");
                    break (map.id, Coord::ORIGIN, resolved);
                }
                (1, Some((map, offset))) => break (map, offset, resolved),
                _ => {}
            }

            // Several maps, or grids still pointing at a merged-away map
            if rounds == MAX_MERGE_ATTEMPTS {
                return Err(IngestError::UnstableMerge { attempts: rounds });
            }
            rounds += 1;

            let Some((target, target_offset)) = live else {
                // Every group's map is gone: adopt the orphans into a fresh map
                // that keeps their coordinates
                let offset = groups.values().next().copied().unwrap_or(Coord::ORIGIN);
                let map = self.store.create_map(tenant, now)?.id;
                let merged = self.merge_groups(tenant, map, offset, &groups, &mut pending, now)?;
                if merged == 0 {
                    self.store.delete_map(tenant, map)?;
                } else {
                    info!(tenant = %tenant, map = %map, "Adopted grids left on deleted maps");
                }
                report.merges += merged;
                continue;
            };
            report.merges +=
                self.merge_groups(tenant, target, target_offset, &groups, &mut pending, now)?;
        };
        report.map = Some(target);

        for cell in &resolved {
            match self.place_cell(tenant, target, offset, cell, batch, now) {
                Ok(placed) => {
                    report.accepted += 1;
                    if placed.inconsistent {
                        report.inconsistent += 1;
                    }
                    if let Some(coord) = placed.dirty {
                        pending.entry(target).or_default().insert(coord);
                    }
                    if placed.wants_upload {
                        report.requested_uploads.push(cell.placement.grid_id.clone());
                    }
                }
                Err(CellError::Store(StoreError::Unavailable(reason))) => {
                    return Err(StoreError::Unavailable(reason).into());
                }
                Err(e) => {
                    warn!(
                        tenant = %tenant,
                        grid = %cell.placement.grid_id,
                        error = %e,
                        "Failed to ingest grid"
                    );
                    report.failures.push(failure(cell.placement.grid_id.clone(), e));
                }
            }
        }

        let mut maps: Vec<(MapId, HashSet<Coord>)> = pending.into_iter().collect();
        maps.sort_by_key(|(map, _)| *map);
        for (map, dirty) in maps {
            if self.store.get_map(tenant, map)?.is_none() {
                debug!(tenant = %tenant, map = %map, "Skipping rebuild of vanished map");
                continue;
            }
            let stats = self.rebuilder.rebuild(tenant, map, &dirty)?;
            report.rebuild.absorb(stats);
        }

        info!(
            tenant = %tenant,
            map = %target,
            accepted = report.accepted,
            failed = report.failures.len(),
            inconsistent = report.inconsistent,
            merges = report.merges,
            tiles = report.rebuild.tiles_written,
            "Batch ingested"
        );
        Ok(report)
    }

    /// Look up every placement in the grid store.
    fn resolve(
        &self,
        tenant: &TenantId,
        placements: &[Placement],
    ) -> Result<Vec<Resolved>, StoreError> {
        placements
            .iter()
            .map(|p| {
                Ok(Resolved {
                    found: self.store.get_grid(tenant, &p.grid_id)?,
                    placement: p.clone(),
                })
            })
            .collect()
    }

    /// Lowest-id group whose map row still exists, with its offset.
    fn lowest_live_map(
        &self,
        tenant: &TenantId,
        groups: &BTreeMap<MapId, Coord>,
    ) -> Result<Option<(MapId, Coord)>, StoreError> {
        for (&map, &offset) in groups {
            if self.store.get_map(tenant, map)?.is_some() {
                return Ok(Some((map, offset)));
            }
        }
        Ok(None)
    }

    /// Merge every other group into `target`, returning the merge count.
    fn merge_groups(
        &self,
        tenant: &TenantId,
        target: MapId,
        target_offset: Coord,
        groups: &BTreeMap<MapId, Coord>,
        pending: &mut HashMap<MapId, HashSet<Coord>>,
        now: DateTime<Utc>,
    ) -> Result<usize, IngestError> {
        let mut merged = 0;
        for (&source, &source_offset) in groups.iter().filter(|(&map, _)| map != target) {
            let shift = target_offset.checked_sub(source_offset).ok_or(
                IngestError::OffsetOverflow {
                    source_map: source,
                    source_offset,
                    target_offset,
                },
            )?;
            match self.merger.merge_at(tenant, source, target, shift, now)? {
                MergeOutcome::Merged { dirty, .. } => {
                    merged += 1;
                    // Dirt left from an earlier round follows its map
                    let carried = pending.remove(&source).unwrap_or_default();
                    let entry = pending.entry(target).or_default();
                    entry.extend(dirty);
                    entry.extend(carried.into_iter().filter_map(|c| c.checked_add(shift)));
                }
                MergeOutcome::SourceGone => {
                    debug!(tenant = %tenant, source = %source, "Source already merged elsewhere");
                }
                MergeOutcome::TargetGone => {
                    debug!(tenant = %tenant, target = %target, "Merge target vanished, re-resolving");
                    break;
                }
            }
        }
        Ok(merged)
    }

    /// Register one cell and store its base tile.
    fn place_cell(
        &self,
        tenant: &TenantId,
        map: MapId,
        offset: Coord,
        cell: &Resolved,
        batch: &UploadBatch,
        now: DateTime<Utc>,
    ) -> Result<PlacedCell, CellError> {
        let grid_id = &cell.placement.grid_id;
        let expected = offset
            .checked_add(cell.placement.rel)
            .ok_or(CellError::OutOfRange)?;

        let mut placed = PlacedCell::default();
        let coord = match &cell.found {
            Some(grid) => {
                if grid.coord != expected {
                    warn!(
                        tenant = %tenant,
                        map = %map,
                        grid = %grid_id,
                        recorded = %grid.coord,
                        implied = %expected,
                        "Inconsistent grid placement, keeping recorded coordinate"
                    );
                    placed.inconsistent = true;
                }
                grid.coord
            }
            None => expected,
        };

        let Some(data) = batch.images.get(grid_id) else {
            let next_update = cell.found.as_ref().map_or(now, |g| g.next_update);
            self.register(tenant, grid_id, map, coord, next_update)?;
            let has_tile = self.store.get_tile(tenant, map, coord, BASE_ZOOM)?.is_some();
            placed.wants_upload = !has_tile || next_update <= now;
            return Ok(placed);
        };

        decode_tile(data, self.images.tile_size())?;
        let image = ImageRef::new(grid_image_path(tenant, grid_id));
        self.images.write(&image, data)?;

        let next_update = now
            .checked_add_signed(self.update_interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.register(tenant, grid_id, map, coord, next_update)?;
        self.store.put_tile(
            tenant,
            TileData {
                map,
                coord,
                zoom: BASE_ZOOM,
                image,
                updated: now,
            },
        )?;
        self.notifier.tile_changed(tenant, map, coord, BASE_ZOOM);

        placed.dirty = Some(coord);
        Ok(placed)
    }

    fn register(
        &self,
        tenant: &TenantId,
        grid_id: &str,
        map: MapId,
        coord: Coord,
        next_update: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let displaced = self.store.upsert_grid(
            tenant,
            GridData {
                id: grid_id.to_string(),
                map,
                coord,
                next_update,
            },
        )?;
        if let Some(other) = displaced {
            debug!(tenant = %tenant, grid = %grid_id, displaced = %other, "Grid replaced previous occupant");
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct PlacedCell {
    dirty: Option<Coord>,
    inconsistent: bool,
    wants_upload: bool,
}

fn failure(grid_id: String, error: CellError) -> CellFailure {
    CellFailure {
        grid_id,
        reason: error.to_string(),
    }
}

/// Offset (`coord - rel`) of each map group, taken from its first found cell.
fn group_offsets(resolved: &[Resolved]) -> BTreeMap<MapId, Coord> {
    let mut groups = BTreeMap::new();
    for cell in resolved {
        let Some(grid) = &cell.found else {
            continue;
        };
        // rel is non-negative, so only a coordinate near i32::MIN can fail
        if let Some(offset) = grid.coord.checked_sub(cell.placement.rel) {
            groups.entry(grid.map).or_insert(offset);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{encode_png, PngCompositor};
    use crate::coord::MAX_ZOOM;
    use crate::notify::{ChannelNotifier, MapEvent, NoOpNotifier};
    use crate::store::MemoryStore;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        store: Arc<MemoryStore>,
        ingest: GridIngest,
    }

    fn tenant() -> TenantId {
        TenantId::new("guild").unwrap()
    }

    fn fixture_with(notifier: Arc<dyn ChangeNotifier>) -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let images = Arc::new(ImageStore::new(dir.path().to_path_buf()).unwrap());
        let rebuilder = PyramidRebuilder::new(
            store.clone(),
            Arc::new(PngCompositor::new(images.clone())),
            notifier.clone(),
        );
        let ingest = GridIngest::new(store.clone(), images, rebuilder, notifier);
        Fixture {
            _dir: dir,
            store,
            ingest,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(NoOpNotifier))
    }

    fn png() -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(100, 100, Rgba([20, 40, 60, 255]))).unwrap()
    }

    fn row(ids: &[&str]) -> Vec<Option<String>> {
        ids.iter()
            .map(|id| (!id.is_empty()).then(|| id.to_string()))
            .collect()
    }

    fn batch(rows: &[&[&str]]) -> UploadBatch {
        UploadBatch::new(tenant(), rows.iter().map(|r| row(r)).collect())
    }

    fn batch_with_images(rows: &[&[&str]]) -> UploadBatch {
        let mut b = batch(rows);
        let ids: Vec<String> = rows
            .iter()
            .flat_map(|r| r.iter())
            .filter(|id| !id.is_empty())
            .map(|id| id.to_string())
            .collect();
        for id in ids {
            b = b.with_image(id, png());
        }
        b
    }

    fn grid(f: &Fixture, id: &str) -> GridData {
        f.store.get_grid(&tenant(), id).unwrap().unwrap()
    }

    #[test]
    fn test_single_new_grid_creates_map_and_pyramid() {
        let f = fixture();

        let report = f.ingest.ingest(&batch_with_images(&[&["g1"]])).unwrap();

        assert_eq!(report.map, Some(MapId(1)));
        assert_eq!(report.accepted, 1);
        assert!(report.failures.is_empty());
        assert!(report.requested_uploads.is_empty());
        assert_eq!(report.rebuild.tiles_written, MAX_ZOOM as usize);

        let g1 = grid(&f, "g1");
        assert_eq!((g1.map, g1.coord), (MapId(1), Coord::ORIGIN));
        assert!(f
            .store
            .get_tile(&tenant(), MapId(1), Coord::ORIGIN, BASE_ZOOM)
            .unwrap()
            .is_some());
        assert_eq!(f.store.list_maps(&tenant()).unwrap().len(), 1);
    }

    #[test]
    fn test_new_batch_is_anchored_at_top_left() {
        let f = fixture();

        f.ingest
            .ingest(&batch_with_images(&[&["", "a"], &["b", "c"]]))
            .unwrap();

        assert_eq!(grid(&f, "a").coord, Coord::new(1, 0));
        assert_eq!(grid(&f, "b").coord, Coord::new(0, 1));
        assert_eq!(grid(&f, "c").coord, Coord::new(1, 1));
    }

    #[test]
    fn test_known_grid_anchors_new_neighbours() {
        let f = fixture();
        f.ingest.ingest(&batch_with_images(&[&["a"]])).unwrap();

        let report = f
            .ingest
            .ingest(&batch_with_images(&[&["n", ""], &["", "a"]]))
            .unwrap();

        assert_eq!(report.map, Some(MapId(1)));
        assert_eq!(report.merges, 0);
        assert_eq!(grid(&f, "n").coord, Coord::new(-1, -1));
        assert_eq!(grid(&f, "n").map, MapId(1));
    }

    #[test]
    fn test_batch_spanning_two_maps_merges_into_lower_id() {
        let f = fixture();
        f.ingest.ingest(&batch_with_images(&[&["a"]])).unwrap();
        f.ingest.ingest(&batch_with_images(&[&["b"]])).unwrap();
        assert_eq!(grid(&f, "b").map, MapId(2));

        // "a" at relative (1,1), "b" at relative (1,2)
        let report = f
            .ingest
            .ingest(&batch(&[&["", ""], &["", "a"], &["", "b"]]))
            .unwrap();

        assert_eq!(report.map, Some(MapId(1)));
        assert_eq!(report.merges, 1);
        let b = grid(&f, "b");
        assert_eq!((b.map, b.coord), (MapId(1), grid(&f, "a").coord + Coord::new(0, 1)));
        assert!(f.store.get_map(&tenant(), MapId(2)).unwrap().is_none());
        assert!(f
            .store
            .get_tile(&tenant(), MapId(1), Coord::new(0, 1), BASE_ZOOM)
            .unwrap()
            .is_some());
        // Migrated tile was rebuilt into the target's pyramid
        assert!(report.rebuild.tiles_written > 0);
    }

    #[test]
    fn test_batch_spanning_three_maps_merges_all() {
        let f = fixture();
        for id in ["a", "b", "c"] {
            f.ingest.ingest(&batch_with_images(&[&[id]])).unwrap();
        }

        let report = f.ingest.ingest(&batch(&[&["c", "b", "a"]])).unwrap();

        assert_eq!(report.merges, 2);
        assert_eq!(report.map, Some(MapId(1)));
        assert_eq!(f.store.list_maps(&tenant()).unwrap().len(), 1);
        assert_eq!(grid(&f, "c").coord, Coord::new(-2, 0));
        assert_eq!(grid(&f, "b").coord, Coord::new(-1, 0));
    }

    fn put_grid(f: &Fixture, id: &str, map: MapId, coord: Coord) {
        f.store
            .upsert_grid(
                &tenant(),
                GridData {
                    id: id.to_string(),
                    map,
                    coord,
                    next_update: Utc::now(),
                },
            )
            .unwrap();
    }

    #[test]
    fn test_grid_left_on_merged_map_rejoins_live_map() {
        let f = fixture();
        f.ingest.ingest(&batch_with_images(&[&["a"]])).unwrap();
        f.ingest.ingest(&batch_with_images(&[&["b"]])).unwrap();
        let merger = MergeEngine::new(f.store.clone(), Arc::new(NoOpNotifier));
        merger
            .merge(&tenant(), MapId(2), MapId(1), Coord::new(0, 1))
            .unwrap();
        // A placement that resolved map 2 before the merge finished
        put_grid(&f, "late", MapId(2), Coord::new(5, 5));

        let report = f.ingest.ingest(&batch(&[&["a", "late"]])).unwrap();

        assert_eq!(report.map, Some(MapId(1)));
        assert_eq!(report.merges, 1);
        assert!(report.failures.is_empty());
        let late = grid(&f, "late");
        assert_eq!((late.map, late.coord), (MapId(1), Coord::new(1, 0)));
        assert!(f.store.grids_for_map(&tenant(), MapId(2)).unwrap().is_empty());
    }

    #[test]
    fn test_batch_of_only_orphaned_grids_gets_a_live_map() {
        let f = fixture();
        f.ingest.ingest(&batch_with_images(&[&["a"]])).unwrap();
        f.ingest.ingest(&batch_with_images(&[&["b"]])).unwrap();
        let merger = MergeEngine::new(f.store.clone(), Arc::new(NoOpNotifier));
        merger
            .merge(&tenant(), MapId(2), MapId(1), Coord::new(0, 1))
            .unwrap();
        put_grid(&f, "late", MapId(2), Coord::new(3, 3));

        let report = f
            .ingest
            .ingest(&batch(&[&["late"]]).with_image("late", png()))
            .unwrap();

        let late = grid(&f, "late");
        assert_eq!(report.map, Some(late.map));
        assert!(f.store.get_map(&tenant(), late.map).unwrap().is_some());
        assert_eq!(late.coord, Coord::new(3, 3));
        assert!(report.rebuild.tiles_written > 0);
    }

    #[test]
    fn test_placement_past_coordinate_range_fails_cell() {
        let f = fixture();
        let map = f.store.create_map(&tenant(), Utc::now()).unwrap().id;
        put_grid(&f, "edge", map, Coord::new(i32::MAX, 0));

        let report = f.ingest.ingest(&batch(&[&["edge", "beyond"]])).unwrap();

        assert_eq!(report.accepted, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].grid_id, "beyond");
        assert!(f.store.get_grid(&tenant(), "beyond").unwrap().is_none());
    }

    #[test]
    fn test_huge_update_interval_saturates() {
        let Fixture { _dir, store, ingest } = fixture();
        let ingest = ingest.with_update_interval(Duration::days(365 * 200_000_000));

        let report = ingest
            .ingest(&batch(&[&["g"]]).with_image("g", png()))
            .unwrap();

        assert_eq!(report.accepted, 1);
        let g = store.get_grid(&tenant(), "g").unwrap().unwrap();
        assert_eq!(g.next_update, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_inconsistent_placement_keeps_recorded_coord() {
        let f = fixture();
        f.ingest.ingest(&batch_with_images(&[&["a", "b"]])).unwrap();

        let report = f.ingest.ingest(&batch(&[&["b", "a"]])).unwrap();

        assert_eq!(report.inconsistent, 1);
        assert_eq!(report.accepted, 2);
        assert_eq!(grid(&f, "a").coord, Coord::new(0, 0));
        assert_eq!(grid(&f, "b").coord, Coord::new(1, 0));
        assert_eq!(f.store.list_maps(&tenant()).unwrap().len(), 1);
    }

    #[test]
    fn test_bad_image_fails_only_its_cell() {
        let f = fixture();
        let b = batch(&[&["good", "bad"]])
            .with_image("good", png())
            .with_image("bad", b"not an image".to_vec());

        let report = f.ingest.ingest(&b).unwrap();

        assert_eq!(report.accepted, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].grid_id, "bad");
        assert!(f.store.get_grid(&tenant(), "bad").unwrap().is_none());
        assert!(f.store.get_grid(&tenant(), "good").unwrap().is_some());
    }

    #[test]
    fn test_wrong_size_image_is_rejected() {
        let f = fixture();
        let small = encode_png(&RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 255]))).unwrap();

        let report = f.ingest.ingest(&batch(&[&["g"]]).with_image("g", small)).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("dimensions"));
    }

    #[test]
    fn test_duplicate_id_in_batch_is_reported() {
        let f = fixture();

        let report = f.ingest.ingest(&batch_with_images(&[&["a", "a"]])).unwrap();

        assert_eq!(report.accepted, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(grid(&f, "a").coord, Coord::ORIGIN);
    }

    #[test]
    fn test_unsafe_grid_id_is_rejected() {
        let f = fixture();

        let report = f
            .ingest
            .ingest(&batch(&[&["ok", "../escape"]]).with_image("../escape", png()))
            .unwrap();

        assert_eq!(report.accepted, 1);
        assert_eq!(report.failures[0].grid_id, "../escape");
        assert!(f.store.get_grid(&tenant(), "../escape").unwrap().is_none());
    }

    #[test]
    fn test_empty_batch_does_nothing() {
        let f = fixture();
        let report = f.ingest.ingest(&batch(&[&["", " "]])).unwrap();
        assert_eq!(report, IngestReport::default());
        assert!(f.store.list_maps(&tenant()).unwrap().is_empty());
    }

    #[test]
    fn test_requested_uploads() {
        let f = fixture();
        let now = Utc::now();

        let report = f.ingest.ingest_at(&batch(&[&["x", "y"]]), now).unwrap();
        assert_eq!(report.requested_uploads, vec!["x", "y"]);

        f.ingest
            .ingest_at(&batch(&[&["x"]]).with_image("x", png()), now)
            .unwrap();
        let report = f.ingest.ingest_at(&batch(&[&["x", "y"]]), now).unwrap();
        assert_eq!(report.requested_uploads, vec!["y"]);

        let later = now + Duration::seconds(DEFAULT_GRID_UPDATE_INTERVAL_SECS + 1);
        let report = f.ingest.ingest_at(&batch(&[&["x"]]), later).unwrap();
        assert_eq!(report.requested_uploads, vec!["x"]);
    }

    #[test]
    fn test_uploaded_grid_schedules_next_update() {
        let f = fixture();
        let now = Utc::now();
        let ingest_fast = f.ingest.with_update_interval(Duration::seconds(60));

        ingest_fast
            .ingest_at(&batch_with_images(&[&["g"]]), now)
            .unwrap();

        assert_eq!(
            f.store.get_grid(&tenant(), "g").unwrap().unwrap().next_update,
            now + Duration::seconds(60)
        );
    }

    #[test]
    fn test_base_tile_write_is_notified() {
        let (notifier, mut rx) = ChannelNotifier::channel();
        let f = fixture_with(Arc::new(notifier));

        f.ingest.ingest(&batch_with_images(&[&["g"]])).unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            MapEvent::TileChanged {
                tenant: tenant(),
                map: MapId(1),
                coord: Coord::ORIGIN,
                zoom: MAX_ZOOM,
            }
        );
    }
}
