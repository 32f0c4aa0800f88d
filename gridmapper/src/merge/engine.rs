//! Map merge engine.
//!
//! Unifies two map identities that turned out to be the same physical area
//! by shifting the source's grids and base tiles into the target's
//! coordinate space. Migration writes always complete before any source row
//! is deleted, so a crash mid-merge leaves a duplicate rather than losing
//! grids.

use crate::coord::{Coord, BASE_ZOOM};
use crate::merge::types::{MergeError, MergeOutcome};
use crate::notify::ChangeNotifier;
use crate::store::{
    GridData, GridStore, MapId, MapStore, MetadataStore, TenantId, TileData, TileStore,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Migrates one map into another.
///
/// Concurrent merges of the same pair are not serialized; the loser observes
/// [`MergeOutcome::SourceGone`].
pub struct MergeEngine {
    store: Arc<dyn MetadataStore>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl MergeEngine {
    pub fn new(store: Arc<dyn MetadataStore>, notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Merge `source` into `target`, adding `shift` to every source coordinate.
    ///
    /// Only base tiles are migrated, by reusing their image reference; higher
    /// zoom levels of the source are dropped and must be rebuilt from the
    /// returned dirty set.
    pub fn merge(
        &self,
        tenant: &TenantId,
        source: MapId,
        target: MapId,
        shift: Coord,
    ) -> Result<MergeOutcome, MergeError> {
        self.merge_at(tenant, source, target, shift, Utc::now())
    }

    /// Merge as of `now`, the timestamp given to migrated base tiles.
    pub fn merge_at(
        &self,
        tenant: &TenantId,
        source: MapId,
        target: MapId,
        shift: Coord,
        now: DateTime<Utc>,
    ) -> Result<MergeOutcome, MergeError> {
        if source == target {
            return Err(MergeError::SameMap(source));
        }

        // Rows can outlive their map row when a placement raced a merge, so
        // the source only counts as gone once nothing references it
        let source_live = self.store.get_map(tenant, source)?.is_some();
        let grids = self.store.grids_for_map(tenant, source)?;
        let tiles = self.store.tiles_for_map(tenant, source, BASE_ZOOM)?;
        if !source_live && grids.is_empty() && tiles.is_empty() {
            debug!(tenant = %tenant, source = %source, "Merge source already gone");
            return Ok(MergeOutcome::SourceGone);
        }
        if self.store.get_map(tenant, target)?.is_none() {
            debug!(tenant = %tenant, target = %target, "Merge target gone");
            return Ok(MergeOutcome::TargetGone);
        }
        if !source_live {
            warn!(
                tenant = %tenant,
                source = %source,
                grids = grids.len(),
                tiles = tiles.len(),
                "Recovering rows left on a deleted map"
            );
        }

        let shifted = |coord: Coord| {
            coord
                .checked_add(shift)
                .ok_or_else(|| MergeError::CoordinateOverflow {
                    source_map: source,
                    coord,
                    shift,
                })
        };

        // Shift everything up front so an overflow aborts before any write
        let grids = grids
            .into_iter()
            .map(|grid| {
                Ok(GridData {
                    map: target,
                    coord: shifted(grid.coord)?,
                    ..grid
                })
            })
            .collect::<Result<Vec<_>, MergeError>>()?;
        let tiles = tiles
            .into_iter()
            .map(|tile| {
                Ok(TileData {
                    map: target,
                    coord: shifted(tile.coord)?,
                    updated: now,
                    ..tile
                })
            })
            .collect::<Result<Vec<_>, MergeError>>()?;

        let grids_moved = grids.len();
        for grid in grids {
            // Source wins over anything already at the shifted position
            self.store.upsert_grid(tenant, grid)?;
        }

        // Migrated tiles are new content for the target's pyramid, so they
        // carry the merge time rather than the upload time
        let tiles_moved = tiles.len();
        let mut dirty = HashSet::with_capacity(tiles_moved);
        for tile in tiles {
            dirty.insert(tile.coord);
            self.store.put_tile(tenant, tile)?;
        }

        self.store.delete_grids_for_map(tenant, source)?;
        self.store.delete_all_for_map(tenant, source)?;
        self.store.delete_map(tenant, source)?;

        self.notifier.map_merged(tenant, source, target, shift);

        info!(
            tenant = %tenant,
            source = %source,
            target = %target,
            shift = %shift,
            grids = grids_moved,
            tiles = tiles_moved,
            "Maps merged"
        );

        Ok(MergeOutcome::Merged {
            dirty,
            grids_moved,
            tiles_moved,
        })
    }
}
