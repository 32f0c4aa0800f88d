//! Timestamp-driven repair pass.
//!
//! Catches pyramid tiles left stale by interrupted rebuilds or by
//! overlapping batches writing the same map out of order. A parent is stale
//! when it is missing or older than its newest child. Levels are walked
//! bottom-up so a repaired parent is picked up by its own parent in the same
//! pass.

use crate::coord::{Coord, MAX_ZOOM};
use crate::pyramid::rebuilder::PyramidRebuilder;
use crate::pyramid::types::{RebuildError, RepairStats};
use crate::store::{MapId, MapStore, TenantId, TileStore};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

impl PyramidRebuilder {
    /// Run one bounded repair pass over every map of every tenant.
    ///
    /// At most `max_tiles` parents are recomposited; running out of budget
    /// ends the pass early and is not an error. Cancellation is checked
    /// between maps.
    pub fn repair(
        &self,
        max_tiles: usize,
        cancel: &CancellationToken,
    ) -> Result<RepairStats, RebuildError> {
        let mut stats = RepairStats::default();
        if max_tiles == 0 {
            return Ok(stats);
        }

        'tenants: for tenant in self.store.tenants()? {
            for map in self.store.list_maps(&tenant)? {
                if cancel.is_cancelled() {
                    stats.cancelled = true;
                    break 'tenants;
                }
                if stats.tiles_repaired >= max_tiles {
                    stats.exhausted = true;
                    break 'tenants;
                }

                let budget = max_tiles - stats.tiles_repaired;
                let repaired = self.repair_map(&tenant, map.id, budget)?;
                stats.maps_scanned += 1;
                stats.tiles_repaired += repaired;
            }
        }

        if stats.tiles_repaired >= max_tiles && !stats.cancelled {
            stats.exhausted = true;
        }

        info!(
            maps = stats.maps_scanned,
            repaired = stats.tiles_repaired,
            exhausted = stats.exhausted,
            cancelled = stats.cancelled,
            "Repair pass finished"
        );
        Ok(stats)
    }

    /// Repair one map's pyramid, compositing at most `budget` parents.
    pub fn repair_map(
        &self,
        tenant: &TenantId,
        map: MapId,
        budget: usize,
    ) -> Result<usize, RebuildError> {
        let mut repaired = 0;

        for zoom in 1..=MAX_ZOOM {
            if repaired >= budget {
                break;
            }
            let mut stale = self.stale_parents(tenant, map, zoom)?;
            if stale.is_empty() {
                continue;
            }
            stale.truncate(budget - repaired);

            let written = self.composite_level(tenant, map, zoom, &stale)?;
            debug!(
                tenant = %tenant,
                map = %map,
                zoom,
                stale = stale.len(),
                written = written.len(),
                "Repaired pyramid level"
            );
            repaired += written.len();
        }

        Ok(repaired)
    }

    /// Parents at `zoom` that are missing or older than a child, in
    /// coordinate order.
    fn stale_parents(
        &self,
        tenant: &TenantId,
        map: MapId,
        zoom: u8,
    ) -> Result<Vec<Coord>, RebuildError> {
        let mut newest_child: HashMap<Coord, DateTime<Utc>> = HashMap::new();
        for child in self.store.tiles_for_map(tenant, map, zoom - 1)? {
            newest_child
                .entry(child.coord.parent())
                .and_modify(|t| *t = (*t).max(child.updated))
                .or_insert(child.updated);
        }

        let existing: HashMap<Coord, DateTime<Utc>> = self
            .store
            .tiles_for_map(tenant, map, zoom)?
            .into_iter()
            .map(|t| (t.coord, t.updated))
            .collect();

        let mut stale: Vec<Coord> = newest_child
            .into_iter()
            .filter(|(parent, child_updated)| match existing.get(parent) {
                Some(updated) => updated < child_updated,
                None => true,
            })
            .map(|(parent, _)| parent)
            .collect();
        stale.sort();
        Ok(stale)
    }
}
