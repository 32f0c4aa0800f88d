//! Incremental bottom-up pyramid rebuild.
//!
//! Starting from a set of dirty base coordinates, each level's distinct
//! parents are recomposited from their (up to four) children, and the written
//! parents become the dirty set of the next level. The loop ends at
//! `MAX_ZOOM` or as soon as a level writes nothing.

use crate::compose::Compositor;
use crate::coord::{Coord, MAX_ZOOM};
use crate::notify::ChangeNotifier;
use crate::pyramid::types::{RebuildError, RebuildStats};
use crate::store::{MapId, MetadataStore, TenantId, TileData, TileStore};
use chrono::Utc;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// Maintains the zoom pyramid of every map.
#[derive(Clone)]
pub struct PyramidRebuilder {
    pub(super) store: Arc<dyn MetadataStore>,
    compositor: Arc<dyn Compositor>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl PyramidRebuilder {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        compositor: Arc<dyn Compositor>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            store,
            compositor,
            notifier,
        }
    }

    /// Rebuild every ancestor of the dirty base coordinates.
    ///
    /// Parents within one level are independent and composited in parallel.
    pub fn rebuild(
        &self,
        tenant: &TenantId,
        map: MapId,
        dirty: &HashSet<Coord>,
    ) -> Result<RebuildStats, RebuildError> {
        let mut stats = RebuildStats::default();
        let mut current: Vec<Coord> = dirty.iter().copied().collect();

        for zoom in 1..=MAX_ZOOM {
            let parents: BTreeSet<Coord> = current.iter().map(|c| c.parent()).collect();
            let parents: Vec<Coord> = parents.into_iter().collect();

            let written = self.composite_level(tenant, map, zoom, &parents)?;
            trace!(
                tenant = %tenant,
                map = %map,
                zoom,
                parents = parents.len(),
                written = written.len(),
                "Pyramid level rebuilt"
            );

            if written.is_empty() {
                break;
            }
            stats.tiles_written += written.len();
            stats.top_zoom = zoom;
            current = written;
        }

        debug!(
            tenant = %tenant,
            map = %map,
            dirty = dirty.len(),
            tiles = stats.tiles_written,
            top_zoom = stats.top_zoom,
            "Pyramid rebuilt"
        );
        Ok(stats)
    }

    /// Composite a set of parents at one level, returning those written.
    pub(super) fn composite_level(
        &self,
        tenant: &TenantId,
        map: MapId,
        zoom: u8,
        parents: &[Coord],
    ) -> Result<Vec<Coord>, RebuildError> {
        let results: Vec<Option<Coord>> = parents
            .par_iter()
            .map(|&parent| self.composite_one(tenant, map, parent, zoom))
            .collect::<Result<_, _>>()?;
        Ok(results.into_iter().flatten().collect())
    }

    /// Recomposite a single parent tile from its children one level down.
    ///
    /// Returns `None` if no child exists.
    fn composite_one(
        &self,
        tenant: &TenantId,
        map: MapId,
        parent: Coord,
        zoom: u8,
    ) -> Result<Option<Coord>, RebuildError> {
        let mut images = [None, None, None, None];
        let mut newest = None;
        for (slot, child) in images.iter_mut().zip(parent.children()) {
            if let Some(tile) = self.store.get_tile(tenant, map, child, zoom - 1)? {
                newest = newest.max(Some(tile.updated));
                *slot = Some(tile.image);
            }
        }
        let Some(newest) = newest else {
            return Ok(None);
        };

        let image = self
            .compositor
            .combine(tenant, map, parent, zoom, &images)?;

        // Never older than a child, so the repair pass sees it as fresh
        let updated = Utc::now().max(newest);
        self.store.put_tile(
            tenant,
            TileData {
                map,
                coord: parent,
                zoom,
                image,
                updated,
            },
        )?;
        self.notifier.tile_changed(tenant, map, parent, zoom);

        Ok(Some(parent))
    }
}
