//! In-memory metadata store backed by `DashMap`.
//!
//! Every operation touches one logical row under a shard lock, which gives the
//! per-row atomicity the ingest and merge code rely on without batch locks.

use crate::coord::Coord;
use crate::store::r#trait::{GridStore, MapStore, TileStore};
use crate::store::types::{GridData, MapId, MapInfo, StoreError, TenantId, TileData};
use chrono::{DateTime, Utc};
use dashmap::DashMap;

pub(super) type MapKey = (TenantId, MapId);
pub(super) type LayerKey = (TenantId, MapId, u8);

/// Thread-safe in-memory implementation of all three stores.
///
/// Grid positions are indexed per map so that `(map, coord)` stays unique,
/// and tiles are grouped per `(map, zoom)` layer so level scans do not walk
/// the whole store.
#[derive(Default)]
pub struct MemoryStore {
    /// Next map id per tenant. Only ever grows.
    pub(super) next_map_ids: DashMap<TenantId, u64>,
    pub(super) maps: DashMap<MapKey, MapInfo>,
    pub(super) grids: DashMap<(TenantId, String), GridData>,
    /// (map) -> coord -> grid id
    pub(super) positions: DashMap<MapKey, DashMap<Coord, String>>,
    pub(super) tiles: DashMap<LayerKey, DashMap<Coord, TileData>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of grid rows across all tenants.
    pub fn grid_count(&self) -> usize {
        self.grids.len()
    }

    /// Total number of tile rows across all tenants and zoom levels.
    pub fn tile_count(&self) -> usize {
        self.tiles.iter().map(|layer| layer.value().len()).sum()
    }
}

impl TileStore for MemoryStore {
    fn get_tile(
        &self,
        tenant: &TenantId,
        map: MapId,
        coord: Coord,
        zoom: u8,
    ) -> Result<Option<TileData>, StoreError> {
        Ok(self
            .tiles
            .get(&(tenant.clone(), map, zoom))
            .and_then(|layer| layer.get(&coord).map(|tile| tile.value().clone())))
    }

    fn put_tile(&self, tenant: &TenantId, tile: TileData) -> Result<(), StoreError> {
        self.tiles
            .entry((tenant.clone(), tile.map, tile.zoom))
            .or_default()
            .insert(tile.coord, tile);
        Ok(())
    }

    fn exists_any_for_map(&self, tenant: &TenantId, map: MapId) -> Result<bool, StoreError> {
        Ok(self.tiles.iter().any(|layer| {
            let (t, m, _) = layer.key();
            t == tenant && *m == map && !layer.value().is_empty()
        }))
    }

    fn delete_all_for_map(&self, tenant: &TenantId, map: MapId) -> Result<usize, StoreError> {
        let mut removed = 0;
        self.tiles.retain(|(t, m, _), layer| {
            if t == tenant && *m == map {
                removed += layer.len();
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    fn tiles_for_map(
        &self,
        tenant: &TenantId,
        map: MapId,
        zoom: u8,
    ) -> Result<Vec<TileData>, StoreError> {
        Ok(self
            .tiles
            .get(&(tenant.clone(), map, zoom))
            .map(|layer| layer.iter().map(|tile| tile.value().clone()).collect())
            .unwrap_or_default())
    }
}

impl GridStore for MemoryStore {
    fn get_grid(&self, tenant: &TenantId, id: &str) -> Result<Option<GridData>, StoreError> {
        Ok(self
            .grids
            .get(&(tenant.clone(), id.to_string()))
            .map(|grid| grid.value().clone()))
    }

    fn upsert_grid(&self, tenant: &TenantId, grid: GridData) -> Result<Option<String>, StoreError> {
        let previous = self
            .grids
            .insert((tenant.clone(), grid.id.clone()), grid.clone());

        // Release the old position if the grid moved
        if let Some(prev) = previous {
            if prev.map != grid.map || prev.coord != grid.coord {
                if let Some(layer) = self.positions.get(&(tenant.clone(), prev.map)) {
                    layer.remove_if(&prev.coord, |_, id| *id == grid.id);
                }
            }
        }

        let displaced = self
            .positions
            .entry((tenant.clone(), grid.map))
            .or_default()
            .insert(grid.coord, grid.id.clone());

        match displaced {
            Some(other) if other != grid.id => {
                self.grids.remove_if(&(tenant.clone(), other.clone()), |_, g| {
                    g.map == grid.map && g.coord == grid.coord
                });
                Ok(Some(other))
            }
            _ => Ok(None),
        }
    }

    fn grids_for_map(&self, tenant: &TenantId, map: MapId) -> Result<Vec<GridData>, StoreError> {
        let ids: Vec<String> = match self.positions.get(&(tenant.clone(), map)) {
            Some(layer) => layer.iter().map(|entry| entry.value().clone()).collect(),
            None => return Ok(Vec::new()),
        };

        Ok(ids
            .into_iter()
            .filter_map(|id| {
                self.grids
                    .get(&(tenant.clone(), id))
                    .filter(|grid| grid.map == map)
                    .map(|grid| grid.value().clone())
            })
            .collect())
    }

    fn delete_grids_for_map(&self, tenant: &TenantId, map: MapId) -> Result<usize, StoreError> {
        let Some((_, layer)) = self.positions.remove(&(tenant.clone(), map)) else {
            return Ok(0);
        };

        let mut removed = 0;
        for (_, id) in layer.into_iter() {
            // Skip rows that were re-pointed to another map in the meantime
            if self
                .grids
                .remove_if(&(tenant.clone(), id), |_, g| g.map == map)
                .is_some()
            {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl MapStore for MemoryStore {
    fn create_map(&self, tenant: &TenantId, now: DateTime<Utc>) -> Result<MapInfo, StoreError> {
        let id = {
            let mut next = self.next_map_ids.entry(tenant.clone()).or_insert(1);
            let id = *next;
            *next += 1;
            id
        };

        let info = MapInfo {
            id: MapId(id),
            name: format!("map {}", id),
            hidden: false,
            priority: 0,
            created: now,
        };
        self.maps.insert((tenant.clone(), info.id), info.clone());
        Ok(info)
    }

    fn get_map(&self, tenant: &TenantId, id: MapId) -> Result<Option<MapInfo>, StoreError> {
        Ok(self
            .maps
            .get(&(tenant.clone(), id))
            .map(|info| info.value().clone()))
    }

    fn list_maps(&self, tenant: &TenantId) -> Result<Vec<MapInfo>, StoreError> {
        let mut maps: Vec<MapInfo> = self
            .maps
            .iter()
            .filter(|entry| &entry.key().0 == tenant)
            .map(|entry| entry.value().clone())
            .collect();
        maps.sort_by_key(|m| m.id);
        Ok(maps)
    }

    fn delete_map(&self, tenant: &TenantId, id: MapId) -> Result<bool, StoreError> {
        Ok(self.maps.remove(&(tenant.clone(), id)).is_some())
    }

    fn tenants(&self) -> Result<Vec<TenantId>, StoreError> {
        let mut tenants: Vec<TenantId> = self
            .next_map_ids
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        tenants.sort();
        Ok(tenants)
    }
}
