//! Store traits for dependency injection.
//!
//! The core only talks to these traits. Every call is scoped by an explicit
//! tenant id and is expected to be individually atomic at the storage layer;
//! no operation spans more than one row transaction.

use crate::coord::Coord;
use crate::store::types::{GridData, MapId, MapInfo, StoreError, TenantId, TileData};
use chrono::{DateTime, Utc};

/// Persistence of pyramid tiles keyed by (map, coord, zoom).
pub trait TileStore: Send + Sync {
    /// Get the tile at the given key.
    ///
    /// Returns `Ok(None)` on a miss.
    fn get_tile(
        &self,
        tenant: &TenantId,
        map: MapId,
        coord: Coord,
        zoom: u8,
    ) -> Result<Option<TileData>, StoreError>;

    /// Insert or overwrite the tile at `(tile.map, tile.coord, tile.zoom)`.
    fn put_tile(&self, tenant: &TenantId, tile: TileData) -> Result<(), StoreError>;

    /// Check whether the map has at least one tile at any zoom.
    fn exists_any_for_map(&self, tenant: &TenantId, map: MapId) -> Result<bool, StoreError>;

    /// Delete every tile of the map at every zoom.
    ///
    /// Returns the number of rows removed.
    fn delete_all_for_map(&self, tenant: &TenantId, map: MapId) -> Result<usize, StoreError>;

    /// All tiles of the map at one zoom level, in no particular order.
    fn tiles_for_map(
        &self,
        tenant: &TenantId,
        map: MapId,
        zoom: u8,
    ) -> Result<Vec<TileData>, StoreError>;
}

/// Persistence of grid registrations.
pub trait GridStore: Send + Sync {
    /// Look up a grid by its client-assigned id.
    fn get_grid(&self, tenant: &TenantId, id: &str) -> Result<Option<GridData>, StoreError>;

    /// Insert or overwrite a grid row.
    ///
    /// A different grid occupying the same (map, coord) is displaced and its
    /// row removed; its id is returned.
    fn upsert_grid(&self, tenant: &TenantId, grid: GridData) -> Result<Option<String>, StoreError>;

    /// All grids registered on the map.
    fn grids_for_map(&self, tenant: &TenantId, map: MapId) -> Result<Vec<GridData>, StoreError>;

    /// Delete every grid row of the map, returning how many were removed.
    fn delete_grids_for_map(&self, tenant: &TenantId, map: MapId) -> Result<usize, StoreError>;
}

/// Persistence of map identities.
pub trait MapStore: Send + Sync {
    /// Allocate the next map id for the tenant and insert its row.
    fn create_map(&self, tenant: &TenantId, now: DateTime<Utc>) -> Result<MapInfo, StoreError>;

    fn get_map(&self, tenant: &TenantId, id: MapId) -> Result<Option<MapInfo>, StoreError>;

    /// All maps of the tenant ordered by id.
    fn list_maps(&self, tenant: &TenantId) -> Result<Vec<MapInfo>, StoreError>;

    /// Delete the map row. Returns `false` if it was already gone.
    fn delete_map(&self, tenant: &TenantId, id: MapId) -> Result<bool, StoreError>;

    /// Every tenant that has ever allocated a map.
    fn tenants(&self) -> Result<Vec<TenantId>, StoreError>;
}

/// Convenience bound for a backend implementing all three stores.
pub trait MetadataStore: TileStore + GridStore + MapStore {}

impl<T: TileStore + GridStore + MapStore> MetadataStore for T {}
