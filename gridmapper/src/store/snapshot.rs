//! JSON snapshots of the in-memory metadata store.
//!
//! The CLI keeps state between runs by loading a snapshot on start and saving
//! one on exit. Snapshots are written atomically.

use crate::fsutil::write_atomic;
use crate::store::memory::MemoryStore;
use crate::store::r#trait::{GridStore, MapStore, TileStore};
use crate::store::types::{GridData, MapInfo, StoreError, TenantId, TileData};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    tenants: Vec<TenantSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TenantSnapshot {
    tenant: TenantId,
    next_map_id: u64,
    maps: Vec<MapInfo>,
    grids: Vec<GridData>,
    tiles: Vec<TileData>,
}

impl MemoryStore {
    /// Save all metadata to `path` as JSON.
    pub fn save_snapshot(&self, path: &Path) -> Result<(), StoreError> {
        let mut tenants = Vec::new();

        for tenant in self.tenants()? {
            let next_map_id = self
                .next_map_ids
                .get(&tenant)
                .map(|next| *next.value())
                .unwrap_or(1);

            let grids: Vec<GridData> = self
                .grids
                .iter()
                .filter(|entry| entry.key().0 == tenant)
                .map(|entry| entry.value().clone())
                .collect();

            let tiles: Vec<TileData> = self
                .tiles
                .iter()
                .filter(|layer| layer.key().0 == tenant)
                .flat_map(|layer| {
                    layer
                        .value()
                        .iter()
                        .map(|tile| tile.value().clone())
                        .collect::<Vec<_>>()
                })
                .collect();

            tenants.push(TenantSnapshot {
                maps: self.list_maps(&tenant)?,
                tenant,
                next_map_id,
                grids,
                tiles,
            });
        }

        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            tenants,
        };
        let json = serde_json::to_vec_pretty(&snapshot)?;
        write_atomic(path, &json)?;

        info!(
            path = %path.display(),
            grids = self.grid_count(),
            tiles = self.tile_count(),
            "Metadata snapshot saved"
        );
        Ok(())
    }

    /// Load a store from a snapshot at `path`.
    ///
    /// A missing file yields an empty store.
    pub fn load_snapshot(path: &Path) -> Result<Self, StoreError> {
        let store = MemoryStore::new();
        if !path.exists() {
            debug!(path = %path.display(), "No metadata snapshot, starting empty");
            return Ok(store);
        }

        let data = std::fs::read(path)?;
        let snapshot: Snapshot = serde_json::from_slice(&data)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::SnapshotVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        for tenant in snapshot.tenants {
            let t = tenant.tenant;
            store.next_map_ids.insert(t.clone(), tenant.next_map_id);
            for map in tenant.maps {
                store.maps.insert((t.clone(), map.id), map);
            }
            for grid in tenant.grids {
                store.upsert_grid(&t, grid)?;
            }
            for tile in tenant.tiles {
                store.put_tile(&t, tile)?;
            }
        }

        info!(
            path = %path.display(),
            grids = store.grid_count(),
            tiles = store.tile_count(),
            "Metadata snapshot loaded"
        );
        Ok(store)
    }
}
