//! Metadata stores for maps, grids and pyramid tiles.
//!
//! The core depends on the [`TileStore`], [`GridStore`] and [`MapStore`]
//! traits only. [`MemoryStore`] is the bundled implementation, with JSON
//! snapshots for persistence between runs.

mod memory;
mod snapshot;
mod r#trait;
mod types;

pub use memory::MemoryStore;
pub use r#trait::{GridStore, MapStore, MetadataStore, TileStore};
pub use snapshot::SNAPSHOT_VERSION;
pub use types::{
    is_safe_name, GridData, ImageRef, MapId, MapInfo, StoreError, TenantId, TileData,
};
