//! Change events delivered to live map viewers.
//!
//! Zoom levels in events use the exposed numbering (`MAX_ZOOM` = base grids),
//! since events leave the core at this boundary.

use crate::coord::Coord;
use crate::store::{MapId, TenantId};

/// Events emitted by the core when map content changes.
#[derive(Clone, Debug, PartialEq)]
pub enum MapEvent {
    /// A tile was written or rewritten.
    TileChanged {
        tenant: TenantId,
        map: MapId,
        coord: Coord,
        /// Exposed zoom level
        zoom: u8,
    },

    /// A map was merged into another and no longer exists.
    MapMerged {
        tenant: TenantId,
        source: MapId,
        target: MapId,
        /// Add to a source coordinate to get the target coordinate
        shift: Coord,
    },
}

impl MapEvent {
    /// Tenant the event belongs to.
    pub fn tenant(&self) -> &TenantId {
        match self {
            MapEvent::TileChanged { tenant, .. } | MapEvent::MapMerged { tenant, .. } => tenant,
        }
    }
}
