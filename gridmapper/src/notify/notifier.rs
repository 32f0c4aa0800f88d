//! Change notification sinks.
//!
//! The core calls a [`ChangeNotifier`] fire-and-forget: no acknowledgment, no
//! retry. [`ChannelNotifier`] forwards events over an unbounded channel to
//! whatever fans them out to clients; [`NoOpNotifier`] discards them.

use super::event::MapEvent;
use crate::coord::{to_exposed_zoom, Coord};
use crate::store::{MapId, TenantId};
use tokio::sync::mpsc;
use tracing::trace;

/// Sink for change notifications.
///
/// Zoom levels passed in are internal; implementations crossing the core
/// boundary convert them.
pub trait ChangeNotifier: Send + Sync {
    /// A tile at an internal zoom level changed.
    fn tile_changed(&self, tenant: &TenantId, map: MapId, coord: Coord, zoom: u8);

    /// `source` was merged into `target` with the given coordinate shift.
    fn map_merged(&self, tenant: &TenantId, source: MapId, target: MapId, shift: Coord);
}

/// Notifier that never delivers anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpNotifier;

impl ChangeNotifier for NoOpNotifier {
    fn tile_changed(&self, _tenant: &TenantId, _map: MapId, _coord: Coord, _zoom: u8) {}

    fn map_merged(&self, _tenant: &TenantId, _source: MapId, _target: MapId, _shift: Coord) {}
}

/// Notifier backed by an unbounded tokio channel.
///
/// Cheap to clone. Sends never block and are silently dropped once the
/// receiver is gone.
#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<MapEvent>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<MapEvent>) -> Self {
        Self { tx }
    }

    /// Create a notifier together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MapEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    #[inline]
    fn send(&self, event: MapEvent) {
        // Receiver may have shut down
        let _ = self.tx.send(event);
    }
}

impl ChangeNotifier for ChannelNotifier {
    fn tile_changed(&self, tenant: &TenantId, map: MapId, coord: Coord, zoom: u8) {
        let Ok(exposed) = to_exposed_zoom(zoom) else {
            trace!(zoom, "Dropping tile event with out-of-range zoom");
            return;
        };
        self.send(MapEvent::TileChanged {
            tenant: tenant.clone(),
            map,
            coord,
            zoom: exposed,
        });
    }

    fn map_merged(&self, tenant: &TenantId, source: MapId, target: MapId, shift: Coord) {
        self.send(MapEvent::MapMerged {
            tenant: tenant.clone(),
            source,
            target,
            shift,
        });
    }
}
