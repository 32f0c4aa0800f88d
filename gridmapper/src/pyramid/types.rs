//! Rebuild statistics and errors.

use crate::compose::ImageError;
use crate::store::StoreError;
use thiserror::Error;

/// Summary of one incremental rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    /// Composite tiles written across all levels
    pub tiles_written: usize,
    /// Highest internal zoom level that received a write (0 if none)
    pub top_zoom: u8,
}

impl RebuildStats {
    pub(crate) fn absorb(&mut self, other: RebuildStats) {
        self.tiles_written += other.tiles_written;
        self.top_zoom = self.top_zoom.max(other.top_zoom);
    }
}

/// Summary of one repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairStats {
    /// Maps whose pyramid was inspected
    pub maps_scanned: usize,
    /// Stale or missing parent tiles recomposited
    pub tiles_repaired: usize,
    /// The tile budget ran out before every map was inspected
    pub exhausted: bool,
    /// The pass stopped because cancellation was requested
    pub cancelled: bool,
}

/// Hard failures of a rebuild or repair unit of work.
#[derive(Debug, Error)]
pub enum RebuildError {
    #[error("Store error during rebuild: {0}")]
    Store(#[from] StoreError),

    #[error("Compositing failed: {0}")]
    Image(#[from] ImageError),
}
