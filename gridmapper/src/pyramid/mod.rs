//! Zoom pyramid maintenance.
//!
//! Internal zoom 0 holds the uploaded grids; each level above composites
//! 2×2 children into one half-resolution parent, up to `MAX_ZOOM`.
//! [`PyramidRebuilder::rebuild`] handles the incremental path after an
//! ingest, [`PyramidRebuilder::repair`] the bounded background sweep, and
//! [`RepairDaemon`] schedules the latter.

mod daemon;
mod rebuilder;
mod repair;
mod types;

pub use daemon::{RepairDaemon, DEFAULT_REPAIR_INTERVAL_SECS, DEFAULT_REPAIR_MAX_TILES};
pub use rebuilder::PyramidRebuilder;
pub use types::{RebuildError, RebuildStats, RepairStats};
