//! Merge outcomes and errors.

use crate::coord::Coord;
use crate::store::{MapId, StoreError};
use std::collections::HashSet;
use thiserror::Error;

/// Result of a merge attempt.
///
/// Races with concurrent merges are reported here, not as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Source was migrated into the target and deleted.
    Merged {
        /// Target zoom-0 coordinates that received a migrated tile
        dirty: HashSet<Coord>,
        grids_moved: usize,
        tiles_moved: usize,
    },

    /// Source map and all of its rows are gone; another merge already
    /// consumed it.
    SourceGone,

    /// Target map no longer exists; nothing was touched.
    TargetGone,
}

impl MergeOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self, MergeOutcome::Merged { .. })
    }
}

/// Merge failures.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Cannot merge map {0} into itself")]
    SameMap(MapId),

    #[error("Shifting map {source_map} by {shift} leaves the coordinate range at {coord}")]
    CoordinateOverflow {
        source_map: MapId,
        coord: Coord,
        shift: Coord,
    },

    #[error("Store error during merge: {0}")]
    Store(#[from] StoreError),
}
