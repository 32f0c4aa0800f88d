//! Upload batches, ingest reports and errors.

use crate::coord::Coord;
use crate::merge::MergeError;
use crate::pyramid::{RebuildError, RebuildStats};
use crate::store::{MapId, StoreError, TenantId};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::warn;

/// A rectangular block of grid placements uploaded together.
///
/// `cells[row][col]` holds the grid id at batch-relative position
/// `Coord { x: col, y: row }`. Blank cells are `None` or whitespace.
#[derive(Debug, Clone)]
pub struct UploadBatch {
    pub tenant: TenantId,
    pub cells: Vec<Vec<Option<String>>>,
    /// Raw image bytes keyed by grid id
    pub images: HashMap<String, Vec<u8>>,
}

/// One non-blank cell of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub grid_id: String,
    /// Position relative to the batch's top-left cell
    pub rel: Coord,
}

impl UploadBatch {
    pub fn new(tenant: TenantId, cells: Vec<Vec<Option<String>>>) -> Self {
        Self {
            tenant,
            cells,
            images: HashMap::new(),
        }
    }

    /// Attach image bytes for a grid id.
    pub fn with_image(mut self, grid_id: impl Into<String>, data: Vec<u8>) -> Self {
        self.images.insert(grid_id.into(), data);
        self
    }

    /// Non-blank cells in row-major order.
    ///
    /// A grid id repeated within the batch keeps its first position; the
    /// later ones are returned separately.
    pub fn placements(&self) -> (Vec<Placement>, Vec<Placement>) {
        let mut seen = HashSet::new();
        let mut placements = Vec::new();
        let mut duplicates = Vec::new();

        for (row, cells) in self.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let Some(id) = cell.as_deref().map(str::trim) else {
                    continue;
                };
                if id.is_empty() {
                    continue;
                }
                let placement = Placement {
                    grid_id: id.to_string(),
                    rel: Coord::new(col as i32, row as i32),
                };
                if seen.insert(placement.grid_id.clone()) {
                    placements.push(placement);
                } else {
                    warn!(grid = %id, rel = %placement.rel, "Grid id repeated within batch");
                    duplicates.push(placement);
                }
            }
        }

        (placements, duplicates)
    }
}

/// A cell that could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellFailure {
    pub grid_id: String,
    pub reason: String,
}

/// Outcome of an ingest batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Map the batch was placed on, `None` for an empty batch
    pub map: Option<MapId>,
    /// Cells registered successfully
    pub accepted: usize,
    pub failures: Vec<CellFailure>,
    /// Known grids whose recorded coordinate disagreed with the batch
    pub inconsistent: usize,
    /// Maps merged into the target while placing the batch
    pub merges: usize,
    /// Placed grids the client should upload an image for
    pub requested_uploads: Vec<String>,
    pub rebuild: RebuildStats,
}

impl IngestReport {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Hard failures of a whole ingest batch.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Store error during ingest: {0}")]
    Store(#[from] StoreError),

    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("Pyramid rebuild failed: {0}")]
    Rebuild(#[from] RebuildError),

    /// The offsets of two maps are too far apart to express as a shift
    #[error("Cannot shift map {source_map} from {source_offset} onto {target_offset}")]
    OffsetOverflow {
        source_map: MapId,
        source_offset: Coord,
        target_offset: Coord,
    },

    /// Concurrent merges kept invalidating the batch's map resolution
    #[error("Map resolution did not settle after {attempts} merge rounds")]
    UnstableMerge { attempts: usize },
}
