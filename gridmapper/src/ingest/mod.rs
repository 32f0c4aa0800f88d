//! Grid upload ingest.
//!
//! See [`GridIngest`] for the placement and merge rules.

mod pipeline;
mod types;

pub use pipeline::{GridIngest, DEFAULT_GRID_UPDATE_INTERVAL_SECS, MAX_MERGE_ATTEMPTS};
pub use types::{CellFailure, IngestError, IngestReport, Placement, UploadBatch};
