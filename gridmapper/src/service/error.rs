//! Service error types.

use crate::compose::ImageError;
use crate::coord::MAX_ZOOM;
use crate::ingest::IngestError;
use crate::pyramid::RebuildError;
use crate::store::StoreError;
use std::fmt;

/// Errors that can occur during service operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Exposed zoom level out of range
    InvalidZoom { zoom: u8, max: u8 },
    /// Metadata store failure
    Store(StoreError),
    /// Image storage failure
    Image(ImageError),
    /// Whole-batch ingest failure
    Ingest(IngestError),
    /// Rebuild or repair failure
    Rebuild(RebuildError),
}

impl ServiceError {
    pub(crate) fn invalid_zoom(zoom: u8) -> Self {
        Self::InvalidZoom {
            zoom,
            max: MAX_ZOOM,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidZoom { zoom, max } => {
                write!(f, "Invalid zoom level {}: must be between 0 and {}", zoom, max)
            }
            Self::Store(e) => write!(f, "Store error: {}", e),
            Self::Image(e) => write!(f, "Image error: {}", e),
            Self::Ingest(e) => write!(f, "Ingest error: {}", e),
            Self::Rebuild(e) => write!(f, "Rebuild error: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::Image(e) => Some(e),
            Self::Ingest(e) => Some(e),
            Self::Rebuild(e) => Some(e),
            Self::InvalidZoom { .. } => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<ImageError> for ServiceError {
    fn from(e: ImageError) -> Self {
        Self::Image(e)
    }
}

impl From<IngestError> for ServiceError {
    fn from(e: IngestError) -> Self {
        Self::Ingest(e)
    }
}

impl From<RebuildError> for ServiceError {
    fn from(e: RebuildError) -> Self {
        Self::Rebuild(e)
    }
}
