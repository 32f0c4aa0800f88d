//! Data model rows for maps, grids and pyramid tiles.

use crate::coord::Coord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Identifier of a tenant.
///
/// Tenant ids end up in on-disk paths, so only ASCII alphanumerics, `-`, `_`
/// and `.` are accepted and the id may not start with a dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Create a tenant id, validating that it is safe to use as a path segment.
    pub fn new(id: impl Into<String>) -> Result<Self, StoreError> {
        let id = id.into();
        if !is_safe_name(&id) {
            return Err(StoreError::InvalidTenant(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns true if `name` can be used verbatim as a single path segment.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 128
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Numeric map identity, assigned sequentially per tenant and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub u64);

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A logical map identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    pub id: MapId,
    pub name: String,
    pub hidden: bool,
    /// Informational only; merges always target the lower id.
    pub priority: i32,
    pub created: DateTime<Utc>,
}

/// Registration of one uploaded grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridData {
    /// Client-assigned id, stable across re-uploads of the same location
    pub id: String,
    pub map: MapId,
    /// Position at the base zoom level
    pub coord: Coord,
    /// When the client should next be asked for a fresh image
    pub next_update: DateTime<Utc>,
}

/// Handle to stored image bytes, relative to the image store root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(PathBuf);

impl ImageRef {
    pub fn new(relative: impl Into<PathBuf>) -> Self {
        Self(relative.into())
    }

    pub fn relative_path(&self) -> &std::path::Path {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// One stored pyramid tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileData {
    pub map: MapId,
    pub coord: Coord,
    pub zoom: u8,
    pub image: ImageRef,
    /// Last modification, used for HTTP caching and staleness detection
    pub updated: DateTime<Utc>,
}

/// Store-related errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error while reading or writing a snapshot
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded or decoded
    #[error("Snapshot format error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Unsupported snapshot version
    #[error("Unsupported snapshot version {found} (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },

    /// Tenant id is not usable
    #[error("Invalid tenant id: '{0}'")]
    InvalidTenant(String),

    /// Backing storage is not reachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_id_accepts_simple_names() {
        assert!(TenantId::new("default").is_ok());
        assert!(TenantId::new("guild-42_eu.1").is_ok());
    }

    #[test]
    fn test_tenant_id_rejects_path_tricks() {
        for bad in ["", "..", ".hidden", "a/b", "a\\b", "tenant name"] {
            assert!(
                matches!(TenantId::new(bad), Err(StoreError::InvalidTenant(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_map_id_ordering() {
        assert!(MapId(3) < MapId(7));
        assert_eq!(MapId(12).to_string(), "12");
    }

    #[test]
    fn test_image_ref_display() {
        let r = ImageRef::new("t/grids/abc.png");
        assert_eq!(r.to_string(), "t/grids/abc.png");
    }
}
