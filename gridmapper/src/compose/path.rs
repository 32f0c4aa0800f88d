//! Image path construction.
//!
//! Layout under the image store root:
//!
//! ```text
//! <tenant>/grids/<grid_id>.png            uploaded base grids, one per grid id
//! <tenant>/<map>/<zoom>/<x>_<y>.png       composited pyramid tiles
//! ```
//!
//! Base grids are keyed by grid id rather than by map so that a merge can
//! re-point zoom-0 tiles at the same file without copying pixels.

use crate::coord::Coord;
use crate::store::{ImageRef, MapId, TenantId};
use std::path::PathBuf;

/// Directory name holding uploaded grid images inside a tenant directory.
pub const GRIDS_DIR: &str = "grids";

/// Relative path of an uploaded grid image.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use gridmapper::compose::grid_image_path;
/// use gridmapper::store::TenantId;
///
/// let tenant = TenantId::new("guild").unwrap();
/// assert_eq!(
///     grid_image_path(&tenant, "a1b2c3"),
///     PathBuf::from("guild/grids/a1b2c3.png")
/// );
/// ```
pub fn grid_image_path(tenant: &TenantId, grid_id: &str) -> PathBuf {
    PathBuf::from(tenant.as_str())
        .join(GRIDS_DIR)
        .join(format!("{}.png", grid_id))
}

/// Relative path of a composited pyramid tile.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use gridmapper::compose::tile_image_path;
/// use gridmapper::coord::Coord;
/// use gridmapper::store::{MapId, TenantId};
///
/// let tenant = TenantId::new("guild").unwrap();
/// assert_eq!(
///     tile_image_path(&tenant, MapId(3), Coord::new(-2, 5), 4),
///     PathBuf::from("guild/3/4/-2_5.png")
/// );
/// ```
pub fn tile_image_path(tenant: &TenantId, map: MapId, coord: Coord, zoom: u8) -> PathBuf {
    PathBuf::from(tenant.as_str())
        .join(map.to_string())
        .join(zoom.to_string())
        .join(format!("{}.png", coord))
}

/// Image reference for a composited tile.
pub fn tile_image_ref(tenant: &TenantId, map: MapId, coord: Coord, zoom: u8) -> ImageRef {
    ImageRef::new(tile_image_path(tenant, map, coord, zoom))
}
