//! Coordinate model
//!
//! Integer grid coordinates with parent/child derivation for walking the
//! zoom pyramid, plus the conversion between internal zoom levels (0 = base
//! grids) and the reversed numbering exposed to tile consumers.

mod types;

pub use types::{Coord, CoordError, BASE_ZOOM, MAX_ZOOM};

/// Converts an internal zoom level to the externally exposed numbering.
///
/// Internally zoom 0 holds the uploaded grids; consumers see it as `MAX_ZOOM`.
#[inline]
pub fn to_exposed_zoom(internal: u8) -> Result<u8, CoordError> {
    if internal > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(internal));
    }
    Ok(MAX_ZOOM - internal)
}

/// Converts an externally exposed zoom level to the internal numbering.
#[inline]
pub fn from_exposed_zoom(exposed: u8) -> Result<u8, CoordError> {
    if exposed > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(exposed));
    }
    Ok(MAX_ZOOM - exposed)
}

/// Returns the ancestor of a base coordinate at the given zoom level.
#[inline]
pub fn ancestor_at(coord: Coord, zoom: u8) -> Coord {
    (0..zoom).fold(coord, |c, _| c.parent())
}
