//! Coordinate type definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Base zoom level holding the uploaded grid images.
pub const BASE_ZOOM: u8 = 0;

/// Highest internal zoom level of the pyramid.
pub const MAX_ZOOM: u8 = 7;

/// Grid coordinates at the base zoom level.
///
/// Coordinates are relative to a map identity: the same value names different
/// places on different maps. At higher zoom levels the same type addresses
/// pyramid tiles, each covering a 2×2 block of the level below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// Column, growing east
    pub x: i32,
    /// Row, growing south
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the coordinate one zoom level up that contains this one.
    ///
    /// Uses floor division so that `(-1, -1)` maps to `(-1, -1)`, not `(0, 0)`.
    #[inline]
    pub fn parent(&self) -> Coord {
        Coord {
            x: self.x.div_euclid(2),
            y: self.y.div_euclid(2),
        }
    }

    /// Returns the four coordinates one zoom level down covered by this one.
    ///
    /// Order is top-left, top-right, bottom-left, bottom-right, which is also
    /// the quadrant order used by the compositor.
    #[inline]
    pub fn children(&self) -> [Coord; 4] {
        let (x, y) = (self.x * 2, self.y * 2);
        [
            Coord::new(x, y),
            Coord::new(x + 1, y),
            Coord::new(x, y + 1),
            Coord::new(x + 1, y + 1),
        ]
    }

    /// Component-wise addition, `None` if either axis overflows.
    #[inline]
    pub fn checked_add(self, rhs: Coord) -> Option<Coord> {
        Some(Coord::new(self.x.checked_add(rhs.x)?, self.y.checked_add(rhs.y)?))
    }

    /// Component-wise subtraction, `None` if either axis overflows.
    #[inline]
    pub fn checked_sub(self, rhs: Coord) -> Option<Coord> {
        Some(Coord::new(self.x.checked_sub(rhs.x)?, self.y.checked_sub(rhs.y)?))
    }

    /// Index of this coordinate within its parent's `children()` array.
    #[inline]
    pub fn quadrant(&self) -> usize {
        (self.x.rem_euclid(2) + self.y.rem_euclid(2) * 2) as usize
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.x, self.y)
    }
}

/// Errors that can occur during coordinate and zoom conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Zoom level is outside valid range (0 to MAX_ZOOM)
    InvalidZoom(u8),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, BASE_ZOOM, MAX_ZOOM
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
