//! Image errors and tile dimensions.

use thiserror::Error;

/// Default edge length of a grid image in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 100;

/// Fully transparent pixel used for absent quadrants.
pub const TRANSPARENT: image::Rgba<u8> = image::Rgba([0, 0, 0, 0]);

/// Image-related errors.
#[derive(Debug, Error)]
pub enum ImageError {
    /// I/O error while reading or writing image files
    #[error("Image I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored or uploaded bytes are not a decodable image
    #[error("Image decode error: {0}")]
    Decode(String),

    /// Composite could not be encoded
    #[error("Image encode error: {0}")]
    Encode(String),

    /// Upload is not in the accepted container format
    #[error("Unsupported image format (expected PNG)")]
    UnsupportedFormat,

    /// Image does not have the configured tile dimensions
    #[error("Invalid image dimensions {width}x{height} (expected {expected}x{expected})")]
    Dimensions {
        width: u32,
        height: u32,
        expected: u32,
    },
}
