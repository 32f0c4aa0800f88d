//! On-disk image storage.

use crate::compose::types::{ImageError, DEFAULT_TILE_SIZE};
use crate::fsutil::write_atomic;
use crate::store::ImageRef;
use image::{ImageFormat, RgbaImage};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Durable storage of image bytes addressed by [`ImageRef`].
///
/// Writes are atomic (temp file + rename) so a tile being served is never
/// observed half written.
#[derive(Debug, Clone)]
pub struct ImageStore {
    /// Storage root
    root: PathBuf,
    /// Edge length of every stored tile
    tile_size: u32,
}

impl ImageStore {
    /// Create an image store rooted at `root`, creating the directory.
    pub fn new(root: PathBuf) -> Result<Self, ImageError> {
        Self::with_tile_size(root, DEFAULT_TILE_SIZE)
    }

    /// Create an image store with a custom tile edge length.
    pub fn with_tile_size(root: PathBuf, tile_size: u32) -> Result<Self, ImageError> {
        if !root.exists() {
            fs::create_dir_all(&root)?;
        }
        Ok(Self { root, tile_size })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Absolute path of a stored image.
    pub fn resolve(&self, image: &ImageRef) -> PathBuf {
        self.root.join(image.relative_path())
    }

    /// Atomically write image bytes.
    pub fn write(&self, image: &ImageRef, data: &[u8]) -> Result<(), ImageError> {
        write_atomic(&self.resolve(image), data)?;
        Ok(())
    }

    /// Read image bytes, returning `None` if the file does not exist.
    pub fn read(&self, image: &ImageRef) -> Result<Option<Vec<u8>>, ImageError> {
        match fs::read(self.resolve(image)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read and decode a stored tile.
    pub fn load_rgba(&self, image: &ImageRef) -> Result<Option<RgbaImage>, ImageError> {
        match self.read(image)? {
            Some(data) => Ok(Some(decode_tile(&data, self.tile_size)?)),
            None => Ok(None),
        }
    }
}

/// Decode PNG bytes and check they form a `tile_size`×`tile_size` image.
pub fn decode_tile(data: &[u8], tile_size: u32) -> Result<RgbaImage, ImageError> {
    match image::guess_format(data) {
        Ok(ImageFormat::Png) => {}
        _ => return Err(ImageError::UnsupportedFormat),
    }

    let decoded = image::load_from_memory_with_format(data, ImageFormat::Png)
        .map_err(|e| ImageError::Decode(e.to_string()))?
        .to_rgba8();

    if decoded.width() != tile_size || decoded.height() != tile_size {
        return Err(ImageError::Dimensions {
            width: decoded.width(),
            height: decoded.height(),
            expected: tile_size,
        });
    }
    Ok(decoded)
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut io::Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buffer)
}
