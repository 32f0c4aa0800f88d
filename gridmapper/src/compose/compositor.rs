//! Parent tile compositing.
//!
//! A parent tile covers the 2×2 block of its children one zoom level down.
//! Each present child is box-filtered to half size and placed into its
//! quadrant; absent quadrants stay fully transparent. Integer averaging and
//! a fixed PNG encoder make the output bit-identical for identical inputs,
//! which keeps repeated repair passes from flip-flopping tiles.

use crate::compose::path::tile_image_ref;
use crate::compose::store::{encode_png, ImageStore};
use crate::compose::types::{ImageError, TRANSPARENT};
use crate::coord::Coord;
use crate::store::{ImageRef, MapId, TenantId};
use image::{Rgba, RgbaImage};
use std::sync::Arc;
use tracing::{trace, warn};

/// Produces a parent tile from up to four child tiles.
pub trait Compositor: Send + Sync {
    /// Composite `children` (in [`Coord::children`] order) into the tile at
    /// `(map, coord, zoom)` and return a handle to the stored result.
    fn combine(
        &self,
        tenant: &TenantId,
        map: MapId,
        coord: Coord,
        zoom: u8,
        children: &[Option<ImageRef>; 4],
    ) -> Result<ImageRef, ImageError>;
}

/// Compositor writing PNG tiles into an [`ImageStore`].
pub struct PngCompositor {
    images: Arc<ImageStore>,
}

impl PngCompositor {
    pub fn new(images: Arc<ImageStore>) -> Self {
        Self { images }
    }
}

impl Compositor for PngCompositor {
    fn combine(
        &self,
        tenant: &TenantId,
        map: MapId,
        coord: Coord,
        zoom: u8,
        children: &[Option<ImageRef>; 4],
    ) -> Result<ImageRef, ImageError> {
        let tile_size = self.images.tile_size();

        let mut loaded: [Option<RgbaImage>; 4] = [None, None, None, None];
        for (slot, child) in loaded.iter_mut().zip(children.iter()) {
            if let Some(image) = child {
                *slot = self.images.load_rgba(image)?;
                if slot.is_none() {
                    // Row exists but the file is gone; render the quadrant blank
                    warn!(
                        tenant = %tenant,
                        map = %map,
                        image = %image,
                        "Child image missing on disk, leaving quadrant blank"
                    );
                }
            }
        }

        let refs = [
            loaded[0].as_ref(),
            loaded[1].as_ref(),
            loaded[2].as_ref(),
            loaded[3].as_ref(),
        ];
        let composite = combine_images(&refs, tile_size)?;

        let target = tile_image_ref(tenant, map, coord, zoom);
        self.images.write(&target, &encode_png(&composite)?)?;

        trace!(tenant = %tenant, map = %map, zoom, coord = %coord, "Tile composited");
        Ok(target)
    }
}

/// Combine up to four `tile_size` images into one half-resolution mosaic.
///
/// `children` follows [`Coord::children`] order: top-left, top-right,
/// bottom-left, bottom-right.
pub fn combine_images(
    children: &[Option<&RgbaImage>; 4],
    tile_size: u32,
) -> Result<RgbaImage, ImageError> {
    let mut canvas = RgbaImage::from_pixel(tile_size, tile_size, TRANSPARENT);
    let half = tile_size / 2;

    for (quadrant, child) in children.iter().enumerate() {
        let Some(child) = child else {
            continue;
        };
        if child.width() != tile_size || child.height() != tile_size {
            return Err(ImageError::Dimensions {
                width: child.width(),
                height: child.height(),
                expected: tile_size,
            });
        }

        let x_offset = (quadrant as u32 % 2) * half;
        let y_offset = (quadrant as u32 / 2) * half;
        place_downsampled(&mut canvas, child, x_offset, y_offset, half);
    }

    Ok(canvas)
}

/// Box-filter `source` by 2× and write it at the given offset.
fn place_downsampled(
    canvas: &mut RgbaImage,
    source: &RgbaImage,
    x_offset: u32,
    y_offset: u32,
    half: u32,
) {
    for y in 0..half {
        for x in 0..half {
            let p00 = source.get_pixel(x * 2, y * 2);
            let p10 = source.get_pixel(x * 2 + 1, y * 2);
            let p01 = source.get_pixel(x * 2, y * 2 + 1);
            let p11 = source.get_pixel(x * 2 + 1, y * 2 + 1);

            let avg = |c: usize| {
                ((p00[c] as u16 + p10[c] as u16 + p01[c] as u16 + p11[c] as u16) / 4) as u8
            };

            canvas.put_pixel(
                x_offset + x,
                y_offset + y,
                Rgba([avg(0), avg(1), avg(2), avg(3)]),
            );
        }
    }
}
