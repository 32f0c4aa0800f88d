//! Image compositing and on-disk image storage.
//!
//! [`combine_images`] is the pure 2×2 downsample primitive; [`Compositor`]
//! wraps it with loading children from and writing the parent to an
//! [`ImageStore`].

mod compositor;
mod path;
mod store;
mod types;

pub use compositor::{combine_images, Compositor, PngCompositor};
pub use path::{grid_image_path, tile_image_path, tile_image_ref, GRIDS_DIR};
pub use store::{decode_tile, encode_png, ImageStore};
pub use types::{ImageError, DEFAULT_TILE_SIZE, TRANSPARENT};
