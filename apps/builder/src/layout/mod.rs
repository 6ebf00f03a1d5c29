// Raster layout: turns a visual tree into pixels.
// Painting is CPU-bound; async callers run it inside tokio::task::spawn_blocking.

pub mod face;
pub mod paint;
pub mod raster;
pub mod wrap;

pub use face::{BlockFace, FontFace, FontSet, FontdueFace};
pub use paint::rasterize;
pub use raster::RasterImage;
