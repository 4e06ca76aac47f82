//! Rendering for avakit.
//!
//! This module slices sprite sheets, composites the selected sprites onto
//! a canvas and exports the result.

mod canvas;
mod compositor;
mod export;
mod slice;

pub use canvas::Canvas;
pub use compositor::{render, required_urls, Compositor, DrawCall, RenderOutcome};
pub use export::{
    encode, flatten, scale_nearest, scaled_size, write_image, EncodedImage, ExportOptions,
    MAX_EXPORT_DIMENSION,
};
pub use slice::{slice_sheet, sprite_at};
