//! avakit - Layered avatar compositor
//!
//! A library for composing avatars from sprite-sheet parts: sheets are
//! sliced into sprites, parts are positioned relative to each other, and
//! the result is drawn onto a pixel-scaled canvas and exported.

pub mod assets;
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod output;
pub mod render;
pub mod types;
pub mod upload;
pub mod validation;

pub use assets::{FileLoader, ImageCache, ImageLoader};
pub use config::{Composition, Part};
pub use error::{AvatarError, Result};
pub use layout::{resolve_positions, Position, PositionMap, PositionResolver, Resolution};
pub use render::{
    encode, render, required_urls, slice_sheet, sprite_at, Canvas, Compositor, DrawCall,
    EncodedImage, ExportOptions, RenderOutcome,
};
pub use types::{
    AvatarConfig, Colour, ExportConfig, ImageFormat, PartDescriptor, Selection, SelectionValue,
    Sprite, SpriteSheetDescriptor, UploadConfig,
};
pub use upload::{upload, UploadRequest, UploadResponse, Uploader};
pub use validation::{validate_config, validate_selection, Diagnostic, Severity, ValidationResult};
