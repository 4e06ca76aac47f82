//! Core value types for avakit.
//!
//! Everything here is plain data owned by the caller for one render:
//! - `SpriteSheetDescriptor` / `Sprite` - sheet grids and their cells
//! - `PartDescriptor` - one avatar layer and how it is positioned
//! - `Selection` - which sprite each category shows
//! - `AvatarConfig` - the whole document, including export/upload settings

mod colour;
mod config;
mod part;
mod preset;
mod selection;
mod sheet;

pub use colour::Colour;
pub use config::{AvatarConfig, AvatarMode, ExportConfig, HttpMethod, ImageFormat, UploadConfig, DEFAULT_QUALITY};
pub use part::{AnchorX, AnchorY, AutoPosition, Direction, PartDescriptor, PartPosition};
pub use preset::{FeatureFlags, Features, Preset};
pub use selection::{Selection, SelectionValue};
pub use sheet::{ContentBounds, Sprite, SpriteSheetDescriptor, Trim};
