//! Defaults merging.
//!
//! `Composition::from_config` turns an authored `AvatarConfig` (where
//! almost everything is optional) into fully populated parts and render
//! settings, so the layout and drawing code never checks for absent
//! fields. Preset feature flags are folded in here too; the preset's
//! category list is only applied through `AvatarConfig::filter_by_preset`.

use crate::error::{AvatarError, Result};
use crate::render::ExportOptions;
use crate::types::{
    AnchorX, AnchorY, AvatarConfig, Colour, Direction, Features, PartDescriptor, SelectionValue,
    SpriteSheetDescriptor,
};

/// Explicit coordinates, canvas anchors and offsets for a part.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Placement {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub offset_x: f64,
    pub offset_y: f64,
    pub anchor_x: AnchorX,
    pub anchor_y: AnchorY,
}

/// A resolved auto-position: follow `target` in `direction`.
#[derive(Debug, Clone, PartialEq)]
pub struct Follow {
    pub target: String,
    pub direction: Direction,
    pub gap: f64,
}

/// A part with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub category: String,
    pub z_index: i32,
    /// Sheet used by plain sprite indexes.
    pub primary: Option<SpriteSheetDescriptor>,
    /// Sheets addressable by `sheetIndex`.
    pub sheets: Vec<SpriteSheetDescriptor>,
    pub placement: Placement,
    pub follow: Option<Follow>,
    pub enabled: bool,
    pub optional: bool,
    pub label: Option<String>,
}

impl Part {
    /// Build a part using the given feature set.
    pub fn from_descriptor(descriptor: &PartDescriptor, features: &Features) -> Self {
        let position = descriptor.position.clone().unwrap_or_default();
        let placement = Placement {
            x: position.x,
            y: position.y,
            offset_x: position.offset_x.unwrap_or(0.0),
            offset_y: position.offset_y.unwrap_or(0.0),
            anchor_x: position.anchor_x.unwrap_or_default(),
            anchor_y: position.anchor_y.unwrap_or_default(),
        };

        let follow = descriptor
            .auto_position
            .as_ref()
            .filter(|_| features.auto_positioning)
            .and_then(|auto| {
                auto.relative_to.as_ref().map(|target| Follow {
                    target: target.clone(),
                    direction: auto.mode.unwrap_or_default(),
                    gap: auto.gap.unwrap_or(0.0),
                })
            });

        let primary = descriptor.primary_sheet().cloned();
        let sheets = if features.multiple_sheets {
            descriptor.sheets().into_iter().cloned().collect()
        } else {
            primary.iter().cloned().collect()
        };

        Self {
            category: descriptor.category.clone(),
            z_index: descriptor.z_index.unwrap_or(0),
            primary,
            sheets,
            placement,
            follow,
            enabled: descriptor.is_enabled(),
            optional: descriptor.is_optional(),
            label: descriptor.label.clone(),
        }
    }

    /// The sheet and sprite index a selection points at.
    ///
    /// Returns `None` for no selection or a sheet that doesn't exist.
    /// The sprite index itself is checked after slicing.
    pub fn sheet_for(&self, value: SelectionValue) -> Option<(&SpriteSheetDescriptor, usize)> {
        match value {
            SelectionValue::None => None,
            SelectionValue::Single(index) => self.primary.as_ref().map(|sheet| (sheet, index)),
            SelectionValue::Indexed {
                sheet_index,
                sprite_index,
            } => self.sheets.get(sheet_index).map(|sheet| (sheet, sprite_index)),
        }
    }
}

impl From<&PartDescriptor> for Part {
    fn from(descriptor: &PartDescriptor) -> Self {
        Part::from_descriptor(descriptor, &Features::default())
    }
}

/// A configuration ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Canvas width in final pixels.
    pub width: u32,
    /// Canvas height in final pixels.
    pub height: u32,
    pub pixel_scale: f64,
    pub background: Option<Colour>,
    pub features: Features,
    pub export: ExportOptions,
    /// Parts in declaration order.
    pub parts: Vec<Part>,
}

impl Composition {
    /// Apply defaults, preset and feature flags to a configuration.
    pub fn from_config(config: &AvatarConfig) -> Result<Self> {
        let pixel_scale = config.pixel_scale.unwrap_or(1.0);
        if !pixel_scale.is_finite() || pixel_scale <= 0.0 {
            return Err(AvatarError::Validation {
                message: format!("pixelScale must be a positive number, got {}", pixel_scale),
                help: Some("Use 1 for no scaling, 2 for double size, ...".to_string()),
            });
        }

        let export = ExportOptions::from_config(config.export_config.as_ref())?;

        let defaults = config.preset.map(|p| p.features()).unwrap_or_default();
        let features = match &config.features {
            Some(flags) => defaults.merge(flags),
            None => defaults,
        };

        let parts = config
            .parts
            .iter()
            .map(|descriptor| Part::from_descriptor(descriptor, &features))
            .collect();

        Ok(Self {
            width: config.width,
            height: config.height,
            pixel_scale,
            background: export.background,
            features,
            export,
            parts,
        })
    }

    /// Canvas size in unscaled units, the space positions live in.
    pub fn logical_size(&self) -> (f64, f64) {
        (
            self.width as f64 / self.pixel_scale,
            self.height as f64 / self.pixel_scale,
        )
    }

    pub fn part(&self, category: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.category == category)
    }

    /// Enabled parts sorted by z-index; ties keep declaration order.
    pub fn draw_order(&self) -> Vec<&Part> {
        let mut parts: Vec<&Part> = self.parts.iter().filter(|p| p.enabled).collect();
        parts.sort_by_key(|p| p.z_index);
        parts
    }
}
