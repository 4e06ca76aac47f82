//! Part descriptors: one logical avatar layer per category.
//!
//! A part owns one or more sprite sheets and says where its sprite goes,
//! either with explicit coordinates, canvas anchors, or relative to
//! another part.
//!
//! # Example
//!
//! ```json
//! {
//!   "category": "body",
//!   "zIndex": 1,
//!   "spriteSheet": { "url": "body.png", "spriteWidth": 32, "spriteHeight": 32, "columns": 4, "rows": 1 },
//!   "autoPosition": { "relativeTo": "head", "position": "below", "gap": 0 }
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::sheet::SpriteSheetDescriptor;

/// Horizontal canvas anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorX {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical canvas anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorY {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Where a part sits relative to the part it follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    #[default]
    Below,
    Left,
    Right,
    Center,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Above => "above",
            Direction::Below => "below",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Center => "center",
        };
        f.write_str(name)
    }
}

/// Explicit placement and canvas anchoring.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartPosition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_x: Option<AnchorX>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_y: Option<AnchorY>,
}

/// Positioning relative to another part's resolved position.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPosition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_to: Option<String>,
    #[serde(default, rename = "position", alias = "mode", skip_serializing_if = "Option::is_none")]
    pub mode: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
}

impl AutoPosition {
    /// Follow `category` in the given direction.
    pub fn new(category: impl Into<String>, mode: Direction, gap: f64) -> Self {
        Self {
            relative_to: Some(category.into()),
            mode: Some(mode),
            gap: Some(gap),
        }
    }
}

/// Configuration for one category of avatar parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartDescriptor {
    /// Unique key within a configuration.
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_sheet: Option<SpriteSheetDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_sheets: Option<Vec<SpriteSheetDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PartPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_position: Option<AutoPosition>,
    /// Whether a `none` selection is allowed for this part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl PartDescriptor {
    /// Create a part backed by a single sheet.
    pub fn new(category: impl Into<String>, sheet: SpriteSheetDescriptor) -> Self {
        Self {
            category: category.into(),
            sprite_sheet: Some(sheet),
            sprite_sheets: None,
            z_index: None,
            position: None,
            auto_position: None,
            optional: None,
            label: None,
            enabled: None,
        }
    }

    /// Create a part backed by several sheets.
    pub fn with_sheets(category: impl Into<String>, sheets: Vec<SpriteSheetDescriptor>) -> Self {
        Self {
            sprite_sheet: None,
            sprite_sheets: Some(sheets),
            ..Self::new(category, SpriteSheetDescriptor::new("", 0, 0, 0, 0))
        }
    }

    pub fn z_index(mut self, z: i32) -> Self {
        self.z_index = Some(z);
        self
    }

    pub fn position(mut self, position: PartPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn auto_position(mut self, auto: AutoPosition) -> Self {
        self.auto_position = Some(auto);
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = Some(optional);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// All sheets of this part, in selection order.
    ///
    /// `spriteSheets` wins when present; otherwise the single
    /// `spriteSheet` is sheet 0.
    pub fn sheets(&self) -> Vec<&SpriteSheetDescriptor> {
        match &self.sprite_sheets {
            Some(sheets) if !sheets.is_empty() => sheets.iter().collect(),
            _ => self.sprite_sheet.iter().collect(),
        }
    }

    /// The sheet a plain sprite index selects from.
    pub fn primary_sheet(&self) -> Option<&SpriteSheetDescriptor> {
        self.sprite_sheet
            .as_ref()
            .or_else(|| self.sprite_sheets.as_ref().and_then(|s| s.first()))
    }

    /// Every sheet referenced by this part, including both forms.
    pub fn all_sheets(&self) -> impl Iterator<Item = &SpriteSheetDescriptor> {
        self.sprite_sheet
            .iter()
            .chain(self.sprite_sheets.iter().flatten())
    }

    /// The category this part follows, if any.
    pub fn relative_to(&self) -> Option<&str> {
        self.auto_position
            .as_ref()
            .and_then(|a| a.relative_to.as_deref())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn is_optional(&self) -> bool {
        self.optional.unwrap_or(false)
    }
}
