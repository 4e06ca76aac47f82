//! Presets and feature flags.
//!
//! A preset is a named bundle of feature defaults plus the list of part
//! categories it shows. Explicit feature flags in the configuration
//! always win over the preset's defaults.

use serde::{Deserialize, Serialize};

/// Preset style for a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Simple profile picture editor (head, face, border).
    ProfileEditor,
    /// Full character customisation.
    CharacterMaker,
    /// RPG-style avatar (head, body, cosmetics).
    RpgAvatar,
    Custom,
}

impl Preset {
    /// Default feature flags for this preset.
    pub fn features(self) -> Features {
        match self {
            Preset::ProfileEditor => Features {
                multiple_sheets: false,
                allow_config_export: false,
                ..Features::default()
            },
            Preset::CharacterMaker | Preset::Custom => Features::default(),
            Preset::RpgAvatar => Features {
                show_labels: false,
                allow_config_export: false,
                ..Features::default()
            },
        }
    }

    /// Categories enabled by this preset, or `None` to leave parts alone.
    pub fn categories(self) -> Option<&'static [&'static str]> {
        match self {
            Preset::ProfileEditor => Some(&["head", "face", "border"]),
            Preset::CharacterMaker => Some(&["head", "body", "face", "cosmetic", "border"]),
            Preset::RpgAvatar => Some(&["head", "body", "cosmetic"]),
            Preset::Custom => None,
        }
    }
}

/// Feature flags as written in a configuration. Absent flags fall back
/// to the preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_toggle: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_sheets: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_labels: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_config_export: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_positioning: Option<bool>,
}

/// Fully resolved feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub allow_toggle: bool,
    pub multiple_sheets: bool,
    pub show_labels: bool,
    pub allow_config_export: bool,
    pub auto_positioning: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            allow_toggle: true,
            multiple_sheets: true,
            show_labels: true,
            allow_config_export: true,
            auto_positioning: true,
        }
    }
}

impl Features {
    /// Overlay explicit flags on top of these defaults.
    pub fn merge(self, flags: &FeatureFlags) -> Self {
        Self {
            allow_toggle: flags.allow_toggle.unwrap_or(self.allow_toggle),
            multiple_sheets: flags.multiple_sheets.unwrap_or(self.multiple_sheets),
            show_labels: flags.show_labels.unwrap_or(self.show_labels),
            allow_config_export: flags.allow_config_export.unwrap_or(self.allow_config_export),
            auto_positioning: flags.auto_positioning.unwrap_or(self.auto_positioning),
        }
    }
}
