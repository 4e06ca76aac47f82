//! Top-level avatar configuration.
//!
//! This is the document callers author (or load from JSON/YAML). It keeps
//! every optional field optional so that it round-trips without loss;
//! defaults are applied later by `config::Composition`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::part::PartDescriptor;
use super::preset::{FeatureFlags, Preset};

/// Default encoder quality for lossy formats.
pub const DEFAULT_QUALITY: f64 = 0.92;

/// Rendering mode. Carried through for host UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarMode {
    Full,
    Torso,
}

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Webp => "webp",
        }
    }

    /// Guess a format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Settings passed through to the export collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ImageFormat>,
    /// Quality for JPEG/WebP, 0..=1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    /// Background colour; transparent when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Output scale factor (1 = original size).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

/// HTTP method for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Post,
    Put,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Post => f.write_str("POST"),
            HttpMethod::Put => f.write_str("PUT"),
        }
    }
}

/// Settings passed through to the upload collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadConfig {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<BTreeMap<String, String>>,
}

/// Main configuration for an avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarConfig {
    /// Ordered part list; declaration order breaks z-index ties.
    pub parts: Vec<PartDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<AvatarMode>,
    /// Canvas width in final pixels.
    pub width: u32,
    /// Canvas height in final pixels.
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_config: Option<ExportConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_config: Option<UploadConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureFlags>,
    /// Uniform upscale factor applied at draw time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_scale: Option<f64>,
}

impl AvatarConfig {
    /// Create a configuration with the given canvas size and parts.
    pub fn new(width: u32, height: u32, parts: Vec<PartDescriptor>) -> Self {
        Self {
            parts,
            mode: None,
            width,
            height,
            export_config: None,
            upload_config: None,
            preset: None,
            features: None,
            pixel_scale: None,
        }
    }

    pub fn with_pixel_scale(mut self, scale: f64) -> Self {
        self.pixel_scale = Some(scale);
        self
    }

    pub fn with_export(mut self, export: ExportConfig) -> Self {
        self.export_config = Some(export);
        self
    }

    /// Look up a part by category.
    pub fn part(&self, category: &str) -> Option<&PartDescriptor> {
        self.parts.iter().find(|p| p.category == category)
    }

    /// Record a preset. Feature flags already present are kept as overrides.
    pub fn apply_preset(mut self, preset: Preset) -> Self {
        self.preset = Some(preset);
        self
    }

    /// Enable exactly the parts in the preset's category list.
    ///
    /// Rendering never does this on its own. Without a preset, or with
    /// `custom`, the configuration is returned unchanged.
    pub fn filter_by_preset(mut self) -> Self {
        if let Some(categories) = self.preset.and_then(|p| p.categories()) {
            for part in &mut self.parts {
                part.enabled = Some(categories.contains(&part.category.as_str()));
            }
        }
        self
    }
}
