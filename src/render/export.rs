//! Export of a finished composite.
//!
//! Takes the rendered raster, upscales it with nearest-neighbour
//! duplication, optionally flattens it onto a background colour and
//! encodes it as PNG, JPEG or WebP.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Pixel, Rgba, RgbaImage};

use crate::error::{AvatarError, Result};
use crate::types::{Colour, ExportConfig, ImageFormat, DEFAULT_QUALITY};

/// Export settings with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub format: ImageFormat,
    /// Encoder quality, 0..=1. Only JPEG uses it.
    pub quality: f64,
    /// Output upscale factor; values below 1 are treated as 1.
    pub scale: f64,
    pub background: Option<Colour>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            quality: DEFAULT_QUALITY,
            scale: 1.0,
            background: None,
        }
    }
}

impl ExportOptions {
    /// Fill in defaults for an optional `exportConfig`.
    pub fn from_config(config: Option<&ExportConfig>) -> Result<Self> {
        let defaults = Self::default();
        let Some(config) = config else {
            return Ok(defaults);
        };

        let background = config
            .background_color
            .as_deref()
            .map(|s| {
                Colour::parse(s).map_err(|_| AvatarError::Validation {
                    message: format!("Invalid backgroundColor '{}'", s),
                    help: Some(
                        "Use a hex colour (#RRGGBB), 'transparent', or a CSS colour name".to_string(),
                    ),
                })
            })
            .transpose()?;

        Ok(Self {
            format: config.format.unwrap_or(defaults.format),
            quality: config.quality.unwrap_or(defaults.quality),
            scale: config.scale.unwrap_or(defaults.scale),
            background,
        })
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Encoded output bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// `data:<mime>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Largest exported edge, in pixels. Matches the canvas limit of
/// mainstream browsers.
pub const MAX_EXPORT_DIMENSION: u32 = 16_384;

/// Output size of a `width` x `height` image scaled by `scale`.
///
/// Scales of 1 or less (or not a number) keep the size. `None` when an
/// upscaled edge would exceed [`MAX_EXPORT_DIMENSION`].
pub fn scaled_size(width: u32, height: u32, scale: f64) -> Option<(u32, u32)> {
    if !scale.is_finite() || scale <= 1.0 {
        return Some((width, height));
    }
    let edge = |len: u32| {
        let out = (len as f64 * scale).round();
        (out <= MAX_EXPORT_DIMENSION as f64).then_some(out as u32)
    };
    Some((edge(width)?, edge(height)?))
}

/// Scale an image by duplicating pixels, never smoothing.
///
/// Output pixel `o` copies source pixel `floor(o / scale)`. A scale of 1
/// or less (or not a number) returns a copy. Upscaling past
/// [`MAX_EXPORT_DIMENSION`] is an `Export` error.
pub fn scale_nearest(image: &RgbaImage, scale: f64) -> Result<RgbaImage> {
    if !scale.is_finite() || scale <= 1.0 {
        return Ok(image.clone());
    }

    let (width, height) = image.dimensions();
    let Some((out_width, out_height)) = scaled_size(width, height, scale) else {
        return Err(AvatarError::Export {
            message: format!(
                "Scaling {}x{} by {} exceeds the {}px export limit",
                width, height, scale, MAX_EXPORT_DIMENSION
            ),
            help: Some("Lower the export scale or the canvas size".to_string()),
        });
    };

    Ok(RgbaImage::from_fn(out_width, out_height, |x, y| {
        let sx = ((x as f64 / scale).floor() as u32).min(width.saturating_sub(1));
        let sy = ((y as f64 / scale).floor() as u32).min(height.saturating_sub(1));
        *image.get_pixel(sx, sy)
    }))
}

/// Composite `image` over a solid colour.
pub fn flatten(image: &RgbaImage, background: Colour) -> RgbaImage {
    let base: Rgba<u8> = background.into();
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let mut flat = base;
        flat.blend(pixel);
        *pixel = flat;
    }
    out
}

/// Scale, flatten and encode a composite.
pub fn encode(image: &RgbaImage, options: &ExportOptions) -> Result<EncodedImage> {
    let mut raster = scale_nearest(image, options.scale)?;

    let background = match (options.background, options.format) {
        (Some(colour), _) => Some(colour),
        // No alpha channel: composite onto black
        (None, ImageFormat::Jpeg) => Some(Colour::BLACK),
        (None, _) => None,
    };
    if let Some(colour) = background {
        raster = flatten(&raster, colour);
    }

    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 {
        return Err(AvatarError::Export {
            message: format!("Cannot encode an empty {}x{} image", width, height),
            help: Some("Check the configuration's width, height and export scale".to_string()),
        });
    }

    let mut bytes = Vec::new();
    let result = match options.format {
        ImageFormat::Png => PngEncoder::new(Cursor::new(&mut bytes)).write_image(
            raster.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(raster).to_rgb8();
            JpegEncoder::new_with_quality(Cursor::new(&mut bytes), jpeg_quality(options.quality))
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        }
        ImageFormat::Webp => WebPEncoder::new_lossless(Cursor::new(&mut bytes)).write_image(
            raster.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
    };

    result.map_err(|e| AvatarError::Export {
        message: format!("Failed to encode {}: {}", options.format, e),
        help: None,
    })?;

    Ok(EncodedImage {
        format: options.format,
        bytes,
        width,
        height,
    })
}

/// Write encoded bytes to disk.
pub fn write_image(encoded: &EncodedImage, path: &Path) -> Result<()> {
    fs::write(path, &encoded.bytes).map_err(|e| AvatarError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write {}: {}", encoded.format, e),
    })
}

/// Map 0..=1 onto the encoder's 1..=100.
fn jpeg_quality(quality: f64) -> u8 {
    let quality = if quality.is_finite() { quality } else { DEFAULT_QUALITY };
    (quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}
