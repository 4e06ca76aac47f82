//! Target surface for compositing.

use image::{Pixel, Rgba, RgbaImage};

use crate::types::{Colour, Sprite};

/// An RGBA surface with a uniform pixel-scale transform.
///
/// Coordinates passed to `draw_sprite` are in unscaled units; the
/// surface itself is the full device size. Drawing is nearest-neighbour
/// with no smoothing.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
    scale: f64,
}

impl Canvas {
    /// Create a transparent canvas of the given device size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            scale: 1.0,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the scale applied to subsequent draws. Non-positive or
    /// non-finite values reset it to 1.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
    }

    /// Reset every pixel to transparent and the scale to 1.
    pub fn clear(&mut self) {
        self.fill(Colour::TRANSPARENT);
        self.scale = 1.0;
    }

    /// Flood-fill the whole surface, replacing what is there.
    pub fn fill(&mut self, colour: Colour) {
        let rgba: Rgba<u8> = colour.into();
        for pixel in self.image.pixels_mut() {
            *pixel = rgba;
        }
    }

    /// Draw one sprite cell of `sheet` with its top-left corner at `(x, y)`.
    ///
    /// Each device pixel samples the sprite pixel under its centre. Pixels
    /// outside the canvas or outside the sheet are skipped.
    pub fn draw_sprite(&mut self, sheet: &RgbaImage, sprite: &Sprite, x: f64, y: f64) {
        let Some((x0, x1)) = device_span(x, sprite.width, self.scale, self.width()) else {
            return;
        };
        let Some((y0, y1)) = device_span(y, sprite.height, self.scale, self.height()) else {
            return;
        };

        for dy in y0..y1 {
            let Some(sy) = sample(dy, y, self.scale, sprite.height) else {
                continue;
            };
            let src_y = sprite.y + sy;
            if src_y >= sheet.height() {
                continue;
            }

            for dx in x0..x1 {
                let Some(sx) = sample(dx, x, self.scale, sprite.width) else {
                    continue;
                };
                let src_x = sprite.x + sx;
                if src_x >= sheet.width() {
                    continue;
                }

                let src = sheet.get_pixel(src_x, src_y);
                self.image.get_pixel_mut(dx, dy).blend(src);
            }
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Device pixel range `[start, end)` touched by a span of `len` sprite
/// pixels starting at unscaled `pos`, clipped to `limit`.
fn device_span(pos: f64, len: u32, scale: f64, limit: u32) -> Option<(u32, u32)> {
    let start = (pos * scale).floor().max(0.0);
    let end = ((pos + len as f64) * scale).ceil().min(limit as f64);
    if !start.is_finite() || !end.is_finite() || start >= end {
        return None;
    }
    Some((start as u32, end as u32))
}

/// Sprite-local pixel sampled by device pixel `d`, if it falls inside.
fn sample(d: u32, pos: f64, scale: f64, len: u32) -> Option<u32> {
    let local = ((d as f64 + 0.5) / scale - pos).floor();
    if local < 0.0 || local >= len as f64 {
        return None;
    }
    Some(local as u32)
}
