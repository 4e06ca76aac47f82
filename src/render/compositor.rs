//! Compositing pass.
//!
//! Picks the active sprite for each enabled part, resolves positions in
//! unscaled canvas units and draws the sprites in z-order onto a
//! caller-supplied canvas.

use serde::Serialize;

use crate::assets::ImageCache;
use crate::config::{Composition, Part};
use crate::error::{AvatarError, Result};
use crate::layout::{PositionResolver, SpriteMap};
use crate::types::{AvatarConfig, Selection, Sprite};
use crate::validation::Diagnostic;

use super::canvas::Canvas;
use super::slice::sprite_at;

/// One sprite drawn during a render, in draw order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawCall {
    pub category: String,
    pub url: String,
    pub sprite: Sprite,
    pub x: f64,
    pub y: f64,
}

/// What a render did.
#[derive(Debug, Clone, Default)]
pub struct RenderOutcome {
    pub draws: Vec<DrawCall>,
    pub warnings: Vec<Diagnostic>,
}

/// A part paired with the sprite selected for it.
#[derive(Debug, Clone)]
struct Active<'a> {
    part: &'a Part,
    url: &'a str,
    sprite: Sprite,
}

/// Renders one composition.
#[derive(Debug, Clone, Copy)]
pub struct Compositor<'a> {
    composition: &'a Composition,
}

impl<'a> Compositor<'a> {
    pub fn new(composition: &'a Composition) -> Self {
        Self { composition }
    }

    /// A transparent canvas of the composition's full (scaled) size.
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.composition.width, self.composition.height)
    }

    /// Sheet URLs needed to render `selection`, in first-use order.
    ///
    /// Disabled parts and parts with nothing (or an out-of-range sprite)
    /// selected need nothing.
    pub fn required_urls(&self, selection: &Selection) -> Result<Vec<String>> {
        let mut urls: Vec<String> = Vec::new();
        for active in self.select(selection)? {
            if !urls.iter().any(|u| u == active.url) {
                urls.push(active.url.to_string());
            }
        }
        Ok(urls)
    }

    /// Draw `selection` onto `canvas`.
    ///
    /// Every required image must already be in `images`; otherwise this
    /// fails with `LoadFailure` before the canvas is touched.
    pub fn render(
        &self,
        selection: &Selection,
        images: &ImageCache,
        canvas: &mut Canvas,
    ) -> Result<RenderOutcome> {
        let active = self.select(selection)?;

        if let Some(missing) = active.iter().find(|a| !images.contains(a.url)) {
            return Err(AvatarError::LoadFailure {
                url: missing.url.to_string(),
                message: "image has not been loaded".to_string(),
            });
        }

        let sprites: SpriteMap = active
            .iter()
            .map(|a| (a.part.category.clone(), a.sprite))
            .collect();

        let (width, height) = self.composition.logical_size();
        let resolution = PositionResolver::new(width, height).resolve(&self.composition.parts, &sprites);

        canvas.clear();
        if let Some(background) = self.composition.background {
            canvas.fill(background);
        }
        canvas.set_scale(self.composition.pixel_scale);

        let mut draws = Vec::with_capacity(active.len());
        for part in self.composition.draw_order() {
            let Some(entry) = active.iter().find(|a| std::ptr::eq(a.part, part)) else {
                continue;
            };
            let (Some(position), Some(image)) = (
                resolution.positions.get(&part.category),
                images.get(entry.url),
            ) else {
                continue;
            };

            canvas.draw_sprite(image, &entry.sprite, position.x, position.y);
            draws.push(DrawCall {
                category: part.category.clone(),
                url: entry.url.to_string(),
                sprite: entry.sprite,
                x: position.x,
                y: position.y,
            });
        }

        Ok(RenderOutcome {
            draws,
            warnings: resolution.warnings,
        })
    }

    /// Active sprite per enabled part, in declaration order.
    ///
    /// A repeated category only counts once, the first declaration wins.
    fn select(&self, selection: &Selection) -> Result<Vec<Active<'a>>> {
        let mut active: Vec<Active<'a>> = Vec::new();

        for part in self.composition.parts.iter().filter(|p| p.enabled) {
            if active.iter().any(|a| a.part.category == part.category) {
                continue;
            }
            let Some((sheet, index)) = part.sheet_for(selection.get(&part.category)) else {
                continue;
            };
            if let Some(sprite) = sprite_at(sheet, index)? {
                active.push(Active {
                    part,
                    url: &sheet.url,
                    sprite,
                });
            }
        }

        Ok(active)
    }
}

/// Apply defaults to `config` and render `selection` onto `canvas`.
pub fn render(
    config: &AvatarConfig,
    selection: &Selection,
    images: &ImageCache,
    canvas: &mut Canvas,
) -> Result<RenderOutcome> {
    let composition = Composition::from_config(config)?;
    Compositor::new(&composition).render(selection, images, canvas)
}

/// Sheet URLs `render` will need for `selection`.
pub fn required_urls(config: &AvatarConfig, selection: &Selection) -> Result<Vec<String>> {
    let composition = Composition::from_config(config)?;
    Compositor::new(&composition).required_urls(selection)
}
