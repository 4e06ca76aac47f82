//! Sprite sheet descriptors and the sprites sliced out of them.
//!
//! A sheet is a regular grid of same-sized cells. Spacing is the gap
//! *between* cells, never padding around the outside of the grid.
//!
//! # Example
//!
//! ```json
//! {
//!   "url": "heads.png",
//!   "spriteWidth": 32,
//!   "spriteHeight": 32,
//!   "columns": 4,
//!   "rows": 2,
//!   "spacingX": 1,
//!   "trim": { "bottom": 6 }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Transparent padding inside every cell of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<u32>,
}

impl Trim {
    pub fn top(&self) -> u32 {
        self.top.unwrap_or(0)
    }

    pub fn bottom(&self) -> u32 {
        self.bottom.unwrap_or(0)
    }

    pub fn left(&self) -> u32 {
        self.left.unwrap_or(0)
    }

    pub fn right(&self) -> u32 {
        self.right.unwrap_or(0)
    }

    /// `left + right`, or `None` if the sum overflows.
    pub fn horizontal(&self) -> Option<u32> {
        self.left().checked_add(self.right())
    }

    /// `top + bottom`, or `None` if the sum overflows.
    pub fn vertical(&self) -> Option<u32> {
        self.top().checked_add(self.bottom())
    }
}

/// Grid layout of a single sprite sheet image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteSheetDescriptor {
    /// URL or path of the backing image.
    pub url: String,
    pub sprite_width: u32,
    pub sprite_height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing_x: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing_y: Option<u32>,
    pub columns: u32,
    pub rows: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<Trim>,
}

impl SpriteSheetDescriptor {
    /// Create a descriptor with no spacing and no trim.
    pub fn new(url: impl Into<String>, sprite_width: u32, sprite_height: u32, columns: u32, rows: u32) -> Self {
        Self {
            url: url.into(),
            sprite_width,
            sprite_height,
            spacing_x: None,
            spacing_y: None,
            columns,
            rows,
            trim: None,
        }
    }

    /// Set the gap between cells.
    pub fn with_spacing(mut self, x: u32, y: u32) -> Self {
        self.spacing_x = Some(x);
        self.spacing_y = Some(y);
        self
    }

    /// Set the per-cell content trim.
    pub fn with_trim(mut self, trim: Trim) -> Self {
        self.trim = Some(trim);
        self
    }

    pub fn spacing_x(&self) -> u32 {
        self.spacing_x.unwrap_or(0)
    }

    pub fn spacing_y(&self) -> u32 {
        self.spacing_y.unwrap_or(0)
    }

    /// Number of cells in the grid.
    pub fn len(&self) -> usize {
        (self.columns as usize).saturating_mul(self.rows as usize)
    }

    /// Pixel size of the whole grid, spacing included.
    ///
    /// `None` when the grid is empty or does not fit in `u32` coordinates.
    pub fn extent(&self) -> Option<(u32, u32)> {
        let span = |count: u32, size: u32, spacing: u32| {
            let gaps = count.checked_sub(1)?.checked_mul(spacing)?;
            count.checked_mul(size)?.checked_add(gaps)
        };
        Some((
            span(self.columns, self.sprite_width, self.spacing_x())?,
            span(self.rows, self.sprite_height, self.spacing_y())?,
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Visible area inside a sprite cell, relative to the cell's top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentBounds {
    #[serde(rename = "contentWidth")]
    pub width: u32,
    #[serde(rename = "contentHeight")]
    pub height: u32,
    #[serde(rename = "contentOffsetX")]
    pub offset_x: u32,
    #[serde(rename = "contentOffsetY")]
    pub offset_y: u32,
}

/// One cell of a sliced sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sprite {
    /// Row-major index: `row * columns + col`.
    pub index: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Present only when the sheet declares a trim.
    #[serde(flatten)]
    pub content: Option<ContentBounds>,
}

impl Sprite {
    /// Create an untrimmed sprite.
    pub fn new(index: usize, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            index,
            x,
            y,
            width,
            height,
            content: None,
        }
    }

    /// The visible box used for relative alignment.
    ///
    /// Falls back to the full cell when the sheet has no trim.
    pub fn content_bounds(&self) -> ContentBounds {
        self.content.unwrap_or(ContentBounds {
            width: self.width,
            height: self.height,
            offset_x: 0,
            offset_y: 0,
        })
    }
}
