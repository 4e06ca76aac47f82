//! Sprite sheet slicing.
//!
//! Turns a grid descriptor into the ordered list of cell rectangles.
//! Pure arithmetic: no image is touched here.

use crate::error::{AvatarError, Result};
use crate::types::{ContentBounds, Sprite, SpriteSheetDescriptor, Trim};

/// Slice a sheet into its sprites, row-major.
///
/// Cell `i` sits at `col * (spriteWidth + spacingX)`,
/// `row * (spriteHeight + spacingY)` with `col = i % columns` and
/// `row = i / columns`. When the sheet declares a trim every sprite
/// carries content bounds.
pub fn slice_sheet(sheet: &SpriteSheetDescriptor) -> Result<Vec<Sprite>> {
    let grid = Grid::new(sheet)?;
    Ok((0..sheet.len()).map(|index| grid.cell(index)).collect())
}

/// Pick one sprite without slicing the whole sheet. Out-of-range
/// indexes give `None`.
pub fn sprite_at(sheet: &SpriteSheetDescriptor, index: usize) -> Result<Option<Sprite>> {
    let grid = Grid::new(sheet)?;
    Ok((index < sheet.len()).then(|| grid.cell(index)))
}

/// A checked sheet grid. Every cell origin fits in `u32`.
struct Grid {
    columns: usize,
    step_x: u32,
    step_y: u32,
    width: u32,
    height: u32,
    content: Option<ContentBounds>,
}

impl Grid {
    fn new(sheet: &SpriteSheetDescriptor) -> Result<Self> {
        if sheet.columns == 0 || sheet.rows == 0 {
            return Err(AvatarError::InvalidDescriptor {
                message: format!(
                    "Sheet '{}' has a {}x{} grid",
                    sheet.url, sheet.columns, sheet.rows
                ),
                help: Some("columns and rows must both be at least 1".to_string()),
            });
        }

        if sheet.extent().is_none() {
            return Err(AvatarError::InvalidDescriptor {
                message: format!(
                    "Sheet '{}': a {}x{} grid of {}x{} sprites is too large",
                    sheet.url, sheet.columns, sheet.rows, sheet.sprite_width, sheet.sprite_height
                ),
                help: Some("Sheet coordinates must fit in 32 bits".to_string()),
            });
        }

        let content = sheet.trim.map(|trim| content_bounds(sheet, trim)).transpose()?;

        Ok(Self {
            columns: sheet.columns as usize,
            // The extent bounds `(columns - 1) * step`, so origins cannot overflow
            step_x: sheet.sprite_width.saturating_add(sheet.spacing_x()),
            step_y: sheet.sprite_height.saturating_add(sheet.spacing_y()),
            width: sheet.sprite_width,
            height: sheet.sprite_height,
            content,
        })
    }

    fn cell(&self, index: usize) -> Sprite {
        let col = (index % self.columns) as u32;
        let row = (index / self.columns) as u32;
        Sprite {
            index,
            x: col * self.step_x,
            y: row * self.step_y,
            width: self.width,
            height: self.height,
            content: self.content,
        }
    }
}

fn content_bounds(sheet: &SpriteSheetDescriptor, trim: Trim) -> Result<ContentBounds> {
    let fits = |total: Option<u32>, size: u32| total.filter(|&t| t <= size);

    let (Some(horizontal), Some(vertical)) = (
        fits(trim.horizontal(), sheet.sprite_width),
        fits(trim.vertical(), sheet.sprite_height),
    ) else {
        return Err(AvatarError::InvalidDescriptor {
            message: format!(
                "Sheet '{}': trim (left {}, right {}, top {}, bottom {}) exceeds the {}x{} sprite",
                sheet.url,
                trim.left(),
                trim.right(),
                trim.top(),
                trim.bottom(),
                sheet.sprite_width,
                sheet.sprite_height
            ),
            help: Some("Trim is padding inside each cell and must leave a non-negative content box".to_string()),
        });
    };

    Ok(ContentBounds {
        width: sheet.sprite_width - horizontal,
        height: sheet.sprite_height - vertical,
        offset_x: trim.left(),
        offset_y: trim.top(),
    })
}
