//! Slice command implementation.
//!
//! Prints the sprite table of one of a part's sheets as JSON and can
//! extract every cell as its own PNG.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use image::RgbaImage;

use crate::assets::{FileLoader, ImageLoader};
use crate::config;
use crate::error::{AvatarError, Result};
use crate::output::{display_path, plural, Printer};
use crate::render::slice_sheet;
use crate::types::{Sprite, SpriteSheetDescriptor};

/// Print the sprites of a part's sheet
#[derive(Args, Debug)]
pub struct SliceArgs {
    /// Configuration file (JSON or YAML)
    #[arg(required = true)]
    pub config: PathBuf,

    /// Part category
    #[arg(required = true)]
    pub category: String,

    /// Sheet index for multi-sheet parts
    #[arg(long, default_value = "0")]
    pub sheet: usize,

    /// Write each non-empty cell as a PNG into this directory
    #[arg(long)]
    pub extract: Option<PathBuf>,
}

pub fn run(args: SliceArgs, printer: &Printer) -> Result<Vec<Sprite>> {
    let config = config::load(&args.config)?;

    let part = config.part(&args.category).ok_or_else(|| AvatarError::Validation {
        message: format!("No part with category '{}'", args.category),
        help: Some(format!(
            "Known categories: {}",
            config
                .parts
                .iter()
                .map(|p| p.category.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )),
    })?;

    let sheets = part.sheets();
    let sheet = sheets.get(args.sheet).copied().ok_or_else(|| AvatarError::Validation {
        message: format!(
            "Part '{}' has {}; sheet {} does not exist",
            args.category,
            plural(sheets.len(), "sheet", "sheets"),
            args.sheet
        ),
        help: None,
    })?;

    let sprites = slice_sheet(sheet)?;
    printer.status(
        "Slicing",
        &format!(
            "{} ({}x{} grid, {})",
            sheet.url,
            sheet.columns,
            sheet.rows,
            plural(sprites.len(), "sprite", "sprites")
        ),
    );

    let json = serde_json::to_string_pretty(&sprites).map_err(|e| AvatarError::Parse {
        message: format!("Failed to serialize sprites: {}", e),
        help: None,
    })?;
    println!("{}", json);

    if let Some(dir) = &args.extract {
        let base = args
            .config
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();
        let image = FileLoader::new(base).load(&sheet.url)?;
        let written = extract_cells(&image, sheet, &sprites, dir, &format!("{}-{}", args.category, args.sheet))?;
        printer.info(
            "Extracted",
            &format!("{} to {}", plural(written, "cell", "cells"), display_path(dir)),
        );
    }

    Ok(sprites)
}

/// Returns true if every pixel in the image has alpha == 0.
fn is_fully_transparent(img: &RgbaImage) -> bool {
    img.pixels().all(|p| p[3] == 0)
}

/// Write each non-empty sprite cell as `<prefix>-<index>.png`.
///
/// Cells are clipped to the image; empty cells are skipped.
fn extract_cells(
    image: &RgbaImage,
    sheet: &SpriteSheetDescriptor,
    sprites: &[Sprite],
    dir: &std::path::Path,
    prefix: &str,
) -> Result<usize> {
    fs::create_dir_all(dir).map_err(|e| AvatarError::Io {
        path: dir.to_path_buf(),
        message: format!("Failed to create output directory: {}", e),
    })?;

    let mut written = 0;
    for sprite in sprites {
        if sprite.x >= image.width() || sprite.y >= image.height() {
            continue;
        }
        let w = sprite.width.min(image.width() - sprite.x);
        let h = sprite.height.min(image.height() - sprite.y);
        let cell = image::imageops::crop_imm(image, sprite.x, sprite.y, w, h).to_image();
        if is_fully_transparent(&cell) {
            continue;
        }

        let path = dir.join(format!("{}-{}.png", prefix, sprite.index));
        cell.save(&path).map_err(|e| AvatarError::Io {
            path: path.clone(),
            message: format!("Failed to write cell from '{}': {}", sheet.url, e),
        })?;
        written += 1;
    }

    Ok(written)
}
