//! Init command implementation.
//!
//! Scans a directory for PNG sprite sheets and writes a starter
//! `avatar.json` with one part per sheet.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::Args;
use walkdir::WalkDir;

use crate::config::{self, CONFIG_FILENAME};
use crate::error::{AvatarError, Result};
use crate::output::{display_path, plural, Printer};
use crate::types::{AvatarConfig, PartDescriptor, SpriteSheetDescriptor};

/// Generate a starter avatar.json from the PNG sheets in a directory
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to scan (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Cell size as WxH (e.g. 95x95); each sheet is one sprite without it
    #[arg(long)]
    pub cell: Option<String>,

    /// Overwrite an existing avatar.json
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<AvatarConfig> {
    let config_path = args.path.join(CONFIG_FILENAME);

    if config_path.exists() && !args.force {
        return Err(AvatarError::Validation {
            message: format!("{} already exists", display_path(&config_path)),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    let cell = args.cell.as_deref().map(parse_dimensions).transpose()?;

    printer.status("Scanning", &display_path(&args.path));
    let sheets = find_sheets(&args.path);

    let mut categories = BTreeSet::new();
    let mut parts = Vec::with_capacity(sheets.len());
    let (mut width, mut height) = (0, 0);

    for path in &sheets {
        let (image_w, image_h) = image::image_dimensions(path).map_err(|e| AvatarError::LoadFailure {
            url: display_path(path),
            message: e.to_string(),
        })?;

        let (sprite_w, sprite_h) = cell.unwrap_or((image_w, image_h));
        let columns = (image_w / sprite_w).max(1);
        let rows = (image_h / sprite_h).max(1);

        let category = unique_category(&mut categories, path);
        let url = sheet_url(&args.path, path);
        let sheet = SpriteSheetDescriptor::new(url, sprite_w, sprite_h, columns, rows);
        parts.push(PartDescriptor::new(category, sheet).z_index(parts.len() as i32));

        width = width.max(sprite_w);
        height = height.max(sprite_h);
    }

    let config = AvatarConfig::new(width.max(1), height.max(1), parts);
    config::save(&config, &config_path)?;

    printer.status(
        "Created",
        &format!(
            "{} ({} found)",
            display_path(&config_path),
            plural(sheets.len(), "sheet", "sheets")
        ),
    );

    Ok(config)
}

/// PNG files under `root`, sorted, skipping previous render output.
fn find_sheets(root: &Path) -> Vec<PathBuf> {
    let mut sheets: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            let is_png = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("png"));
            let is_output = path.file_stem().and_then(|s| s.to_str()) == Some("avatar");
            is_png && !is_output
        })
        .collect();
    sheets.sort();
    sheets
}

/// File stem as a category, suffixed when already taken.
fn unique_category(taken: &mut BTreeSet<String>, path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("part")
        .to_string();

    let mut category = stem.clone();
    let mut n = 2;
    while taken.contains(&category) {
        category = format!("{}-{}", stem, n);
        n += 1;
    }
    taken.insert(category.clone());
    category
}

/// Sheet URL relative to the config directory, with `/` separators.
fn sheet_url(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse a "WxH" dimension string into (width, height).
fn parse_dimensions(s: &str) -> Result<(u32, u32)> {
    let parts: Vec<&str> = s.splitn(2, |c| c == 'x' || c == 'X').collect();
    if parts.len() != 2 {
        return Err(AvatarError::Parse {
            message: format!("Invalid cell size '{}': expected WxH (e.g. 95x95)", s),
            help: Some("Use the format WxH, for example: 95x95, 32x48".to_string()),
        });
    }

    let parse = |value: &str, what: &str| {
        value.trim().parse::<u32>().map_err(|_| AvatarError::Parse {
            message: format!("Invalid {} '{}' in cell size '{}'", what, value, s),
            help: Some(format!("{} must be a positive integer", what)),
        })
    };
    let (w, h) = (parse(parts[0], "width")?, parse(parts[1], "height")?);

    if w == 0 || h == 0 {
        return Err(AvatarError::Parse {
            message: format!("Cell size must be non-zero, got {}x{}", w, h),
            help: Some("Both width and height must be at least 1".to_string()),
        });
    }

    Ok((w, h))
}
