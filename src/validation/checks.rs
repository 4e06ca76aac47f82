//! Validation checks for configurations and selections.
//!
//! Each check returns a `ValidationResult`; `validate_config` and
//! `validate_selection` merge them.

use std::collections::HashSet;

use crate::config::Part;
use crate::layout::PartGraph;
use crate::render::{scaled_size, MAX_EXPORT_DIMENSION};
use crate::types::{AvatarConfig, Colour, Selection, SelectionValue, SpriteSheetDescriptor};

use super::warning::{Diagnostic, ValidationResult};

/// Categories must be unique.
pub fn check_duplicate_categories(config: &AvatarConfig) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut seen = HashSet::new();

    for part in &config.parts {
        if !seen.insert(part.category.as_str()) {
            result.push(
                Diagnostic::error(
                    "avakit::validate::duplicate-category",
                    format!("Category '{}' is declared more than once", part.category),
                )
                .with_help("Only the first declaration is rendered; rename or remove the others"),
            );
        }
    }

    result
}

/// Every part needs at least one well-formed sheet.
pub fn check_sheets(config: &AvatarConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    for part in &config.parts {
        let sheets: Vec<_> = part.all_sheets().collect();
        if sheets.is_empty() {
            result.push(
                Diagnostic::error(
                    "avakit::validate::missing-sheet",
                    format!("Part '{}' has no sprite sheet", part.category),
                )
                .with_help("Set spriteSheet or add at least one entry to spriteSheets"),
            );
            continue;
        }

        for sheet in sheets {
            check_sheet(&part.category, sheet, &mut result);
        }
    }

    result
}

fn check_sheet(category: &str, sheet: &SpriteSheetDescriptor, result: &mut ValidationResult) {
    if sheet.columns == 0 || sheet.rows == 0 {
        result.push(
            Diagnostic::error(
                "avakit::validate::empty-sheet",
                format!(
                    "Part '{}': sheet '{}' has a {}x{} grid",
                    category, sheet.url, sheet.columns, sheet.rows
                ),
            )
            .with_help("columns and rows must both be at least 1"),
        );
    }

    if sheet.sprite_width == 0 || sheet.sprite_height == 0 {
        result.push(
            Diagnostic::error(
                "avakit::validate::empty-sheet",
                format!(
                    "Part '{}': sheet '{}' has {}x{} sprites",
                    category, sheet.url, sheet.sprite_width, sheet.sprite_height
                ),
            )
            .with_help("spriteWidth and spriteHeight must be at least 1"),
        );
    }

    if sheet.columns > 0 && sheet.rows > 0 && sheet.extent().is_none() {
        result.push(
            Diagnostic::error(
                "avakit::validate::oversized-sheet",
                format!(
                    "Part '{}': sheet '{}' ({}x{} grid of {}x{} sprites) does not fit in 32-bit coordinates",
                    category, sheet.url, sheet.columns, sheet.rows, sheet.sprite_width, sheet.sprite_height
                ),
            )
            .with_help("Check spriteWidth, spriteHeight, spacing and the grid size"),
        );
    }

    if let Some(trim) = sheet.trim {
        let exceeds = |total: Option<u32>, size: u32| total.map_or(true, |t| t > size);
        if exceeds(trim.horizontal(), sheet.sprite_width) || exceeds(trim.vertical(), sheet.sprite_height) {
            result.push(
                Diagnostic::error(
                    "avakit::validate::oversized-trim",
                    format!(
                        "Part '{}': trim on sheet '{}' is larger than its {}x{} sprites",
                        category, sheet.url, sheet.sprite_width, sheet.sprite_height
                    ),
                )
                .with_help("Trim is transparent padding inside each cell"),
            );
        }
    }
}

/// `relativeTo` should name another category.
pub fn check_relative_targets(config: &AvatarConfig) -> ValidationResult {
    let mut result = ValidationResult::new();
    let categories: HashSet<&str> = config.parts.iter().map(|p| p.category.as_str()).collect();

    for part in &config.parts {
        if let Some(target) = part.relative_to() {
            if !categories.contains(target) {
                result.push(
                    Diagnostic::warning(
                        "avakit::validate::unknown-target",
                        format!(
                            "Part '{}' is positioned relative to unknown category '{}'",
                            part.category, target
                        ),
                    )
                    .with_help("The part falls back to its anchor position"),
                );
            }
        }
    }

    result
}

/// Report `relativeTo` cycles.
pub fn check_cycles(config: &AvatarConfig) -> ValidationResult {
    let mut result = ValidationResult::new();
    let graph = PartGraph::from_links(
        config
            .parts
            .iter()
            .map(|p| (p.category.as_str(), p.relative_to())),
    );

    for cycle in graph.find_cycles() {
        result.push(
            Diagnostic::warning("avakit::validate::cycle", cycle.to_string()).with_help(format!(
                "'{}' will be placed by its anchor when all of these parts are selected",
                cycle.category()
            )),
        );
    }

    result
}

/// Canvas size, pixel scale and export settings.
pub fn check_output_settings(config: &AvatarConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    if config.width == 0 || config.height == 0 {
        result.push(
            Diagnostic::error(
                "avakit::validate::canvas-size",
                format!("Canvas is {}x{}", config.width, config.height),
            )
            .with_help("width and height must both be at least 1"),
        );
    }

    if let Some(scale) = config.pixel_scale {
        if !scale.is_finite() || scale <= 0.0 {
            result.push(
                Diagnostic::error(
                    "avakit::validate::pixel-scale",
                    format!("pixelScale must be a positive number, got {}", scale),
                )
                .with_help("Use 1 for no scaling"),
            );
        }
    }

    let Some(export) = &config.export_config else {
        return result;
    };

    if let Some(quality) = export.quality {
        if !(0.0..=1.0).contains(&quality) {
            result.push(
                Diagnostic::error(
                    "avakit::validate::export-quality",
                    format!("exportConfig.quality must be between 0 and 1, got {}", quality),
                )
                .with_help("0.92 is the default"),
            );
        }
    }

    if let Some(scale) = export.scale {
        if !scale.is_finite() || scale < 1.0 {
            result.push(
                Diagnostic::error(
                    "avakit::validate::export-scale",
                    format!("exportConfig.scale must be at least 1, got {}", scale),
                )
                .with_help("Use 1 for the canvas size, 2 to double it"),
            );
        } else if scaled_size(config.width, config.height, scale).is_none() {
            result.push(
                Diagnostic::error(
                    "avakit::validate::export-size",
                    format!(
                        "Exporting {}x{} at scale {} exceeds {}px per side",
                        config.width, config.height, scale, MAX_EXPORT_DIMENSION
                    ),
                )
                .with_help("Lower exportConfig.scale"),
            );
        }
    }

    if let Some(colour) = &export.background_color {
        if Colour::parse(colour).is_err() {
            result.push(
                Diagnostic::error(
                    "avakit::validate::background",
                    format!("exportConfig.backgroundColor '{}' is not a colour", colour),
                )
                .with_help("Use a hex colour (#RRGGBB), 'transparent', or a CSS colour name"),
            );
        }
    }

    result
}

/// Selection keys should be known categories.
pub fn check_selection_categories(config: &AvatarConfig, selection: &Selection) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (category, _) in selection.iter() {
        if config.part(category).is_none() {
            result.push(Diagnostic::warning(
                "avakit::validate::unknown-category",
                format!("Selection names unknown category '{}'", category),
            ));
        }
    }

    result
}

/// Selected indexes should exist, and required parts should be selected.
pub fn check_selection_values(config: &AvatarConfig, selection: &Selection) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut seen = HashSet::new();

    for descriptor in &config.parts {
        if !descriptor.is_enabled() || !seen.insert(descriptor.category.as_str()) {
            continue;
        }
        let part = Part::from(descriptor);
        let value = selection.get(&part.category);

        match value {
            SelectionValue::None => {
                if !part.optional {
                    result.push(
                        Diagnostic::warning(
                            "avakit::validate::missing-selection",
                            format!("Required part '{}' has nothing selected", part.category),
                        )
                        .with_help("Select a sprite, or mark the part optional"),
                    );
                }
            }
            SelectionValue::Indexed { sheet_index, .. } if sheet_index >= part.sheets.len() => {
                result.push(Diagnostic::warning(
                    "avakit::validate::sheet-out-of-range",
                    format!(
                        "Part '{}' has {} sheet(s); sheet {} is selected",
                        part.category,
                        part.sheets.len(),
                        sheet_index
                    ),
                ));
            }
            _ => {
                if let Some((sheet, index)) = part.sheet_for(value) {
                    if index >= sheet.len() {
                        result.push(Diagnostic::warning(
                            "avakit::validate::sprite-out-of-range",
                            format!(
                                "Part '{}': sprite {} is selected but sheet '{}' has {}",
                                part.category,
                                index,
                                sheet.url,
                                sheet.len()
                            ),
                        ));
                    }
                }
            }
        }
    }

    result
}
