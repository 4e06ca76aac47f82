pub mod completions;
pub mod init;
pub mod render;
pub mod slice;
pub mod validate;

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::config;
use crate::error::Result;
use crate::types::{AvatarConfig, Selection, SelectionValue};

/// avakit - Layered avatar compositor
#[derive(Parser, Debug)]
#[command(name = "avakit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render an avatar from a configuration and a selection
    Render(render::RenderArgs),

    /// Check a configuration (and optionally a selection) without rendering
    Validate(validate::ValidateArgs),

    /// Print the sprite table of a part's sheet
    Slice(slice::SliceArgs),

    /// Generate a starter avatar.json from the PNG sheets in a directory
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Build a selection from an optional selection file and `k=v` overrides.
///
/// With neither, every enabled required part selects its first sprite.
pub fn selection_from_args(
    config: &AvatarConfig,
    file: Option<&Path>,
    assignments: &[String],
) -> Result<Selection> {
    let mut selection = match file {
        Some(path) => config::load_selection(path)?,
        None if assignments.is_empty() => default_selection(config),
        None => Selection::new(),
    };

    for assignment in assignments {
        let (category, value) = Selection::parse_assignment(assignment)?;
        selection.set(category, value);
    }

    Ok(selection)
}

/// Sprite 0 for every enabled, non-optional part.
pub fn default_selection(config: &AvatarConfig) -> Selection {
    let mut selection = Selection::new();
    for part in &config.parts {
        if part.is_enabled() && !part.is_optional() {
            selection.set(part.category.clone(), SelectionValue::Single(0));
        }
    }
    selection
}
