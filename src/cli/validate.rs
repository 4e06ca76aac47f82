use std::path::PathBuf;

use clap::Args;

use crate::config;
use crate::error::{AvatarError, Result};
use crate::output::{display_path, plural, Printer};
use crate::validation::{print_diagnostics, validate_config, validate_selection, ValidationResult};

/// Validate a configuration without rendering
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration file (JSON or YAML)
    #[arg(required = true)]
    pub config: PathBuf,

    /// Selection file to check against the configuration
    #[arg(long, short)]
    pub selection: Option<PathBuf>,
}

pub fn run(args: ValidateArgs, printer: &Printer) -> Result<ValidationResult> {
    printer.status("Validating", &display_path(&args.config));

    let config = config::load(&args.config)?;
    let mut result = validate_config(&config);

    if let Some(path) = &args.selection {
        let selection = config::load_selection(path)?;
        result.merge(validate_selection(&config, &selection));
    }

    print_diagnostics(printer, &result);

    if result.has_errors() {
        return Err(AvatarError::Validation {
            message: format!(
                "{} in {}",
                plural(result.error_count(), "error", "errors"),
                display_path(&args.config)
            ),
            help: None,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AutoPosition, AvatarConfig, Direction, PartDescriptor, SpriteSheetDescriptor};
    use std::fs;
    use tempfile::tempdir;

    fn write_config(dir: &std::path::Path, parts: Vec<PartDescriptor>) -> PathBuf {
        let path = dir.join("avatar.json");
        config::save(&AvatarConfig::new(64, 64, parts), &path).unwrap();
        path
    }

    #[test]
    fn test_validate_passes_with_warnings() {
        let dir = tempdir().unwrap();
        let sheet = SpriteSheetDescriptor::new("s.png", 8, 8, 1, 1);
        let config = write_config(
            dir.path(),
            vec![PartDescriptor::new("body", sheet)
                .auto_position(AutoPosition::new("head", Direction::Below, 0.0))],
        );

        let result = run(
            ValidateArgs {
                config,
                selection: None,
            },
            &Printer::new(),
        )
        .unwrap();
        assert_eq!(result.warning_count(), 1);
    }

    #[test]
    fn test_validate_fails_on_errors() {
        let dir = tempdir().unwrap();
        let sheet = SpriteSheetDescriptor::new("s.png", 8, 8, 0, 1);
        let config = write_config(dir.path(), vec![PartDescriptor::new("head", sheet)]);

        let result = run(
            ValidateArgs {
                config,
                selection: None,
            },
            &Printer::new(),
        );
        assert!(matches!(result, Err(AvatarError::Validation { .. })));
    }

    #[test]
    fn test_validate_with_selection() {
        let dir = tempdir().unwrap();
        let sheet = SpriteSheetDescriptor::new("s.png", 8, 8, 2, 1);
        let config = write_config(dir.path(), vec![PartDescriptor::new("head", sheet)]);
        let selection = dir.path().join("selection.json");
        fs::write(&selection, r#"{"head": 5, "tail": 0}"#).unwrap();

        let result = run(
            ValidateArgs {
                config,
                selection: Some(selection),
            },
            &Printer::new(),
        )
        .unwrap();
        assert_eq!(result.warning_count(), 2);
    }
}
