//! Static checks for avatar configurations and selections.
//!
//! Reports problems before anything is rendered. Used by
//! `avakit validate` and by `avakit render` ahead of compositing.

mod checks;
mod warning;

pub use warning::{Diagnostic, Severity, ValidationResult};

use crate::output::Printer;
use crate::types::{AvatarConfig, Selection};

/// Run all configuration checks.
pub fn validate_config(config: &AvatarConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(checks::check_duplicate_categories(config));
    result.merge(checks::check_sheets(config));
    result.merge(checks::check_relative_targets(config));
    result.merge(checks::check_cycles(config));
    result.merge(checks::check_output_settings(config));

    result
}

/// Check a selection against the configuration it will be rendered with.
pub fn validate_selection(config: &AvatarConfig, selection: &Selection) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(checks::check_selection_categories(config, selection));
    result.merge(checks::check_selection_values(config, selection));

    result
}

/// Print diagnostics to stderr.
pub fn print_diagnostics(printer: &Printer, result: &ValidationResult) {
    for d in result.iter() {
        let severity = printer.severity(&d.severity.to_string(), d.is_error());
        eprintln!("  {}[{}]: {}", severity, d.code, d.message);
        if let Some(help) = &d.help {
            eprintln!("    {}: {}", printer.dim("help"), help);
        }
    }

    let errors = result.error_count();
    let warnings = result.warning_count();

    if errors > 0 {
        eprintln!(
            "Validation failed: {} error(s), {} warning(s)",
            errors, warnings
        );
    } else if warnings > 0 {
        eprintln!("Validation passed ({} warning(s))", warnings);
    } else {
        eprintln!("Validation passed.");
    }
}
