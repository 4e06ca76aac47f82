//! Configuration loading and saving.
//!
//! Configurations are JSON documents (YAML is accepted with the same
//! schema). Serializing and re-parsing reproduces an equal value:
//! absent optional fields stay absent.

mod composition;

pub use composition::{Composition, Follow, Part, Placement};

use std::fs;
use std::path::Path;

use crate::error::{AvatarError, Result};
use crate::types::{AvatarConfig, Selection};

/// Default configuration filename written by `avakit init`.
pub const CONFIG_FILENAME: &str = "avatar.json";

/// Parse a configuration from JSON.
pub fn parse_json(content: &str) -> Result<AvatarConfig> {
    serde_json::from_str(content).map_err(|e| AvatarError::Parse {
        message: format!("Invalid configuration: {}", e),
        help: Some("Check the JSON syntax and field names (camelCase)".to_string()),
    })
}

/// Parse a configuration from YAML.
pub fn parse_yaml(content: &str) -> Result<AvatarConfig> {
    serde_yaml::from_str(content).map_err(|e| AvatarError::Parse {
        message: format!("Invalid configuration: {}", e),
        help: Some("Check the YAML syntax and field names (camelCase)".to_string()),
    })
}

/// Serialize a configuration as pretty-printed JSON.
pub fn to_json(config: &AvatarConfig) -> Result<String> {
    serde_json::to_string_pretty(config).map_err(|e| AvatarError::Parse {
        message: format!("Failed to serialize configuration: {}", e),
        help: None,
    })
}

/// Load a configuration file. `.yaml`/`.yml` are read as YAML, anything
/// else as JSON.
pub fn load(path: &Path) -> Result<AvatarConfig> {
    let content = fs::read_to_string(path).map_err(|e| AvatarError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read configuration: {}", e),
    })?;

    if is_yaml(path) {
        parse_yaml(&content)
    } else {
        parse_json(&content)
    }
}

/// Write a configuration as JSON.
pub fn save(config: &AvatarConfig, path: &Path) -> Result<()> {
    let json = to_json(config)?;
    fs::write(path, json + "\n").map_err(|e| AvatarError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write configuration: {}", e),
    })
}

/// Parse a selection document.
pub fn parse_selection(content: &str) -> Result<Selection> {
    serde_json::from_str(content).map_err(|e| AvatarError::Parse {
        message: format!("Invalid selection: {}", e),
        help: Some("A selection maps categories to null, an index, or {sheetIndex, spriteIndex}".to_string()),
    })
}

/// Load a selection file (JSON).
pub fn load_selection(path: &Path) -> Result<Selection> {
    let content = fs::read_to_string(path).map_err(|e| AvatarError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read selection: {}", e),
    })?;
    parse_selection(&content)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
