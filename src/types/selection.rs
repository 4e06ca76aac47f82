//! Per-category sprite selection.
//!
//! A selection maps each category to one of:
//! - nothing (`null`, missing, or any shape that isn't understood)
//! - a plain sprite index (`3`)
//! - an explicit sheet and sprite (`{ "sheetIndex": 1, "spriteIndex": 3 }`)

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Deserializer;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AvatarError, Result};

/// What is selected for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionValue {
    #[default]
    None,
    /// Index into the part's primary sheet.
    Single(usize),
    /// Index into a specific sheet of a multi-sheet part.
    Indexed { sheet_index: usize, sprite_index: usize },
}

impl SelectionValue {
    pub fn is_none(&self) -> bool {
        matches!(self, SelectionValue::None)
    }

    /// Interpret a JSON value. Unrecognised shapes are `None`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => n
                .as_u64()
                .map_or(SelectionValue::None, |i| SelectionValue::Single(i as usize)),
            Value::Object(map) => {
                let sheet = map.get("sheetIndex").and_then(Value::as_u64);
                let sprite = map.get("spriteIndex").and_then(Value::as_u64);
                match (sheet, sprite) {
                    (Some(sheet), Some(sprite)) => SelectionValue::Indexed {
                        sheet_index: sheet as usize,
                        sprite_index: sprite as usize,
                    },
                    _ => SelectionValue::None,
                }
            }
            _ => SelectionValue::None,
        }
    }
}

impl Serialize for SelectionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match *self {
            SelectionValue::None => serializer.serialize_none(),
            SelectionValue::Single(index) => serializer.serialize_u64(index as u64),
            SelectionValue::Indexed {
                sheet_index,
                sprite_index,
            } => {
                let mut s = serializer.serialize_struct("SelectionValue", 2)?;
                s.serialize_field("sheetIndex", &sheet_index)?;
                s.serialize_field("spriteIndex", &sprite_index)?;
                s.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for SelectionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(SelectionValue::from_json(&value))
    }
}

/// Parses the CLI form: `none`, `N`, or `SHEET:N`.
impl FromStr for SelectionValue {
    type Err = AvatarError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("null") || s.is_empty() {
            return Ok(SelectionValue::None);
        }

        let parse_index = |part: &str| {
            part.trim().parse::<usize>().map_err(|_| AvatarError::Parse {
                message: format!("Invalid selection '{}'", s),
                help: Some("Use 'none', a sprite index (3), or sheet:sprite (1:3)".to_string()),
            })
        };

        match s.split_once(':') {
            Some((sheet, sprite)) => Ok(SelectionValue::Indexed {
                sheet_index: parse_index(sheet)?,
                sprite_index: parse_index(sprite)?,
            }),
            None => Ok(SelectionValue::Single(parse_index(s)?)),
        }
    }
}

impl fmt::Display for SelectionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionValue::None => write!(f, "none"),
            SelectionValue::Single(index) => write!(f, "{}", index),
            SelectionValue::Indexed {
                sheet_index,
                sprite_index,
            } => write!(f, "{}:{}", sheet_index, sprite_index),
        }
    }
}

/// Selected sprite per category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<String, SelectionValue>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, category: impl Into<String>, value: SelectionValue) -> Self {
        self.set(category, value);
        self
    }

    pub fn set(&mut self, category: impl Into<String>, value: SelectionValue) {
        self.0.insert(category.into(), value);
    }

    /// The value for `category`; missing categories read as `None`.
    pub fn get(&self, category: &str) -> SelectionValue {
        self.0.get(category).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SelectionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a `category=value` assignment as accepted by the CLI.
    pub fn parse_assignment(s: &str) -> Result<(String, SelectionValue)> {
        let (category, value) = s.split_once('=').ok_or_else(|| AvatarError::Parse {
            message: format!("Invalid selection '{}'", s),
            help: Some("Use category=value, e.g. head=2 or hair=1:4".to_string()),
        })?;
        Ok((category.trim().to_string(), value.parse()?))
    }
}
