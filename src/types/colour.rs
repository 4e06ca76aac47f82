//! Colour type and parsing.
//!
//! Background colours arrive as CSS-style strings in the export
//! configuration. Hex forms are parsed here; named colours go through
//! `palette`'s SVG/CSS colour table.

use std::fmt;
use std::str::FromStr;

use image::Rgba;

use crate::error::{AvatarError, Result};

/// An RGBA colour value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    /// Create a new colour from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a new opaque colour from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Fully transparent colour.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Parse a CSS-style colour.
    ///
    /// Accepts `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`, `transparent`,
    /// and CSS colour names such as `white` or `cornflowerblue`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with('#') {
            return Self::from_hex(s);
        }

        let lower = s.to_ascii_lowercase();
        if lower == "transparent" {
            return Ok(Self::TRANSPARENT);
        }

        if let Some(named) = palette::named::from_str(&lower) {
            return Ok(Self::rgb(named.red, named.green, named.blue));
        }

        // Bare hex without '#'
        Self::from_hex(s).map_err(|_| AvatarError::Parse {
            message: format!("Unknown colour: {}", s),
            help: Some("Use a hex colour (#RRGGBB), 'transparent', or a CSS colour name".to_string()),
        })
    }

    /// Parse a hex colour string.
    ///
    /// Supports formats:
    /// - `#RGB` (3 digits, expanded to 6)
    /// - `#RGBA` (4 digits, expanded to 8)
    /// - `#RRGGBB` (6 digits)
    /// - `#RRGGBBAA` (8 digits)
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let hex = s.strip_prefix('#').unwrap_or(s);

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid_hex(s));
        }

        let nibble = |i: usize| parse_hex_digit(&hex[i..i + 1]).map(|d| d << 4 | d);
        let byte = |i: usize| parse_hex_byte(&hex[i * 2..i * 2 + 2]);

        match hex.len() {
            3 => Ok(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Ok(Self::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Ok(Self::rgb(byte(0)?, byte(1)?, byte(2)?)),
            8 => Ok(Self::new(byte(0)?, byte(1)?, byte(2)?, byte(3)?)),
            _ => Err(invalid_hex(s)),
        }
    }

    /// Convert to RGBA array.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Colour> for Rgba<u8> {
    fn from(colour: Colour) -> Self {
        Rgba(colour.to_rgba())
    }
}

impl FromStr for Colour {
    type Err = AvatarError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

fn invalid_hex(s: &str) -> AvatarError {
    AvatarError::Parse {
        message: format!("Invalid hex colour: {}", s),
        help: Some("Use #RGB, #RGBA, #RRGGBB, or #RRGGBBAA format".to_string()),
    }
}

fn parse_hex_digit(s: &str) -> Result<u8> {
    u8::from_str_radix(s, 16).map_err(|_| AvatarError::Parse {
        message: format!("Invalid hex digit: {}", s),
        help: None,
    })
}

fn parse_hex_byte(s: &str) -> Result<u8> {
    u8::from_str_radix(s, 16).map_err(|_| AvatarError::Parse {
        message: format!("Invalid hex byte: {}", s),
        help: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_6digit() {
        let c = Colour::from_hex("#FF0000").unwrap();
        assert_eq!(c, Colour::rgb(255, 0, 0));

        let c = Colour::from_hex("#1a1a2e").unwrap();
        assert_eq!(c, Colour::rgb(0x1a, 0x1a, 0x2e));
    }

    #[test]
    fn test_from_hex_3digit() {
        let c = Colour::from_hex("#ABC").unwrap();
        assert_eq!(c, Colour::rgb(0xAA, 0xBB, 0xCC));
    }

    #[test]
    fn test_from_hex_8digit() {
        let c = Colour::from_hex("#FF000080").unwrap();
        assert_eq!(c, Colour::new(255, 0, 0, 128));
    }

    #[test]
    fn test_from_hex_4digit() {
        let c = Colour::from_hex("#F008").unwrap();
        assert_eq!(c, Colour::new(255, 0, 0, 0x88));
    }

    #[test]
    fn test_from_hex_invalid() {
        assert!(Colour::from_hex("#GGG").is_err());
        assert!(Colour::from_hex("#12345").is_err());
        assert!(Colour::from_hex("").is_err());
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Colour::parse("white").unwrap(), Colour::WHITE);
        assert_eq!(Colour::parse("Black").unwrap(), Colour::BLACK);
        assert_eq!(Colour::parse("transparent").unwrap(), Colour::TRANSPARENT);
    }

    #[test]
    fn test_parse_hex_without_hash() {
        assert_eq!(Colour::parse("00ff00").unwrap(), Colour::rgb(0, 255, 0));
    }

    #[test]
    fn test_parse_unknown() {
        assert!(Colour::parse("not-a-colour").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Colour::rgb(255, 0, 0)), "#FF0000");
        assert_eq!(format!("{}", Colour::new(255, 0, 0, 128)), "#FF000080");
    }

    #[test]
    fn test_into_rgba() {
        let px: Rgba<u8> = Colour::new(1, 2, 3, 4).into();
        assert_eq!(px.0, [1, 2, 3, 4]);
    }
}
