//! Cosmetic style attributes shared by the renderers.
//!
//! Styling is best-effort: a color or level that cannot be interpreted is
//! logged and dropped, and the containing paragraph is rendered unstyled.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Color used for note callouts in every format.
pub const NOTE_COLOR: &str = "red";

/// Highest paragraph indentation level an OOXML text body accepts.
pub const MAX_PARAGRAPH_LEVEL: u32 = 8;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uppercase six-digit hex, as OOXML `val` attributes expect.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Components scaled to 0.0..=1.0, as PDF color operators expect.
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }

    fn from_hex_digits(hex: &str) -> Option<Self> {
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };
        let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    fn from_rgb_function(value: &str) -> Option<Self> {
        let inner = value.strip_prefix("rgb(")?.strip_suffix(')')?;
        let channels: Vec<u8> = inner
            .split(',')
            .map(|c| c.trim().parse::<u8>().ok())
            .collect::<Option<_>>()?;
        match channels.as_slice() {
            [r, g, b] => Some(Self::new(*r, *g, *b)),
            _ => None,
        }
    }
}

impl FromStr for Rgb {
    type Err = Error;

    /// Parse a CSS-style color: a few names, `#rgb`, `#rrggbb`, bare hex, or `rgb(r, g, b)`.
    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_ascii_lowercase();
        let parsed = match value.as_str() {
            "red" => Some(Self::RED),
            "black" => Some(Self::BLACK),
            v if v.starts_with("rgb(") => Self::from_rgb_function(&v.replace(' ', "")),
            v => Self::from_hex_digits(v.strip_prefix('#').unwrap_or(v)),
        };
        parsed.ok_or_else(|| Error::StyleError(format!("unrecognized color '{}'", s)))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Whether an inline CSS `style` attribute declares a red text color.
pub fn declares_red_color(style: &str) -> bool {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(prop, _)| prop.trim().eq_ignore_ascii_case("color"))
        .any(|(_, value)| {
            let value = value.trim().trim_end_matches("!important").trim();
            value.parse::<Rgb>().map(|c| c == Rgb::RED).unwrap_or(false)
        })
}

/// Clamp a list nesting level to the range OOXML paragraphs accept.
pub fn paragraph_level(level: u32) -> Result<u8> {
    let clamped = level.min(MAX_PARAGRAPH_LEVEL);
    u8::try_from(clamped).map_err(|_| Error::StyleError(format!("paragraph level {}", level)))
}

/// Resolve an optional style attribute, logging and dropping it on failure.
pub fn apply_style<T>(attribute: &str, value: Result<T>) -> Option<T> {
    match value {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("Skipping {} styling: {}", attribute, e);
            None
        }
    }
}

/// The note callout color, or `None` if it cannot be resolved.
pub fn note_color() -> Option<Rgb> {
    apply_style("color", NOTE_COLOR.parse::<Rgb>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colors() {
        assert_eq!("red".parse::<Rgb>().unwrap(), Rgb::RED);
        assert_eq!("#f00".parse::<Rgb>().unwrap(), Rgb::RED);
        assert_eq!("#FF0000".parse::<Rgb>().unwrap(), Rgb::RED);
        assert_eq!("rgb(255, 0, 0)".parse::<Rgb>().unwrap(), Rgb::RED);
        assert_eq!("#336699".parse::<Rgb>().unwrap(), Rgb::new(0x33, 0x66, 0x99));
        assert!("reddish".parse::<Rgb>().is_err());
        assert!("#12".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Rgb::RED.to_hex(), "FF0000");
        assert_eq!(Rgb::new(1, 2, 3).to_hex(), "010203");
    }

    #[test]
    fn test_declares_red_color() {
        assert!(declares_red_color("color:red"));
        assert!(declares_red_color("font-weight: bold; color: RED;"));
        assert!(declares_red_color("color: #ff0000 !important"));
        assert!(!declares_red_color("background-color: red"));
        assert!(!declares_red_color("color: blue"));
        assert!(!declares_red_color(""));
    }

    #[test]
    fn test_paragraph_level_clamps() {
        assert_eq!(paragraph_level(0).unwrap(), 0);
        assert_eq!(paragraph_level(3).unwrap(), 3);
        assert_eq!(paragraph_level(42).unwrap(), 8);
    }

    #[test]
    fn test_apply_style_drops_failures() {
        assert_eq!(apply_style("color", "red".parse::<Rgb>()), Some(Rgb::RED));
        assert_eq!(apply_style("color", "nope".parse::<Rgb>()), None);
        assert_eq!(note_color(), Some(Rgb::RED));
    }
}
