//! Subtitle color parsing and normalization.
//!
//! Colors arrive as `#RRGGBB` hex or as `rgb(...)`/`rgba(...)` strings whose
//! channels are 0–255 numbers or percentages. Everything normalizes to
//! [`Color`], which renders either as `#RRGGBB` or in the ASS native
//! `&HAABBGGRR&` encoding (alpha inverted: `00` is opaque).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// ASS encoding of the fallback color (opaque white).
pub const FALLBACK_ASS_COLOR: &str = "&H00FFFFFF&";

/// An 8-bit RGBA color. `a = 255` is fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);

    /// Opaque color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Strictly parse a color string.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();

        if let Some(body) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            let body = body
                .strip_suffix(')')
                .ok_or_else(|| ColorError::malformed(input, "missing closing parenthesis"))?;
            return parse_channel_list(input, body);
        }

        parse_hex(input, trimmed)
    }

    /// Parse a color, degrading to opaque white on malformed input.
    ///
    /// The degradation is logged at `warn` so bad configuration is visible.
    pub fn parse_lossy(input: &str) -> Self {
        match Self::parse(input) {
            Ok(color) => color,
            Err(e) => {
                tracing::warn!(input = %input, error = %e, "Invalid color, using opaque white");
                Self::WHITE
            }
        }
    }

    /// `#RRGGBB` form (alpha omitted).
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// ASS native form `&HAABBGGRR&`.
    pub fn to_ass(&self) -> String {
        format!(
            "&H{:02X}{:02X}{:02X}{:02X}&",
            255 - self.a,
            self.b,
            self.g,
            self.r
        )
    }
}

/// Convert any supported color string straight to the ASS encoding,
/// falling back to [`FALLBACK_ASS_COLOR`].
pub fn to_ass_color(input: &str) -> String {
    Color::parse_lossy(input).to_ass()
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<String> for Color {
    fn from(value: String) -> Self {
        Self::parse_lossy(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        if color.a == 255 {
            color.to_hex()
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                color.r,
                color.g,
                color.b,
                color.a as f64 / 255.0
            )
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from(*self))
    }
}

/// Color parse failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed color {input:?}: {reason}")]
pub struct ColorError {
    pub input: String,
    pub reason: String,
}

impl ColorError {
    fn malformed(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

fn parse_hex(input: &str, trimmed: &str) -> Result<Color, ColorError> {
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if digits.len() != 6 {
        return Err(ColorError::malformed(input, "expected 6 hex digits"));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorError::malformed(input, "non-hex digit"));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|e| ColorError::malformed(input, e.to_string()))
    };
    Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn parse_channel_list(input: &str, body: &str) -> Result<Color, ColorError> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(ColorError::malformed(input, "expected 3 or 4 channels"));
    }

    let r = color_channel(input, parts[0])?;
    let g = color_channel(input, parts[1])?;
    let b = color_channel(input, parts[2])?;
    let a = match parts.get(3) {
        Some(alpha) => alpha_channel(input, alpha)?,
        None => 255,
    };
    Ok(Color::rgba(r, g, b, a))
}

/// A 0–255 channel, either numeric or a percentage of 255.
fn color_channel(input: &str, raw: &str) -> Result<u8, ColorError> {
    let value = match raw.strip_suffix('%') {
        Some(pct) => parse_finite(input, pct)? * 255.0 / 100.0,
        None => parse_finite(input, raw)?,
    };
    Ok(clamp_to_u8(value))
}

/// Alpha as a 0–1 fraction or a percentage.
fn alpha_channel(input: &str, raw: &str) -> Result<u8, ColorError> {
    let fraction = match raw.strip_suffix('%') {
        Some(pct) => parse_finite(input, pct)? / 100.0,
        None => parse_finite(input, raw)?,
    };
    Ok(clamp_to_u8(fraction * 255.0))
}

fn parse_finite(input: &str, raw: &str) -> Result<f64, ColorError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ColorError::malformed(input, format!("invalid channel {raw:?}")))?;
    if !value.is_finite() {
        return Err(ColorError::malformed(input, "non-finite channel"));
    }
    Ok(value)
}

fn clamp_to_u8(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_ass_swaps_channels() {
        assert_eq!(to_ass_color("#FFFF00"), "&H0000FFFF&");
        assert_eq!(to_ass_color("#112233"), "&H00332211&");
        assert_eq!(to_ass_color("112233"), "&H00332211&");
        assert_eq!(to_ass_color("#abcdef"), "&H00EFCDAB&");
    }

    #[test]
    fn test_malformed_falls_back_to_white() {
        assert_eq!(to_ass_color("#FFF0"), FALLBACK_ASS_COLOR);
        assert_eq!(to_ass_color("12345"), FALLBACK_ASS_COLOR);
        assert_eq!(to_ass_color("#GG0000"), FALLBACK_ASS_COLOR);
        assert_eq!(to_ass_color(""), FALLBACK_ASS_COLOR);
        assert_eq!(to_ass_color("rgb(1, 2)"), FALLBACK_ASS_COLOR);
        assert_eq!(to_ass_color("rgb(1, 2, x)"), FALLBACK_ASS_COLOR);
        assert_eq!(to_ass_color("rgb(1, 2, 3"), FALLBACK_ASS_COLOR);
    }

    #[test]
    fn test_strict_parse_reports_reason() {
        let err = Color::parse("#12").unwrap_err();
        assert_eq!(err.input, "#12");
        assert!(err.reason.contains("6 hex digits"));
    }

    #[test]
    fn test_rgba_float_channels_are_rounded_and_clamped() {
        let color = Color::parse("rgba(255.0, 127.6, -4, 1)").unwrap();
        assert_eq!(color, Color::rgba(255, 128, 0, 255));

        let color = Color::parse("rgb(300, 0.4, 0.5)").unwrap();
        assert_eq!(color, Color::rgb(255, 0, 1));
    }

    #[test]
    fn test_percentage_channels() {
        let color = Color::parse("rgb(100%, 50%, 0%)").unwrap();
        assert_eq!(color, Color::rgb(255, 128, 0));
        assert_eq!(color.to_hex(), "#FF8000");
    }

    #[test]
    fn test_alpha_is_inverted_in_ass() {
        let half = Color::parse("rgba(0, 0, 255, 0.5)").unwrap();
        assert_eq!(half.a, 128);
        assert_eq!(half.to_ass(), "&H7FFF0000&");

        let transparent = Color::parse("rgba(0, 0, 0, 0%)").unwrap();
        assert_eq!(transparent.to_ass(), "&HFF000000&");
    }

    #[test]
    fn test_serde_uses_lossy_strings() {
        let color: Color = serde_json::from_str("\"#00FF00\"").unwrap();
        assert_eq!(color, Color::rgb(0, 255, 0));
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#00FF00\"");

        let broken: Color = serde_json::from_str("\"nope\"").unwrap();
        assert_eq!(broken, Color::WHITE);
    }
}
