//! Subtitle style configuration.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Rendering attributes shared by the `Default` and `Highlight` styles.
///
/// The two styles differ only in primary text color: `primary_color` for
/// the line, `highlight_color` for the word being spoken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSpec {
    pub font_name: String,
    pub font_size: u32,

    /// Text color of the caption line.
    pub primary_color: Color,
    /// Text color of the currently spoken word.
    pub highlight_color: Color,
    /// Karaoke fill color (unused by word highlighting but part of the row).
    pub secondary_color: Color,
    pub outline_color: Color,
    /// Shadow / opaque box color.
    pub back_color: Color,

    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,

    /// Horizontal scale in percent.
    pub scale_x: f64,
    /// Vertical scale in percent.
    pub scale_y: f64,
    /// Extra letter spacing in pixels.
    pub spacing: f64,
    /// Rotation in degrees.
    pub angle: f64,

    /// 1 = outline + drop shadow, 3 = opaque box.
    pub border_style: u8,
    /// Outline width in pixels.
    pub outline: f64,
    /// Shadow depth in pixels.
    pub shadow: f64,

    /// Numpad alignment (1-3 bottom, 4-6 middle, 7-9 top).
    pub alignment: u8,
    pub margin_l: u32,
    pub margin_r: u32,
    /// Vertical margin; higher values move bottom-aligned captions up.
    pub margin_v: u32,

    /// Font encoding (1 = default).
    pub encoding: u32,
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            font_size: 36,
            primary_color: Color::WHITE,
            highlight_color: Color::YELLOW,
            secondary_color: Color::RED,
            outline_color: Color::BLACK,
            back_color: Color::BLACK,
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            scale_x: 100.0,
            scale_y: 100.0,
            spacing: 0.0,
            angle: 0.0,
            border_style: 1,
            outline: 3.0,
            shadow: 1.0,
            alignment: 2,
            margin_l: 10,
            margin_r: 10,
            margin_v: 75,
            encoding: 1,
        }
    }
}

impl StyleSpec {
    /// Check fields the renderer cannot recover from.
    pub fn validate(&self) -> Result<(), String> {
        if self.font_name.trim().is_empty() {
            return Err("font name must not be empty".to_string());
        }
        if self.font_name.contains(',') {
            return Err(format!(
                "font name {:?} must not contain a comma",
                self.font_name
            ));
        }
        if self.font_size == 0 {
            return Err("font size must be positive".to_string());
        }
        if !(1..=9).contains(&self.alignment) {
            return Err(format!("alignment {} is not in 1..=9", self.alignment));
        }
        if !matches!(self.border_style, 1 | 3) {
            return Err(format!("border style {} must be 1 or 3", self.border_style));
        }
        Ok(())
    }
}
