//! Advanced SubStation Alpha (ASS) serialization.
//!
//! Generates the script header, the two caption style rows, and the
//! `Dialogue:` event lines consumed by ffmpeg's `ass` filter.

use std::fmt::Write as _;

use wordlight_caption_model::color::Color;
use wordlight_caption_model::event::{CaptionEvent, CaptionStyle};
use wordlight_caption_model::style::StyleSpec;

/// Fixed 23-field style Format line.
pub const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

/// Event Format line.
pub const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Format seconds as `H:MM:SS.CC`.
///
/// Hours are unpadded and centiseconds are truncated, not rounded.
/// Negative or non-finite input clamps to zero.
pub fn format_timestamp(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    // Snap to whole nanoseconds first so representation error
    // (65.256 * 100 = 6525.599...) cannot cross a centisecond boundary.
    let nanos = (secs * 1e9).round() as u64;
    let total_cs = nanos / 10_000_000;

    let cs = total_cs % 100;
    let total_secs = total_cs / 100;
    let s = total_secs % 60;
    let m = (total_secs / 60) % 60;
    let h = total_secs / 3600;

    format!("{h}:{m:02}:{s:02}.{cs:02}")
}

/// ASS boolean encoding: -1 true, 0 false.
fn flag(value: bool) -> i8 {
    if value {
        -1
    } else {
        0
    }
}

/// Render one `Style:` row with the given name and primary color.
pub fn style_line(name: &str, style: &StyleSpec, primary: Color) -> String {
    format!(
        "Style: {name},{font},{size},{primary},{secondary},{outline_color},{back},{bold},{italic},{underline},{strikeout},{scale_x},{scale_y},{spacing},{angle},{border},{outline},{shadow},{align},{ml},{mr},{mv},{encoding}",
        font = style.font_name,
        size = style.font_size,
        primary = primary.to_ass(),
        secondary = style.secondary_color.to_ass(),
        outline_color = style.outline_color.to_ass(),
        back = style.back_color.to_ass(),
        bold = flag(style.bold),
        italic = flag(style.italic),
        underline = flag(style.underline),
        strikeout = flag(style.strikeout),
        scale_x = style.scale_x,
        scale_y = style.scale_y,
        spacing = style.spacing,
        angle = style.angle,
        border = style.border_style,
        outline = style.outline,
        shadow = style.shadow,
        align = style.alignment,
        ml = style.margin_l,
        mr = style.margin_r,
        mv = style.margin_v,
        encoding = style.encoding,
    )
}

/// Script header through the `[Events]` Format line.
pub fn render_header(style: &StyleSpec, width: u32, height: u32) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "[Script Info]");
    let _ = writeln!(out, "ScriptType: v4.00+");
    let _ = writeln!(out, "PlayResX: {width}");
    let _ = writeln!(out, "PlayResY: {height}");
    let _ = writeln!(out);
    let _ = writeln!(out, "[V4+ Styles]");
    let _ = writeln!(out, "{STYLE_FORMAT}");
    let _ = writeln!(
        out,
        "{}",
        style_line(CaptionStyle::Default.as_str(), style, style.primary_color)
    );
    let _ = writeln!(
        out,
        "{}",
        style_line(CaptionStyle::Highlight.as_str(), style, style.highlight_color)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "[Events]");
    let _ = writeln!(out, "{EVENT_FORMAT}");
    out
}

/// One `Dialogue:` line (no trailing newline).
pub fn render_dialogue(event: &CaptionEvent) -> String {
    format!(
        "Dialogue: {},{},{},{},,0,0,0,,{}",
        event.layer,
        format_timestamp(event.start),
        format_timestamp(event.end),
        event.style.as_str(),
        event.text
    )
}

/// Complete subtitle document.
pub fn render_document(
    style: &StyleSpec,
    width: u32,
    height: u32,
    events: &[CaptionEvent],
) -> String {
    let mut out = render_header(style, width, height);
    for event in events {
        out.push_str(&render_dialogue(event));
        out.push('\n');
    }
    out
}
