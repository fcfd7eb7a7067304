//! Time-coded caption events.

use serde::{Deserialize, Serialize};

/// Named style rows present in every generated subtitle header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptionStyle {
    Default,
    Highlight,
}

impl CaptionStyle {
    /// Style name as written in the subtitle file.
    pub fn as_str(self) -> &'static str {
        match self {
            CaptionStyle::Default => "Default",
            CaptionStyle::Highlight => "Highlight",
        }
    }
}

/// Why an event exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Keeps the full line visible while no word is being spoken.
    Silence,
    /// Shows the line with one spoken word highlighted.
    Highlight,
}

/// A renderable subtitle line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEvent {
    /// Render layer; higher layers draw on top.
    pub layer: u32,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Base style of the line.
    pub style: CaptionStyle,
    pub kind: EventKind,
    /// Line text including inline override markup.
    pub text: String,
}

impl CaptionEvent {
    pub fn duration_secs(&self) -> f64 {
        self.end - self.start
    }
}
