//! WordLight Caption Model
//!
//! Defines the data contracts shared by the caption engine and the pipeline:
//! - **Words:** Word-level timestamps produced by transcription
//! - **Transcript edits:** The line-oriented human-editable transcript format
//! - **Caption events:** Time-coded renderable subtitle lines
//! - **Styles:** Subtitle style configuration and color normalization
//!
//! All times are in seconds from the start of the media.

pub mod color;
pub mod event;
pub mod style;
pub mod transcript_edit;
pub mod word;

pub use color::*;
pub use event::*;
pub use style::*;
pub use word::*;
