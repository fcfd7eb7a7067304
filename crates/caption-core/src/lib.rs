//! WordLight Caption Core
//!
//! Pure transformation from word timestamps to styled subtitle events:
//! - **Segmentation:** Groups words into caption blocks by sentence count,
//!   word count, and pause length
//! - **Timing:** Derives silence and per-word highlight events per block
//! - **ASS:** Serializes headers, styles, and dialogue lines
//!
//! Nothing in this crate touches external processes. The only I/O is
//! [`SubtitleTrack::write`].

pub mod ass;
pub mod segment;
pub mod timing;
pub mod track;

pub use segment::{segment_words, Segment, SegmentationConfig};
pub use timing::segment_events;
pub use track::{build_events, CaptionConfig, SubtitleTrack};
