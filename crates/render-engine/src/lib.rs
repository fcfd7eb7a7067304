//! WordLight Render Engine
//!
//! ffmpeg-backed video stages. Every stage is a typed job that validates
//! its settings, builds a [`ToolCommand`](wordlight_common::ToolCommand),
//! runs it, and checks the expected output exists.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source.mp4 ──┐
//!              ├── Remux (source video + processed audio, constant QP)
//! clean.wav ───┘         │
//!                        ├── Silence Removal (auto-editor, optional)
//!                        │         │
//! music.mp3 ─────────────┼─────────┴── Music Mix (loop, fade, sidechain duck)
//!                        │                   │
//! captions.ass ──────────┴───────────────────┴── Caption Burn
//!                                                      │
//!                                                      ▼
//!                                             <stem>_Completed_<run>.mkv
//! ```

pub mod music;
pub mod mux;
pub mod probe;
pub mod silence;

pub use music::{FadeWindow, MusicConfig, MusicMixJob};
pub use mux::{escape_filter_path, BurnJob, RemuxJob, RenderConfig};
pub use probe::{probe_duration, probe_frame_rate, probe_resolution};
pub use silence::{SilenceRemovalConfig, SilenceRemovalJob};
