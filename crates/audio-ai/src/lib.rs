//! WordLight Audio Intelligence
//!
//! Audio stages of the pipeline, each delegating to an external tool:
//! - **Extraction:** ffmpeg to 48 kHz PCM WAV
//! - **Denoise Chain:** demucs, DeepFilterNet, RNNoise, VoiceFixer, low-pass
//! - **Transcription:** whisper_timestamped word-level timestamps

pub mod denoise;
pub mod extract;
pub mod filters;
pub mod transcription;

pub use denoise::*;
pub use extract::*;
pub use transcription::*;
