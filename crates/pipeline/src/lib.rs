//! WordLight Pipeline
//!
//! Orchestrates a full post-production run: audio extraction, denoising,
//! re-encoding, silence removal, music ducking, transcription, optional
//! transcript editing, caption generation, and caption burn-in.

pub mod config;
pub mod edit;
pub mod pipeline;

pub use config::PipelineConfig;
pub use edit::{edit_words, InteractiveEditor, TranscriptEditor};
pub use pipeline::{
    Pipeline, PipelineInputs, PipelineOutcome, PipelineReport, PipelineStage, StageCallback,
};
