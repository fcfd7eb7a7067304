//! Aggregated pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use wordlight_audio_ai::denoise::DenoiseConfig;
use wordlight_audio_ai::transcription::TranscriptionConfig;
use wordlight_caption_core::CaptionConfig;
use wordlight_common::config::{config_file_path, load_json_or_default, save_json, AppConfig};
use wordlight_common::error::WordlightResult;
use wordlight_render_engine::{MusicConfig, RenderConfig, SilenceRemovalConfig};

/// Every setting a pipeline run reads. Each section falls back to its
/// defaults when absent from the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub general: AppConfig,
    pub captions: CaptionConfig,
    pub denoise: DenoiseConfig,
    pub transcription: TranscriptionConfig,
    pub silence_removal: SilenceRemovalConfig,
    pub music: MusicConfig,
    pub render: RenderConfig,
}

impl PipelineConfig {
    /// Load from `path`, or from the standard location when `None`.
    ///
    /// A missing or unparseable file yields defaults with a warning.
    pub fn load(path: Option<&Path>) -> Self {
        match path {
            Some(path) => load_json_or_default(path),
            None => load_json_or_default(&config_file_path()),
        }
    }

    pub fn save(&self, path: &Path) -> WordlightResult<()> {
        save_json(self, path)?;
        tracing::info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Reject settings no stage can run with.
    pub fn validate(&self) -> WordlightResult<()> {
        self.captions.validate()?;
        self.transcription.validate()?;
        self.silence_removal.validate()?;
        self.music.validate()?;
        self.render.validate()?;
        Ok(())
    }
}
