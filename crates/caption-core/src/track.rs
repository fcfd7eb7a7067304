//! Word list to subtitle track.

use std::path::Path;

use serde::{Deserialize, Serialize};
use wordlight_caption_model::event::CaptionEvent;
use wordlight_caption_model::style::StyleSpec;
use wordlight_caption_model::word::Word;
use wordlight_common::error::{WordlightError, WordlightResult};

use crate::ass;
use crate::segment::{segment_words, SegmentationConfig};
use crate::timing::segment_events;

/// Caption generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    #[serde(flatten)]
    pub segmentation: SegmentationConfig,

    /// Silence spans must be strictly longer than this to get an event.
    pub min_silence_secs: f64,

    pub style: StyleSpec,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            segmentation: SegmentationConfig::default(),
            min_silence_secs: 0.02,
            style: StyleSpec::default(),
        }
    }
}

impl CaptionConfig {
    pub fn validate(&self) -> WordlightResult<()> {
        self.segmentation.validate()?;
        if !(self.min_silence_secs.is_finite() && self.min_silence_secs >= 0.0) {
            return Err(WordlightError::config(format!(
                "min_silence_secs must be non-negative, got {}",
                self.min_silence_secs
            )));
        }
        self.style.validate().map_err(WordlightError::config)
    }
}

/// Derive every caption event for `words`, in segment order.
pub fn build_events(words: &[Word], config: &CaptionConfig) -> Vec<CaptionEvent> {
    segment_words(words, &config.segmentation)
        .iter()
        .flat_map(|segment| segment_events(segment, config.min_silence_secs))
        .collect()
}

/// A fully derived subtitle track ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleTrack {
    pub width: u32,
    pub height: u32,
    pub style: StyleSpec,
    pub events: Vec<CaptionEvent>,
}

impl SubtitleTrack {
    /// Build a track for a video of the given resolution.
    pub fn build(words: &[Word], config: &CaptionConfig, width: u32, height: u32) -> Self {
        let events = build_events(words, config);
        tracing::debug!(
            words = words.len(),
            events = events.len(),
            width,
            height,
            "Built subtitle track"
        );
        Self {
            width,
            height,
            style: config.style.clone(),
            events,
        }
    }

    /// Serialize to ASS text.
    pub fn render(&self) -> String {
        ass::render_document(&self.style, self.width, self.height, &self.events)
    }

    /// Write the ASS document to `path`.
    pub fn write(&self, path: &Path) -> WordlightResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.render())?;
        tracing::info!(
            path = %path.display(),
            events = self.events.len(),
            "Wrote subtitle track"
        );
        Ok(())
    }
}
