//! Silence removal via auto-editor.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use wordlight_common::error::{WordlightError, WordlightResult};
use wordlight_common::process::{require_file, ToolCommand};

use crate::mux::RenderConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SilenceRemovalConfig {
    pub enabled: bool,

    /// Loudness threshold below which audio counts as silent, in (0, 1).
    pub threshold: f64,

    /// Padding kept around loud sections, in seconds.
    pub margin_secs: f64,

    /// Video bitrate handed to auto-editor's encoder.
    pub video_bitrate: String,
}

impl Default for SilenceRemovalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.04,
            margin_secs: 0.5,
            video_bitrate: "50M".to_string(),
        }
    }
}

impl SilenceRemovalConfig {
    pub fn validate(&self) -> WordlightResult<()> {
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(WordlightError::config(format!(
                "silence threshold must be in (0, 1), got {}",
                self.threshold
            )));
        }
        if !(self.margin_secs.is_finite() && self.margin_secs >= 0.0) {
            return Err(WordlightError::config(format!(
                "silence margin must be non-negative, got {}",
                self.margin_secs
            )));
        }
        if self.video_bitrate.trim().is_empty() {
            return Err(WordlightError::config("video bitrate must not be empty"));
        }
        Ok(())
    }
}

/// Cut silent sections out of a video.
#[derive(Debug, Clone)]
pub struct SilenceRemovalJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl SilenceRemovalJob {
    pub fn command(
        &self,
        config: &SilenceRemovalConfig,
        render: &RenderConfig,
    ) -> WordlightResult<ToolCommand> {
        config.validate()?;
        render.validate()?;

        Ok(ToolCommand::new("auto-editor")
            .arg(&self.input)
            .arg("--edit")
            .arg(format!("audio:threshold={:.2}", config.threshold))
            .arg("--margin")
            .arg(format!("{:.1}s", config.margin_secs))
            .args(["-c:v", render.video_codec.trim(), "-b:v", config.video_bitrate.trim()])
            .arg("--no-open")
            .arg("-b:a")
            .arg(render.audio_bitrate())
            .arg("-o")
            .arg(&self.output))
    }

    pub fn run(
        &self,
        config: &SilenceRemovalConfig,
        render: &RenderConfig,
    ) -> WordlightResult<PathBuf> {
        require_file(&self.input)?;
        tracing::info!(
            input = %self.input.display(),
            threshold = config.threshold,
            margin_secs = config.margin_secs,
            "Removing silence"
        );
        self.command(config, render)?
            .run_producing("silence removal", &self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command() {
        let job = SilenceRemovalJob {
            input: "remux.mkv".into(),
            output: "cut.mkv".into(),
        };
        let cmd = job
            .command(&SilenceRemovalConfig::default(), &RenderConfig::default())
            .unwrap();
        assert_eq!(cmd.program(), "auto-editor");
        assert_eq!(
            cmd.arg_strings(),
            vec![
                "remux.mkv",
                "--edit",
                "audio:threshold=0.04",
                "--margin",
                "0.5s",
                "-c:v",
                "hevc_nvenc",
                "-b:v",
                "50M",
                "--no-open",
                "-b:a",
                "320k",
                "-o",
                "cut.mkv"
            ]
        );
    }

    #[test]
    fn test_validation() {
        assert!(SilenceRemovalConfig::default().validate().is_ok());
        for threshold in [0.0, 1.0, -0.1, f64::NAN] {
            let config = SilenceRemovalConfig {
                threshold,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "threshold {threshold}");
        }
        let config = SilenceRemovalConfig {
            margin_secs: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
