//! Background music mixing with sidechain ducking.
//!
//! The music track loops for the length of the video, fades out at the
//! end, and is compressed whenever the voice is present so speech stays
//! intelligible. Both inputs are loudness-normalized first.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use wordlight_common::error::{WordlightError, WordlightResult};
use wordlight_common::process::{require_file, ToolCommand};

/// Videos shorter than this get the short fade.
const SHORT_VIDEO_SECS: f64 = 7.0;
const SHORT_FADE_SECS: f64 = 2.0;
const LONG_FADE_SECS: f64 = 5.0;

const LOUDNORM: &str = "dynaudnorm=f=500:g=15:m=10:r=0.95";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    /// Music gain before ducking, in [0, 1].
    pub volume: f64,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self { volume: 0.15 }
    }
}

impl MusicConfig {
    pub fn validate(&self) -> WordlightResult<()> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(WordlightError::config(format!(
                "music volume must be in [0, 1], got {}",
                self.volume
            )));
        }
        Ok(())
    }
}

/// Fade-out placement in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeWindow {
    pub start: f64,
    pub duration: f64,
}

impl FadeWindow {
    /// Fade for a video of the given duration.
    ///
    /// Unknown or short (< 7 s) durations fade over `min(2, d)` seconds
    /// ending at `d`; longer videos fade over their last 5 seconds.
    pub fn for_duration(duration: Option<f64>) -> Self {
        match duration {
            Some(d) if d >= SHORT_VIDEO_SECS => Self {
                start: d - LONG_FADE_SECS,
                duration: LONG_FADE_SECS,
            },
            Some(d) if d > 0.0 => Self {
                start: (d - SHORT_FADE_SECS).max(0.0),
                duration: d.min(SHORT_FADE_SECS),
            },
            _ => Self {
                start: 0.0,
                duration: SHORT_FADE_SECS,
            },
        }
    }
}

/// The `-filter_complex` graph producing `[mixout]`.
pub fn filter_graph(fade: FadeWindow, volume: f64) -> String {
    format!(
        "[0:a]{LOUDNORM}[main];\
         [1:a]afade=t=out:st={start:.2}:d={duration:.2},{LOUDNORM}[pbg];\
         [main]asplit=2[maina][mainb];\
         [pbg]volume={volume:.2}[bg];\
         [bg][maina]sidechaincompress=threshold=0.01:ratio=15:attack=1:release=20[compr];\
         [compr][mainb]amerge[mixout]",
        start = fade.start,
        duration = fade.duration,
    )
}

/// Mix looped background music under a video's audio.
#[derive(Debug, Clone)]
pub struct MusicMixJob {
    pub video: PathBuf,
    pub music: PathBuf,
    pub output: PathBuf,
    /// Video duration, if known.
    pub duration: Option<f64>,
}

impl MusicMixJob {
    pub fn command(&self, config: &MusicConfig) -> WordlightResult<ToolCommand> {
        config.validate()?;
        let fade = FadeWindow::for_duration(self.duration);

        Ok(ToolCommand::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(&self.video)
            .args(["-stream_loop", "-1", "-i"])
            .arg(&self.music)
            .arg("-filter_complex")
            .arg(filter_graph(fade, config.volume))
            .args(["-map", "0:v:0", "-map", "[mixout]"])
            .args(["-c:v", "copy", "-c:a", "aac", "-ac", "2"])
            .arg(&self.output))
    }

    pub fn run(&self, config: &MusicConfig) -> WordlightResult<PathBuf> {
        require_file(&self.video)?;
        require_file(&self.music)?;
        tracing::info!(
            video = %self.video.display(),
            music = %self.music.display(),
            volume = config.volume,
            duration_secs = ?self.duration,
            "Mixing background music"
        );
        self.command(config)?.run_producing("music mix", &self.output)
    }
}
