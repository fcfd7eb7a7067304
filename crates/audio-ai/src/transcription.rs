//! Word-level transcription.
//!
//! Runs whisper_timestamped as an external process and flattens its
//! `segments[].words[]` output into a single word list.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wordlight_caption_model::word::{Transcript, Word};
use wordlight_common::error::{WordlightError, WordlightResult};
use wordlight_common::process::{require_file, ToolCommand};

/// Configuration for transcription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Whisper model name (`tiny`, `base`, `small`, ...).
    pub model: String,

    /// Language hint (ISO 639-1 code, e.g., "en").
    pub language: Option<String>,

    /// Torch device; `auto` lets the tool decide.
    pub device: String,

    pub beam_size: u32,
    pub best_of: u32,
    pub temperature: f64,

    /// Voice activity detection before decoding.
    pub vad: bool,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "base".to_string(),
            language: Some("en".to_string()),
            device: "auto".to_string(),
            beam_size: 25,
            best_of: 1,
            temperature: 0.2,
            vad: false,
        }
    }
}

impl TranscriptionConfig {
    pub fn validate(&self) -> WordlightResult<()> {
        if self.model.trim().is_empty() {
            return Err(WordlightError::config("transcription model must not be empty"));
        }
        if self.beam_size == 0 || self.best_of == 0 {
            return Err(WordlightError::config(
                "beam size and best-of must be at least 1",
            ));
        }
        if !(self.temperature.is_finite() && self.temperature >= 0.0) {
            return Err(WordlightError::config(format!(
                "temperature must be non-negative, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// Speech-to-text backend producing word timestamps.
pub trait Transcriber: Send + Sync {
    /// Transcribe `media`, using `work_dir` for any tool output.
    fn transcribe(&self, media: &Path, work_dir: &Path) -> WordlightResult<Transcript>;

    /// Executable the backend needs on `PATH`.
    fn tool(&self) -> &'static str;
}

/// whisper_timestamped CLI backend.
#[derive(Debug, Clone, Default)]
pub struct WhisperTimestamped {
    config: TranscriptionConfig,
}

impl WhisperTimestamped {
    pub fn new(config: TranscriptionConfig) -> Self {
        Self { config }
    }

    pub fn command(&self, media: &Path, out_dir: &Path) -> WordlightResult<ToolCommand> {
        self.config.validate()?;
        let c = &self.config;

        let mut cmd = ToolCommand::new("whisper_timestamped")
            .arg(media)
            .args(["--model", c.model.trim()]);
        if let Some(language) = c.language.as_deref().filter(|l| !l.trim().is_empty()) {
            cmd = cmd.args(["--language", language.trim()]);
        }
        if c.device.trim() != "auto" && !c.device.trim().is_empty() {
            cmd = cmd.args(["--device", c.device.trim()]);
        }
        cmd = cmd
            .arg("--beam_size")
            .arg(c.beam_size.to_string())
            .arg("--best_of")
            .arg(c.best_of.to_string())
            .arg("--temperature")
            .arg(c.temperature.to_string());
        if c.vad {
            cmd = cmd.args(["--vad", "True"]);
        }
        Ok(cmd
            .args(["--output_format", "json"])
            .arg("--output_dir")
            .arg(out_dir))
    }

    /// JSON file the CLI writes for `media`.
    ///
    /// Newer releases name it after the full file name, older ones after
    /// the stem; both are tried.
    fn output_candidates(media: &Path, out_dir: &Path) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(name) = media.file_name() {
            candidates.push(out_dir.join(format!("{}.words.json", name.to_string_lossy())));
        }
        if let Some(stem) = media.file_stem() {
            candidates.push(out_dir.join(format!("{}.words.json", stem.to_string_lossy())));
        }
        candidates
    }
}

impl Transcriber for WhisperTimestamped {
    fn transcribe(&self, media: &Path, work_dir: &Path) -> WordlightResult<Transcript> {
        require_file(media)?;
        tracing::info!(
            path = %media.display(),
            model = %self.config.model,
            "Starting transcription"
        );

        let out_dir = work_dir.join("transcription");
        std::fs::create_dir_all(&out_dir)?;
        self.command(media, &out_dir)?.run().map_err(|e| {
            WordlightError::transcription(format!("whisper_timestamped failed: {e}"))
        })?;

        let candidates = Self::output_candidates(media, &out_dir);
        let json_path = candidates
            .iter()
            .find(|p| p.exists())
            .ok_or_else(|| {
                WordlightError::missing_artifact(
                    "transcription",
                    candidates.first().cloned().unwrap_or_else(|| out_dir.clone()),
                )
            })?;

        let content = std::fs::read_to_string(json_path)?;
        let transcript = parse_whisper_json(&content)?;
        tracing::info!(words = transcript.words.len(), "Transcription complete");
        Ok(transcript)
    }

    fn tool(&self) -> &'static str {
        "whisper_timestamped"
    }
}

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    #[serde(default)]
    words: Vec<WhisperWord>,
}

#[derive(Debug, Deserialize)]
struct WhisperWord {
    text: String,
    start: f64,
    end: f64,
}

/// Flatten whisper JSON into a transcript.
///
/// Word text is trimmed and empty words are dropped.
pub fn parse_whisper_json(json: &str) -> WordlightResult<Transcript> {
    let output: WhisperOutput = serde_json::from_str(json)
        .map_err(|e| WordlightError::transcription(format!("unreadable whisper output: {e}")))?;

    let words: Vec<Word> = output
        .segments
        .into_iter()
        .flat_map(|segment| segment.words)
        .filter_map(|w| {
            let text = w.text.trim();
            if text.is_empty() {
                tracing::debug!(start = w.start, "Dropping empty word");
                None
            } else {
                Some(Word::new(w.start, w.end, text))
            }
        })
        .collect();

    let transcript = Transcript {
        language: output.language,
        words,
    };
    transcript
        .validate()
        .map_err(|e| WordlightError::transcription(e.to_string()))?;
    Ok(transcript)
}
