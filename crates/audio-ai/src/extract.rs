//! Audio extraction from the source video.

use std::path::{Path, PathBuf};

use wordlight_common::error::{WordlightError, WordlightResult};
use wordlight_common::process::{require_file, ToolCommand};

/// Sample rate of the extracted waveform.
pub const EXTRACT_SAMPLE_RATE: u32 = 48_000;

/// ffmpeg invocation writing the video's audio as 16-bit PCM WAV.
pub fn extraction_command(video: &Path, output: &Path) -> ToolCommand {
    ToolCommand::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(video)
        .args(["-vn", "-acodec", "pcm_s16le", "-ar"])
        .arg(EXTRACT_SAMPLE_RATE.to_string())
        .arg(output)
}

/// Extract the audio track of `video` into `output`.
pub fn extract_audio(video: &Path, output: &Path) -> WordlightResult<PathBuf> {
    require_file(video)?;
    tracing::info!(
        video = %video.display(),
        output = %output.display(),
        "Extracting audio"
    );
    extraction_command(video, output)
        .run_producing("audio extraction", output)
        .map_err(|e| match e {
            WordlightError::Tool { tool, message } => {
                WordlightError::extraction(format!("{tool} failed: {message}"))
            }
            other => other,
        })
}
