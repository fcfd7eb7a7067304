//! Render an ASS subtitle file from an existing word-level transcript.

use std::path::PathBuf;

use wordlight_caption_core::SubtitleTrack;
use wordlight_caption_model::word::Transcript;
use wordlight_pipeline::PipelineConfig;

pub fn run(
    config: &PipelineConfig,
    words: PathBuf,
    width: u32,
    height: u32,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    config
        .captions
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid caption settings: {e}"))?;

    let transcript = Transcript::load(&words)
        .map_err(|e| anyhow::anyhow!("Failed to load transcript: {e}"))?;
    let output = output.unwrap_or_else(|| words.with_extension("ass"));

    let track = SubtitleTrack::build(&transcript.words, &config.captions, width, height);
    track.write(&output)?;

    println!("Captions written: {}", output.display());
    println!("  Words: {}", transcript.words.len());
    println!("  Events: {}", track.events.len());
    println!("  Resolution: {width}x{height}");
    Ok(())
}
