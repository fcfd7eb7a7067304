//! Run the full post-production pipeline on a video.

use std::path::PathBuf;

use wordlight_caption_model::color::Color;
use wordlight_common::run::RunContext;
use wordlight_pipeline::{
    InteractiveEditor, Pipeline, PipelineConfig, PipelineInputs, PipelineOutcome, PipelineStage,
};

/// Command-line settings layered over the loaded configuration.
#[derive(Debug, Default)]
pub struct Overrides {
    pub output: Option<PathBuf>,
    pub bypass_silence_removal: bool,
    pub edit_transcript: bool,
    pub font: Option<String>,
    pub font_size: Option<u32>,
    pub margin_v: Option<u32>,
    pub primary_color: Option<String>,
    pub highlight_color: Option<String>,
    pub max_sentences: Option<usize>,
    pub max_words: Option<usize>,
    pub max_gap: Option<f64>,
    pub codec: Option<String>,
    pub qp: Option<u32>,
    pub keep_intermediates: bool,
}

impl Overrides {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(dir) = self.output {
            config.general.output_dir = dir;
        }
        if self.bypass_silence_removal {
            config.silence_removal.enabled = false;
        }
        if self.keep_intermediates {
            config.general.keep_intermediates = true;
        }

        let style = &mut config.captions.style;
        if let Some(font) = self.font {
            style.font_name = font;
        }
        if let Some(size) = self.font_size {
            style.font_size = size;
        }
        if let Some(margin) = self.margin_v {
            style.margin_v = margin;
        }
        if let Some(color) = self.primary_color {
            style.primary_color = Color::parse_lossy(&color);
        }
        if let Some(color) = self.highlight_color {
            style.highlight_color = Color::parse_lossy(&color);
        }

        let segmentation = &mut config.captions.segmentation;
        if let Some(n) = self.max_sentences {
            segmentation.max_sentences = n;
        }
        if let Some(n) = self.max_words {
            segmentation.max_words = n;
        }
        if let Some(gap) = self.max_gap {
            segmentation.max_gap_secs = gap;
        }

        if let Some(codec) = self.codec {
            config.render.video_codec = codec;
        }
        if let Some(qp) = self.qp {
            config.render.qp = qp;
        }
    }
}

pub async fn run(
    mut config: PipelineConfig,
    video: PathBuf,
    music: Option<PathBuf>,
    overrides: Overrides,
) -> anyhow::Result<()> {
    println!("Processing: {}", video.display());

    let edit_transcript = overrides.edit_transcript;
    overrides.apply(&mut config);

    let mut pipeline = Pipeline::new(config)
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?
        .on_stage(Box::new(|stage| {
            if stage != PipelineStage::Complete {
                println!("  -> {stage}");
            }
        }));
    if edit_transcript {
        pipeline = pipeline.with_editor(Box::new(InteractiveEditor));
    }

    pipeline
        .preflight()
        .map_err(|e| anyhow::anyhow!("Preflight failed: {e}"))?;

    let ctx = RunContext::start(&pipeline.config().general)?;
    println!("  Run: {}", ctx.run_id());
    if let Some(music) = &music {
        println!("  Music: {}", music.display());
    }

    let inputs = PipelineInputs { video, music };
    let outcome = tokio::task::spawn_blocking(move || pipeline.run(&inputs, &ctx)).await??;

    match outcome {
        PipelineOutcome::Completed(report) => {
            println!("\nProcessing complete: {}", report.output.display());
            println!("  Words: {}", report.words);
            println!("  Caption events: {}", report.caption_events);
            let skipped: Vec<&str> = report.denoise.skipped().collect();
            if !skipped.is_empty() {
                println!("  Skipped denoise stages: {}", skipped.join(", "));
            }
        }
        PipelineOutcome::NoSpeech => {
            println!("\nNo speech detected; no captioned video was produced.");
        }
    }

    Ok(())
}
