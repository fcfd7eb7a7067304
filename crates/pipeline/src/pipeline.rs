//! End-to-end post-production run.
//!
//! Stages run strictly in sequence; each external process exits before the
//! next stage starts. Every working file lives in the run's
//! [`RunContext`] work directory.

use std::fmt;
use std::path::{Path, PathBuf};

use wordlight_audio_ai::denoise::{DenoiseChain, DenoiseReport};
use wordlight_audio_ai::extract::extract_audio;
use wordlight_audio_ai::transcription::{Transcriber, WhisperTimestamped};
use wordlight_caption_core::SubtitleTrack;
use wordlight_caption_model::word::Word;
use wordlight_common::error::{WordlightError, WordlightResult};
use wordlight_common::process::command_exists;
use wordlight_common::run::RunContext;
use wordlight_render_engine::{
    probe_duration, probe_frame_rate, probe_resolution, BurnJob, MusicMixJob, RemuxJob,
    SilenceRemovalJob,
};

use crate::config::PipelineConfig;
use crate::edit::{edit_words, TranscriptEditor};

/// Stages of a pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Extracting,
    Denoising,
    Remuxing,
    RemovingSilence,
    MixingMusic,
    Transcribing,
    EditingTranscript,
    GeneratingCaptions,
    BurningCaptions,
    Complete,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Extracting => "extracting audio",
            PipelineStage::Denoising => "denoising",
            PipelineStage::Remuxing => "re-encoding with clean audio",
            PipelineStage::RemovingSilence => "removing silence",
            PipelineStage::MixingMusic => "mixing background music",
            PipelineStage::Transcribing => "transcribing",
            PipelineStage::EditingTranscript => "editing transcript",
            PipelineStage::GeneratingCaptions => "generating captions",
            PipelineStage::BurningCaptions => "burning captions",
            PipelineStage::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Called when each stage starts.
pub type StageCallback = Box<dyn Fn(PipelineStage) + Send>;

/// Media supplied by the operator.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub video: PathBuf,
    /// Background music; the mix stage is skipped without it.
    pub music: Option<PathBuf>,
}

/// Terminal state of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The captioned video was written.
    Completed(PipelineReport),
    /// No words were left to caption; nothing was rendered.
    NoSpeech,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub output: PathBuf,
    pub denoise: DenoiseReport,
    pub words: usize,
    pub caption_events: usize,
}

/// A configured pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    chain: DenoiseChain,
    transcriber: Box<dyn Transcriber>,
    editor: Option<Box<dyn TranscriptEditor>>,
    on_stage: Option<StageCallback>,
}

impl Pipeline {
    /// Build a pipeline from validated configuration.
    pub fn new(config: PipelineConfig) -> WordlightResult<Self> {
        config.validate()?;
        let chain = DenoiseChain::from_config(&config.denoise);
        let transcriber = Box::new(WhisperTimestamped::new(config.transcription.clone()));
        Ok(Self {
            config,
            chain,
            transcriber,
            editor: None,
            on_stage: None,
        })
    }

    pub fn with_transcriber(mut self, transcriber: Box<dyn Transcriber>) -> Self {
        self.transcriber = transcriber;
        self
    }

    /// Pause after transcription so a person can correct the words.
    pub fn with_editor(mut self, editor: Box<dyn TranscriptEditor>) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn on_stage(mut self, callback: StageCallback) -> Self {
        self.on_stage = Some(callback);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Executables this run cannot do without.
    ///
    /// Optional denoisers are excluded; they degrade instead of failing.
    pub fn required_tools(&self) -> Vec<&'static str> {
        let mut tools = vec!["ffmpeg", "ffprobe", self.transcriber.tool()];
        if self.config.silence_removal.enabled {
            tools.push("auto-editor");
        }
        tools
    }

    /// Executables used by the configured denoise stages.
    pub fn denoise_tools(&self) -> Vec<&'static str> {
        self.chain.required_tools()
    }

    /// Fail early if a required tool is missing; warn for optional ones.
    pub fn preflight(&self) -> WordlightResult<()> {
        for tool in self.required_tools() {
            if !command_exists(tool) {
                return Err(WordlightError::tool(tool, "executable not found on PATH"));
            }
        }
        for tool in self.denoise_tools() {
            if !command_exists(tool) {
                tracing::warn!(tool, "Denoise tool not found on PATH; its stage will be skipped or fail");
            }
        }
        Ok(())
    }

    fn enter(&self, stage: PipelineStage) {
        tracing::info!(stage = %stage, "Pipeline stage");
        if let Some(cb) = &self.on_stage {
            cb(stage);
        }
    }

    /// Run every stage for `inputs`.
    pub fn run(&self, inputs: &PipelineInputs, ctx: &RunContext) -> WordlightResult<PipelineOutcome> {
        tracing::info!(
            run_id = %ctx.run_id(),
            video = %inputs.video.display(),
            music = ?inputs.music,
            work_dir = %ctx.work_dir().display(),
            "Starting pipeline run"
        );

        let outcome = self.run_stages(inputs, ctx)?;

        match &outcome {
            PipelineOutcome::Completed(report) => {
                tracing::info!(output = %report.output.display(), "Pipeline complete");
            }
            PipelineOutcome::NoSpeech => {
                tracing::warn!("No speech detected; nothing to caption");
            }
        }
        ctx.cleanup();
        Ok(outcome)
    }

    fn run_stages(
        &self,
        inputs: &PipelineInputs,
        ctx: &RunContext,
    ) -> WordlightResult<PipelineOutcome> {
        let cfg = &self.config;

        self.enter(PipelineStage::Extracting);
        let extracted = extract_audio(&inputs.video, &ctx.artifact("extracted_audio.wav"))?;

        self.enter(PipelineStage::Denoising);
        let denoise_dir = ctx.artifact("denoise");
        std::fs::create_dir_all(&denoise_dir)?;
        let denoise = self.chain.run(&extracted, &denoise_dir)?;

        self.enter(PipelineStage::Remuxing);
        let remuxed = RemuxJob {
            video: inputs.video.clone(),
            audio: denoise.output.clone(),
            output: ctx.artifact("cleaned.mkv"),
            frame_rate: probe_frame_rate(&inputs.video)?,
        }
        .run(&cfg.render)?;

        let speech_video = if cfg.silence_removal.enabled {
            self.enter(PipelineStage::RemovingSilence);
            SilenceRemovalJob {
                input: remuxed,
                output: ctx.artifact("no_silence.mkv"),
            }
            .run(&cfg.silence_removal, &cfg.render)?
        } else {
            tracing::info!("Silence removal bypassed");
            remuxed
        };

        let burn_input = match &inputs.music {
            Some(music) => {
                self.enter(PipelineStage::MixingMusic);
                MusicMixJob {
                    video: speech_video.clone(),
                    music: music.clone(),
                    output: ctx.artifact("with_music.mkv"),
                    duration: probe_duration(&speech_video)?,
                }
                .run(&cfg.music)?
            }
            None => {
                tracing::info!("No background music supplied; skipping mix");
                speech_video.clone()
            }
        };

        let captioned = match self.caption_speech(&speech_video, &burn_input, ctx)? {
            Some(captioned) => captioned,
            None => return Ok(PipelineOutcome::NoSpeech),
        };

        self.enter(PipelineStage::BurningCaptions);
        let output = BurnJob {
            video: burn_input,
            subtitles: captioned.subtitles,
            output: ctx.final_output_path(&inputs.video),
        }
        .run(&cfg.render)?;

        self.enter(PipelineStage::Complete);
        Ok(PipelineOutcome::Completed(PipelineReport {
            output,
            denoise,
            words: captioned.words,
            caption_events: captioned.track.events.len(),
        }))
    }

    /// Transcribe `speech_video`, run the optional edit checkpoint, and write
    /// `captions.ass` sized to `burn_input`.
    ///
    /// Returns `None` when no words survive transcription or editing; no
    /// subtitle file is written in that case.
    fn caption_speech(
        &self,
        speech_video: &Path,
        burn_input: &Path,
        ctx: &RunContext,
    ) -> WordlightResult<Option<Captioned>> {
        self.enter(PipelineStage::Transcribing);
        let transcript = self.transcriber.transcribe(speech_video, ctx.work_dir())?;
        if let Err(e) = transcript.save(ctx.artifact("words.json")) {
            tracing::warn!(error = %e, "Failed to save transcript artifact");
        }
        if transcript.is_empty() {
            return Ok(None);
        }

        let words = match &self.editor {
            Some(editor) => {
                self.enter(PipelineStage::EditingTranscript);
                let merge = edit_words(
                    &transcript.words,
                    &ctx.artifact("transcript_edit.txt"),
                    editor.as_ref(),
                )?;
                merge.words
            }
            None => transcript.words,
        };
        if words.is_empty() {
            return Ok(None);
        }

        self.enter(PipelineStage::GeneratingCaptions);
        let (width, height) = probe_resolution(burn_input)?;
        let subtitles = ctx.artifact("captions.ass");
        let track = write_captions(&words, &self.config, width, height, &subtitles)?;
        Ok(Some(Captioned {
            words: words.len(),
            track,
            subtitles,
        }))
    }
}

/// Output of the caption stages.
struct Captioned {
    words: usize,
    track: SubtitleTrack,
    subtitles: PathBuf,
}

/// Build and write the subtitle track for `words`.
fn write_captions(
    words: &[Word],
    config: &PipelineConfig,
    width: u32,
    height: u32,
    path: &Path,
) -> WordlightResult<SubtitleTrack> {
    let track = SubtitleTrack::build(words, &config.captions, width, height);
    track.write(path)?;
    Ok(track)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoTranscriber;

    impl Transcriber for NoTranscriber {
        fn transcribe(
            &self,
            _media: &Path,
            _work_dir: &Path,
        ) -> WordlightResult<wordlight_caption_model::word::Transcript> {
            Ok(Default::default())
        }

        fn tool(&self) -> &'static str {
            "true"
        }
    }

    /// Always returns the same words.
    struct FixedTranscriber(Vec<Word>);

    impl Transcriber for FixedTranscriber {
        fn transcribe(
            &self,
            _media: &Path,
            _work_dir: &Path,
        ) -> WordlightResult<wordlight_caption_model::word::Transcript> {
            Ok(wordlight_caption_model::word::Transcript::new(self.0.clone()))
        }

        fn tool(&self) -> &'static str {
            "true"
        }
    }

    /// Deletes every line of the edit file.
    struct ClearingEditor;

    impl TranscriptEditor for ClearingEditor {
        fn edit(&self, path: &Path) -> WordlightResult<()> {
            std::fs::write(path, "")?;
            Ok(())
        }
    }

    fn test_context(dir: &Path) -> (PipelineConfig, RunContext) {
        let mut config = PipelineConfig::default();
        config.general.output_dir = dir.join("out");
        let ctx = RunContext::with_run_id(&config.general, "test").unwrap();
        (config, ctx)
    }

    #[test]
    fn test_empty_transcript_is_no_speech() {
        let dir = tempfile::tempdir().unwrap();
        let (config, ctx) = test_context(dir.path());
        let pipeline = Pipeline::new(config)
            .unwrap()
            .with_transcriber(Box::new(NoTranscriber));

        let video = dir.path().join("speech.mkv");
        let captioned = pipeline.caption_speech(&video, &video, &ctx).unwrap();
        assert!(captioned.is_none());
        assert!(ctx.artifact("words.json").exists());
        assert!(!ctx.artifact("captions.ass").exists());
    }

    #[test]
    fn test_transcript_emptied_by_editor_is_no_speech() {
        let dir = tempfile::tempdir().unwrap();
        let (config, ctx) = test_context(dir.path());
        let stages = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = stages.clone();
        let pipeline = Pipeline::new(config)
            .unwrap()
            .with_transcriber(Box::new(FixedTranscriber(vec![
                Word::new(0.0, 0.4, "hello"),
                Word::new(0.5, 0.9, "world."),
            ])))
            .with_editor(Box::new(ClearingEditor))
            .on_stage(Box::new(move |stage| seen.lock().unwrap().push(stage)));

        let video = dir.path().join("speech.mkv");
        let captioned = pipeline.caption_speech(&video, &video, &ctx).unwrap();
        assert!(captioned.is_none());
        assert!(ctx.artifact("transcript_edit.txt").exists());
        assert!(!ctx.artifact("captions.ass").exists());
        assert_eq!(
            *stages.lock().unwrap(),
            vec![PipelineStage::Transcribing, PipelineStage::EditingTranscript]
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = PipelineConfig::default();
        config.render.qp = 99;
        assert!(Pipeline::new(config).is_err());
    }

    #[test]
    fn test_required_tools_follow_config() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        assert_eq!(
            pipeline.required_tools(),
            vec!["ffmpeg", "ffprobe", "whisper_timestamped", "auto-editor"]
        );

        let mut config = PipelineConfig::default();
        config.silence_removal.enabled = false;
        let pipeline = Pipeline::new(config)
            .unwrap()
            .with_transcriber(Box::new(NoTranscriber));
        assert_eq!(pipeline.required_tools(), vec!["ffmpeg", "ffprobe", "true"]);
    }

    #[test]
    fn test_missing_video_fails_before_any_tool() {
        let dir = tempfile::tempdir().unwrap();
        let (config, ctx) = test_context(dir.path());

        let pipeline = Pipeline::new(config).unwrap();
        let inputs = PipelineInputs {
            video: dir.path().join("missing.mp4"),
            music: None,
        };
        assert!(matches!(
            pipeline.run(&inputs, &ctx),
            Err(WordlightError::FileNotFound { .. })
        ));
        assert!(!ctx.final_output_path(&inputs.video).exists());
    }

    #[test]
    fn test_write_captions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("captions.ass");
        let words = vec![Word::new(0.0, 0.5, "Hi."), Word::new(3.0, 3.5, "Bye.")];
        let track = write_captions(&words, &PipelineConfig::default(), 1280, 720, &path).unwrap();
        assert_eq!(track.events.len(), 2);
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("PlayResX: 1280"));
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(PipelineStage::MixingMusic.to_string(), "mixing background music");
    }
}
