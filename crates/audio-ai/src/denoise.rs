//! Ordered denoise chain.
//!
//! Each enabled filter consumes the previous stage's waveform and produces
//! a new one. An optional filter that fails is skipped and its input is
//! carried forward; a filter marked `required` aborts the chain instead.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wordlight_common::error::{WordlightError, WordlightResult};
use wordlight_common::process::require_file;

use crate::filters::{
    DeepFilterNet, Demucs, DemucsConfig, FilterToggle, LowPass, LowPassConfig, NoiseReduce,
    NoiseReduceConfig, RnNoise, VoiceFixer, VoiceFixerConfig,
};

/// A WAV-to-WAV filter backed by an external tool.
pub trait Denoiser: Send + Sync {
    /// Stage name used in logs and artifact names.
    fn name(&self) -> &'static str;

    /// Executable the filter needs on `PATH`.
    fn tool(&self) -> &'static str;

    /// Filter `input` into `output`, returning the path written.
    fn apply(&self, input: &Path, output: &Path) -> WordlightResult<PathBuf>;
}

/// What happened to one optional stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// The stage ran and wrote this waveform.
    Applied(PathBuf),
    /// The stage failed; the previous waveform was carried forward.
    Skipped { reason: String },
}

/// Per-filter settings in chain order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoiseConfig {
    pub demucs: DemucsConfig,
    pub noisereduce: NoiseReduceConfig,
    pub deepfilternet: FilterToggle,
    pub rnnoise: FilterToggle,
    pub voicefixer: VoiceFixerConfig,
    pub lowpass: LowPassConfig,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            demucs: DemucsConfig::default(),
            noisereduce: NoiseReduceConfig::default(),
            deepfilternet: FilterToggle::on(),
            rnnoise: FilterToggle::off(),
            voicefixer: VoiceFixerConfig::default(),
            lowpass: LowPassConfig::default(),
        }
    }
}

struct ChainStage {
    denoiser: Box<dyn Denoiser>,
    required: bool,
}

/// Result of running the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct DenoiseReport {
    /// Waveform produced by the last successful stage (or the input).
    pub output: PathBuf,
    /// Outcome per enabled stage, in chain order.
    pub stages: Vec<(String, StageOutcome)>,
}

impl DenoiseReport {
    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().filter_map(|(name, outcome)| match outcome {
            StageOutcome::Skipped { .. } => Some(name.as_str()),
            StageOutcome::Applied(_) => None,
        })
    }
}

#[derive(Default)]
pub struct DenoiseChain {
    stages: Vec<ChainStage>,
}

impl DenoiseChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the chain from configuration:
    /// demucs → noisereduce → DeepFilterNet → RNNoise → VoiceFixer → low-pass.
    pub fn from_config(config: &DenoiseConfig) -> Self {
        let mut chain = Self::new();
        if config.demucs.enabled {
            chain = chain.push(Demucs::new(config.demucs.clone()), config.demucs.required);
        }
        if config.noisereduce.enabled {
            chain = chain.push(
                NoiseReduce::new(config.noisereduce.clone()),
                config.noisereduce.required,
            );
        }
        if config.deepfilternet.enabled {
            chain = chain.push(DeepFilterNet, config.deepfilternet.required);
        }
        if config.rnnoise.enabled {
            chain = chain.push(RnNoise, config.rnnoise.required);
        }
        if config.voicefixer.enabled {
            chain = chain.push(
                VoiceFixer::new(config.voicefixer.clone()),
                config.voicefixer.required,
            );
        }
        if config.lowpass.enabled {
            chain = chain.push(LowPass::new(config.lowpass.cutoff_hz), config.lowpass.required);
        }
        chain
    }

    /// Append a stage.
    pub fn push(mut self, denoiser: impl Denoiser + 'static, required: bool) -> Self {
        self.stages.push(ChainStage {
            denoiser: Box::new(denoiser),
            required,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.denoiser.name()).collect()
    }

    /// Executables needed by the enabled stages.
    pub fn required_tools(&self) -> Vec<&'static str> {
        let mut tools: Vec<&'static str> = self.stages.iter().map(|s| s.denoiser.tool()).collect();
        tools.dedup();
        tools
    }

    /// Run every stage, writing outputs into `work_dir`.
    pub fn run(&self, input: &Path, work_dir: &Path) -> WordlightResult<DenoiseReport> {
        require_file(input)?;

        let mut current = input.to_path_buf();
        let mut outcomes = Vec::with_capacity(self.stages.len());

        for (index, stage) in self.stages.iter().enumerate() {
            let name = stage.denoiser.name();
            let output = work_dir.join(format!("{:02}_{name}.wav", index + 1));
            tracing::info!(stage = name, input = %current.display(), "Running denoise stage");

            match stage.denoiser.apply(&current, &output) {
                Ok(path) => {
                    tracing::info!(stage = name, output = %path.display(), "Denoise stage applied");
                    outcomes.push((name.to_string(), StageOutcome::Applied(path.clone())));
                    current = path;
                }
                Err(e) if stage.required => {
                    return Err(WordlightError::denoise(format!(
                        "required stage {name} failed: {e}"
                    )));
                }
                Err(e) => {
                    tracing::warn!(
                        stage = name,
                        error = %e,
                        "Optional denoise stage failed, keeping previous audio"
                    );
                    outcomes.push((
                        name.to_string(),
                        StageOutcome::Skipped {
                            reason: e.to_string(),
                        },
                    ));
                }
            }
        }

        Ok(DenoiseReport {
            output: current,
            stages: outcomes,
        })
    }
}
