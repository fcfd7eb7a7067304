//! Concrete denoise filters.
//!
//! Each filter wraps one external tool. They all take a WAV path and write
//! a new WAV; none of them modifies its input.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wordlight_common::error::{WordlightError, WordlightResult};
use wordlight_common::process::{expect_artifact, ToolCommand};

use crate::denoise::Denoiser;

/// Source-separation models known to the `demucs` CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemucsModel {
    #[serde(rename = "htdemucs")]
    HtDemucs,
    #[serde(rename = "htdemucs_ft")]
    HtDemucsFt,
    #[serde(rename = "htdemucs_6s")]
    HtDemucs6s,
    #[serde(rename = "repro_mdx_a_time_only")]
    ReproMdxATimeOnly,
    #[serde(rename = "repro_mdx_a_hybrid_only")]
    ReproMdxAHybridOnly,
    #[serde(rename = "repro_mdx_a")]
    ReproMdxA,
    #[serde(rename = "mdx_q")]
    MdxQ,
    #[serde(rename = "mdx_extra_q")]
    MdxExtraQ,
    #[serde(rename = "mdx_extra")]
    MdxExtra,
    #[serde(rename = "mdx")]
    Mdx,
    #[serde(rename = "hdemucs_mmi")]
    HDemucsMmi,
}

impl DemucsModel {
    pub const ALL: [DemucsModel; 11] = [
        DemucsModel::HtDemucs,
        DemucsModel::HtDemucsFt,
        DemucsModel::HtDemucs6s,
        DemucsModel::ReproMdxATimeOnly,
        DemucsModel::ReproMdxAHybridOnly,
        DemucsModel::ReproMdxA,
        DemucsModel::MdxQ,
        DemucsModel::MdxExtraQ,
        DemucsModel::MdxExtra,
        DemucsModel::Mdx,
        DemucsModel::HDemucsMmi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DemucsModel::HtDemucs => "htdemucs",
            DemucsModel::HtDemucsFt => "htdemucs_ft",
            DemucsModel::HtDemucs6s => "htdemucs_6s",
            DemucsModel::ReproMdxATimeOnly => "repro_mdx_a_time_only",
            DemucsModel::ReproMdxAHybridOnly => "repro_mdx_a_hybrid_only",
            DemucsModel::ReproMdxA => "repro_mdx_a",
            DemucsModel::MdxQ => "mdx_q",
            DemucsModel::MdxExtraQ => "mdx_extra_q",
            DemucsModel::MdxExtra => "mdx_extra",
            DemucsModel::Mdx => "mdx",
            DemucsModel::HDemucsMmi => "hdemucs_mmi",
        }
    }
}

impl fmt::Display for DemucsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemucsModel {
    type Err = WordlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| WordlightError::config(format!("unknown demucs model {s:?}")))
    }
}

/// Vocal isolation with demucs (`--two-stems vocals`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemucsConfig {
    pub enabled: bool,
    pub required: bool,
    pub model: DemucsModel,
    /// Torch device, e.g. `cuda` or `cpu`.
    pub device: String,
    /// Random-shift passes; more is slower and cleaner.
    pub shifts: u32,
}

impl Default for DemucsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            required: false,
            model: DemucsModel::HtDemucsFt,
            device: "cuda".to_string(),
            shifts: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Demucs {
    config: DemucsConfig,
}

impl Demucs {
    pub fn new(config: DemucsConfig) -> Self {
        Self { config }
    }

    /// Scratch directory demucs writes its stems into.
    fn stems_dir(output: &Path) -> PathBuf {
        output.with_extension("demucs")
    }

    pub fn command(&self, input: &Path, stems_dir: &Path) -> WordlightResult<ToolCommand> {
        if self.config.device.trim().is_empty() {
            return Err(WordlightError::config("demucs device must not be empty"));
        }
        if self.config.shifts == 0 {
            return Err(WordlightError::config("demucs shifts must be at least 1"));
        }
        Ok(ToolCommand::new("demucs")
            .args(["-n", self.config.model.as_str()])
            .args(["-d", self.config.device.trim()])
            .args(["--two-stems", "vocals"])
            .arg("--shifts")
            .arg(self.config.shifts.to_string())
            .arg("-o")
            .arg(stems_dir)
            .arg(input))
    }

    /// Where demucs places the isolated vocals for `input`.
    pub fn vocals_path(&self, input: &Path, stems_dir: &Path) -> PathBuf {
        let base = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        stems_dir
            .join(self.config.model.as_str())
            .join(base)
            .join("vocals.wav")
    }
}

impl Denoiser for Demucs {
    fn name(&self) -> &'static str {
        "demucs"
    }

    fn tool(&self) -> &'static str {
        "demucs"
    }

    fn apply(&self, input: &Path, output: &Path) -> WordlightResult<PathBuf> {
        let stems_dir = Self::stems_dir(output);
        if stems_dir.exists() {
            std::fs::remove_dir_all(&stems_dir)?;
        }

        self.command(input, &stems_dir)?.run()?;
        let vocals = expect_artifact("demucs", &self.vocals_path(input, &stems_dir))?;
        std::fs::rename(&vocals, output)?;

        if let Err(e) = std::fs::remove_dir_all(&stems_dir) {
            tracing::warn!(path = %stems_dir.display(), error = %e, "Failed to remove demucs stems");
        }
        Ok(output.to_path_buf())
    }
}

/// Enable/require switches for filters without further options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterToggle {
    pub enabled: bool,
    pub required: bool,
}

impl FilterToggle {
    pub const fn on() -> Self {
        Self {
            enabled: true,
            required: false,
        }
    }

    pub const fn off() -> Self {
        Self {
            enabled: false,
            required: false,
        }
    }
}

impl Default for FilterToggle {
    fn default() -> Self {
        Self::off()
    }
}

/// Spectral-gating noise reduction with the Python `noisereduce` package.
///
/// Runs as `python3 -c <script> <in> <out> <prop_decrease> <stationary>
/// <freq_mask_smooth_hz>`. Any exception exits non-zero, so the chain
/// carries the input forward.
const NOISEREDUCE_SCRIPT: &str = r#"import sys
import noisereduce as nr
import soundfile as sf
src, dst, prop, stationary, smooth = sys.argv[1:6]
data, rate = sf.read(src, dtype="float32")
smooth = int(smooth)
reduced = nr.reduce_noise(
    y=data.T if data.ndim > 1 else data,
    sr=rate,
    stationary=stationary == "1",
    prop_decrease=float(prop),
    freq_mask_smooth_hz=smooth if smooth > 0 else None,
)
sf.write(dst, reduced.T if reduced.ndim > 1 else reduced, rate)
"#;

/// Accepted `prop_decrease` range; values outside are clamped.
pub const PROP_DECREASE_RANGE: std::ops::RangeInclusive<f64> = 0.01..=1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseReduceConfig {
    pub enabled: bool,
    pub required: bool,
    /// Fraction of the estimated noise removed (0.01 light, 1.0 full).
    pub prop_decrease: f64,
    /// Assume a constant noise floor instead of tracking it over time.
    pub stationary: bool,
    /// Mask smoothing bandwidth; 0 disables smoothing.
    pub freq_mask_smooth_hz: u32,
}

impl Default for NoiseReduceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            required: false,
            prop_decrease: 0.75,
            stationary: false,
            freq_mask_smooth_hz: 500,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoiseReduce {
    config: NoiseReduceConfig,
}

impl NoiseReduce {
    pub fn new(config: NoiseReduceConfig) -> Self {
        Self { config }
    }

    /// `prop_decrease` clamped into [`PROP_DECREASE_RANGE`].
    pub fn prop_decrease(&self) -> WordlightResult<f64> {
        let value = self.config.prop_decrease;
        if !value.is_finite() {
            return Err(WordlightError::config(format!(
                "noisereduce prop_decrease must be a number, got {value}"
            )));
        }
        let clamped = value.clamp(*PROP_DECREASE_RANGE.start(), *PROP_DECREASE_RANGE.end());
        if clamped != value {
            tracing::debug!(requested = value, used = clamped, "Clamped noisereduce prop_decrease");
        }
        Ok(clamped)
    }

    pub fn command(&self, input: &Path, output: &Path) -> WordlightResult<ToolCommand> {
        let stationary = if self.config.stationary { "1" } else { "0" };
        Ok(ToolCommand::new("python3")
            .args(["-c", NOISEREDUCE_SCRIPT])
            .arg(input)
            .arg(output)
            .arg(self.prop_decrease()?.to_string())
            .arg(stationary)
            .arg(self.config.freq_mask_smooth_hz.to_string()))
    }
}

impl Denoiser for NoiseReduce {
    fn name(&self) -> &'static str {
        "noisereduce"
    }

    fn tool(&self) -> &'static str {
        "python3"
    }

    fn apply(&self, input: &Path, output: &Path) -> WordlightResult<PathBuf> {
        self.command(input, output)?.run_producing("noisereduce", output)
    }
}

/// Speech enhancement with the `deepFilter` CLI.
#[derive(Debug, Clone, Default)]
pub struct DeepFilterNet;

impl DeepFilterNet {
    fn out_dir(output: &Path) -> PathBuf {
        output.with_extension("deepfilter")
    }

    pub fn command(&self, input: &Path, out_dir: &Path) -> ToolCommand {
        ToolCommand::new("deepFilter").arg(input).arg("-o").arg(out_dir)
    }
}

/// The single WAV a tool wrote into `dir`.
fn find_wav(stage: &str, dir: &Path) -> WordlightResult<PathBuf> {
    let mut wavs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("wav"))
            .unwrap_or(false)
        {
            wavs.push(path);
        }
    }
    wavs.sort();
    wavs.into_iter()
        .next()
        .ok_or_else(|| WordlightError::missing_artifact(stage, dir.join("*.wav")))
}

impl Denoiser for DeepFilterNet {
    fn name(&self) -> &'static str {
        "deepfilternet"
    }

    fn tool(&self) -> &'static str {
        "deepFilter"
    }

    fn apply(&self, input: &Path, output: &Path) -> WordlightResult<PathBuf> {
        let out_dir = Self::out_dir(output);
        std::fs::create_dir_all(&out_dir)?;

        self.command(input, &out_dir).run()?;
        let enhanced = find_wav("deepfilternet", &out_dir)?;
        std::fs::rename(&enhanced, output)?;

        if let Err(e) = std::fs::remove_dir_all(&out_dir) {
            tracing::warn!(path = %out_dir.display(), error = %e, "Failed to remove DeepFilterNet output");
        }
        Ok(output.to_path_buf())
    }
}

/// RNNoise via the `denoise <in> <out>` CLI.
#[derive(Debug, Clone, Default)]
pub struct RnNoise;

impl RnNoise {
    pub fn command(&self, input: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new("denoise").arg(input).arg(output)
    }
}

impl Denoiser for RnNoise {
    fn name(&self) -> &'static str {
        "rnnoise"
    }

    fn tool(&self) -> &'static str {
        "denoise"
    }

    fn apply(&self, input: &Path, output: &Path) -> WordlightResult<PathBuf> {
        self.command(input, output).run_producing("rnnoise", output)
    }
}

/// VoiceFixer restoration mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoiceFixerMode {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "all")]
    All,
}

impl VoiceFixerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            VoiceFixerMode::Zero => "0",
            VoiceFixerMode::One => "1",
            VoiceFixerMode::Two => "2",
            VoiceFixerMode::All => "all",
        }
    }
}

impl FromStr for VoiceFixerMode {
    type Err = WordlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(VoiceFixerMode::Zero),
            "1" => Ok(VoiceFixerMode::One),
            "2" => Ok(VoiceFixerMode::Two),
            "all" => Ok(VoiceFixerMode::All),
            other => Err(WordlightError::config(format!(
                "VoiceFixer mode must be 0, 1, 2, or all, got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceFixerConfig {
    pub enabled: bool,
    pub required: bool,
    pub mode: VoiceFixerMode,
    pub use_cuda: bool,
}

impl Default for VoiceFixerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            required: false,
            mode: VoiceFixerMode::Two,
            use_cuda: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VoiceFixer {
    config: VoiceFixerConfig,
}

impl VoiceFixer {
    pub fn new(config: VoiceFixerConfig) -> Self {
        Self { config }
    }

    pub fn command(&self, input: &Path, output: &Path) -> ToolCommand {
        let cmd = ToolCommand::new("voicefixer")
            .arg("--infile")
            .arg(input)
            .arg("--outfile")
            .arg(output)
            .args(["--mode", self.config.mode.as_str()]);
        if self.config.use_cuda {
            cmd
        } else {
            cmd.arg("--disable-cuda")
        }
    }
}

impl Denoiser for VoiceFixer {
    fn name(&self) -> &'static str {
        "voicefixer"
    }

    fn tool(&self) -> &'static str {
        "voicefixer"
    }

    fn apply(&self, input: &Path, output: &Path) -> WordlightResult<PathBuf> {
        self.command(input, output)
            .run_producing("voicefixer", output)
    }
}

/// Accepted low-pass cutoff range in Hz.
pub const LOWPASS_RANGE_HZ: std::ops::RangeInclusive<u32> = 100..=20_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowPassConfig {
    pub enabled: bool,
    pub required: bool,
    pub cutoff_hz: u32,
}

impl Default for LowPassConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            required: false,
            cutoff_hz: 8000,
        }
    }
}

/// Fourth-order low-pass: ffmpeg's two-pole `lowpass` applied twice.
#[derive(Debug, Clone)]
pub struct LowPass {
    cutoff_hz: u32,
}

impl LowPass {
    pub fn new(cutoff_hz: u32) -> Self {
        Self { cutoff_hz }
    }

    pub fn command(&self, input: &Path, output: &Path) -> WordlightResult<ToolCommand> {
        if !LOWPASS_RANGE_HZ.contains(&self.cutoff_hz) {
            return Err(WordlightError::config(format!(
                "low-pass cutoff {} Hz is outside {}..={} Hz",
                self.cutoff_hz,
                LOWPASS_RANGE_HZ.start(),
                LOWPASS_RANGE_HZ.end()
            )));
        }
        let stage = format!("lowpass=f={}", self.cutoff_hz);
        Ok(ToolCommand::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-af")
            .arg(format!("{stage},{stage}"))
            .arg(output))
    }
}

impl Denoiser for LowPass {
    fn name(&self) -> &'static str {
        "lowpass"
    }

    fn tool(&self) -> &'static str {
        "ffmpeg"
    }

    fn apply(&self, input: &Path, output: &Path) -> WordlightResult<PathBuf> {
        self.command(input, output)?.run_producing("lowpass", output)
    }
}
