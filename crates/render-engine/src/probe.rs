//! Media probing via ffprobe JSON output.

use std::path::Path;

use serde::Deserialize;
use wordlight_common::error::{WordlightError, WordlightResult};
use wordlight_common::process::{require_file, ToolCommand};

/// Frame rate used when the source does not report a usable one.
pub const FALLBACK_FRAME_RATE: f64 = 30.0;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

fn ffprobe(entries: &str, video_stream: bool, path: &Path) -> ToolCommand {
    let mut cmd = ToolCommand::new("ffprobe").args(["-v", "error"]);
    if video_stream {
        cmd = cmd.args(["-select_streams", "v:0"]);
    }
    cmd.args(["-show_entries", entries, "-of", "json"]).arg(path)
}

fn run_probe(entries: &str, video_stream: bool, path: &Path) -> WordlightResult<ProbeOutput> {
    require_file(path)?;
    let output = ffprobe(entries, video_stream, path).run()?;
    parse_probe(&output.stdout)
}

fn parse_probe(json: &str) -> WordlightResult<ProbeOutput> {
    serde_json::from_str(json)
        .map_err(|e| WordlightError::tool("ffprobe", format!("unreadable JSON output: {e}")))
}

/// Parse an ffprobe rational such as `30000/1001`.
///
/// A zero denominator or non-positive result yields `None`.
pub fn parse_rational(raw: &str) -> Option<f64> {
    let (num, den) = match raw.split_once('/') {
        Some((num, den)) => (num.trim().parse::<f64>().ok()?, den.trim().parse::<f64>().ok()?),
        None => (raw.trim().parse::<f64>().ok()?, 1.0),
    };
    if den == 0.0 {
        return None;
    }
    let rate = num / den;
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

/// Frame rate of the first video stream, or [`FALLBACK_FRAME_RATE`].
pub fn probe_frame_rate(path: &Path) -> WordlightResult<f64> {
    let probe = run_probe("stream=r_frame_rate", true, path)?;
    Ok(frame_rate_from(&probe, path))
}

fn frame_rate_from(probe: &ProbeOutput, path: &Path) -> f64 {
    let rate = probe
        .streams
        .first()
        .and_then(|s| s.r_frame_rate.as_deref())
        .and_then(parse_rational);
    match rate {
        Some(rate) => rate,
        None => {
            tracing::warn!(
                path = %path.display(),
                fallback = FALLBACK_FRAME_RATE,
                "No usable frame rate reported, using fallback"
            );
            FALLBACK_FRAME_RATE
        }
    }
}

/// Pixel dimensions of the first video stream.
pub fn probe_resolution(path: &Path) -> WordlightResult<(u32, u32)> {
    let probe = run_probe("stream=width,height", true, path)?;
    resolution_from(&probe).ok_or_else(|| {
        WordlightError::tool(
            "ffprobe",
            format!("no video dimensions reported for {}", path.display()),
        )
    })
}

fn resolution_from(probe: &ProbeOutput) -> Option<(u32, u32)> {
    let stream = probe.streams.first()?;
    match (stream.width?, stream.height?) {
        (0, _) | (_, 0) => None,
        dims => Some(dims),
    }
}

/// Container duration in seconds, `None` when unknown.
pub fn probe_duration(path: &Path) -> WordlightResult<Option<f64>> {
    let probe = run_probe("format=duration", false, path)?;
    Ok(duration_from(&probe))
}

fn duration_from(probe: &ProbeOutput) -> Option<f64> {
    probe
        .format
        .as_ref()?
        .duration
        .as_deref()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}
