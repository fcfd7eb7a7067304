//! Video re-encoding: processed-audio remux and caption burn-in.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wordlight_common::error::{WordlightError, WordlightResult};
use wordlight_common::process::{require_file, ToolCommand};

/// Highest QP accepted by the H.264/HEVC encoders.
pub const MAX_QP: u32 = 51;

/// Encoder settings shared by every re-encoding stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// ffmpeg video encoder name.
    pub video_codec: String,

    /// Constant quantizer (0 = best, 51 = worst).
    pub qp: u32,

    pub audio_bitrate_kbps: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            video_codec: "hevc_nvenc".to_string(),
            qp: 30,
            audio_bitrate_kbps: 320,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> WordlightResult<()> {
        let codec = self.video_codec.trim();
        if codec.is_empty() {
            return Err(WordlightError::config("video codec must not be empty"));
        }
        if codec.contains(char::is_whitespace) {
            return Err(WordlightError::config(format!(
                "video codec {codec:?} must be a single encoder name"
            )));
        }
        if self.qp > MAX_QP {
            return Err(WordlightError::config(format!(
                "qp {} exceeds the maximum of {MAX_QP}",
                self.qp
            )));
        }
        if self.audio_bitrate_kbps == 0 {
            return Err(WordlightError::config("audio bitrate must be positive"));
        }
        Ok(())
    }

    /// `-c:v` plus constant-QP rate control.
    ///
    /// NVENC encoders need `-rc constqp` before `-qp` takes effect.
    pub fn video_args(&self) -> Vec<String> {
        let codec = self.video_codec.trim().to_string();
        let mut args = vec!["-c:v".to_string(), codec.clone()];
        if codec.ends_with("_nvenc") {
            args.push("-rc".to_string());
            args.push("constqp".to_string());
        }
        args.push("-qp".to_string());
        args.push(self.qp.to_string());
        args
    }

    pub fn audio_bitrate(&self) -> String {
        format!("{}k", self.audio_bitrate_kbps)
    }
}

/// Quote a path as an ffmpeg filter option value, e.g. `filename=<value>`.
///
/// ffmpeg unescapes twice: the filtergraph parser first, then the filter's
/// option parser. The option level gets `\:` and `\'`; the graph level is
/// single-quoted so `,;[]` pass through. Backslashes become forward
/// slashes.
pub fn escape_filter_path(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let mut option_value = String::with_capacity(normalized.len() + 8);
    for ch in normalized.chars() {
        if matches!(ch, ':' | '\'') {
            option_value.push('\\');
        }
        option_value.push(ch);
    }
    // A literal quote closes the quoting, is escaped, and reopens it.
    format!("'{}'", option_value.replace('\'', r"'\''"))
}

/// Replace a video's audio track with processed audio.
#[derive(Debug, Clone)]
pub struct RemuxJob {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
    /// Output frame rate, normally the source's.
    pub frame_rate: f64,
}

impl RemuxJob {
    pub fn command(&self, config: &RenderConfig) -> WordlightResult<ToolCommand> {
        config.validate()?;
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(WordlightError::render(format!(
                "invalid frame rate {}",
                self.frame_rate
            )));
        }

        Ok(ToolCommand::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(&self.video)
            .arg("-i")
            .arg(&self.audio)
            .args(["-map", "0:v:0", "-map", "1:a:0"])
            .args(config.video_args())
            .arg("-r")
            .arg(self.frame_rate.to_string())
            .args(["-pix_fmt", "yuv420p", "-c:a", "aac", "-b:a"])
            .arg(config.audio_bitrate())
            .arg("-shortest")
            .arg(&self.output))
    }

    pub fn run(&self, config: &RenderConfig) -> WordlightResult<PathBuf> {
        require_file(&self.video)?;
        require_file(&self.audio)?;
        tracing::info!(
            video = %self.video.display(),
            audio = %self.audio.display(),
            fps = self.frame_rate,
            "Re-encoding video with processed audio"
        );
        self.command(config)?.run_producing("remux", &self.output)
    }
}

/// Burn an ASS subtitle track into the video.
#[derive(Debug, Clone)]
pub struct BurnJob {
    pub video: PathBuf,
    pub subtitles: PathBuf,
    pub output: PathBuf,
}

impl BurnJob {
    pub fn command(&self, config: &RenderConfig) -> WordlightResult<ToolCommand> {
        config.validate()?;
        Ok(ToolCommand::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(&self.video)
            .arg("-vf")
            .arg(format!("ass=filename={}", escape_filter_path(&self.subtitles)))
            .args(config.video_args())
            .args(["-c:a", "copy"])
            .arg(&self.output))
    }

    pub fn run(&self, config: &RenderConfig) -> WordlightResult<PathBuf> {
        require_file(&self.video)?;
        require_file(&self.subtitles)?;
        tracing::info!(
            video = %self.video.display(),
            subtitles = %self.subtitles.display(),
            output = %self.output.display(),
            "Burning captions"
        );
        self.command(config)?.run_producing("caption burn", &self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ffmpeg's `av_get_token`: backslash escapes one char, single quotes
    /// quote literally, and `term` ends the token outside quotes.
    fn get_token<'a>(input: &'a str, term: &[char]) -> (String, &'a str) {
        let mut out = String::new();
        let mut chars = input.char_indices();
        while let Some((i, c)) = chars.next() {
            if term.contains(&c) {
                return (out, &input[i..]);
            }
            match c {
                '\\' => {
                    if let Some((_, next)) = chars.next() {
                        out.push(next);
                    }
                }
                '\'' => {
                    for (_, quoted) in chars.by_ref() {
                        if quoted == '\'' {
                            break;
                        }
                        out.push(quoted);
                    }
                }
                _ => out.push(c),
            }
        }
        (out, "")
    }

    /// Decode `ass=filename=<value>` the way ffmpeg does.
    fn decode_ass_filename(filter: &str) -> String {
        let args = filter.strip_prefix("ass=").unwrap();
        let (options, rest) = get_token(args, &['[', ']', ',', ';']);
        assert_eq!(rest, "", "filtergraph split inside {filter}");
        let value = options.strip_prefix("filename=").unwrap();
        let (path, rest) = get_token(value, &[':']);
        assert_eq!(rest, "", "option list split inside {options}");
        path
    }

    #[test]
    fn test_escape_filter_path() {
        assert_eq!(
            escape_filter_path(Path::new("/tmp/run/captions.ass")),
            "'/tmp/run/captions.ass'"
        );
        assert_eq!(
            escape_filter_path(Path::new(r"C:\Users\me\caps [v2].ass")),
            r"'C\:/Users/me/caps [v2].ass'"
        );
        assert_eq!(
            escape_filter_path(Path::new("/a/it's,here;.ass")),
            r"'/a/it\'\''s,here;.ass'"
        );
    }

    #[test]
    fn test_escaped_path_survives_both_ffmpeg_parsers() {
        for raw in [
            "/tmp/run/captions.ass",
            r"C:\Users\me\caps [v2].ass",
            "/a/it's,here;.ass",
            "/odd/a:b'c[d]e,f;g.ass",
        ] {
            let filter = format!("ass=filename={}", escape_filter_path(Path::new(raw)));
            assert_eq!(decode_ass_filename(&filter), raw.replace('\\', "/"), "{filter}");
        }
    }

    #[test]
    fn test_nvenc_gets_constqp() {
        let config = RenderConfig::default();
        assert_eq!(
            config.video_args(),
            vec!["-c:v", "hevc_nvenc", "-rc", "constqp", "-qp", "30"]
        );

        let config = RenderConfig {
            video_codec: "libx264".to_string(),
            qp: 18,
            ..Default::default()
        };
        assert_eq!(config.video_args(), vec!["-c:v", "libx264", "-qp", "18"]);
    }

    #[test]
    fn test_validation() {
        assert!(RenderConfig::default().validate().is_ok());

        let bad_qp = RenderConfig {
            qp: 52,
            ..Default::default()
        };
        assert!(bad_qp.validate().is_err());

        let bad_codec = RenderConfig {
            video_codec: "  ".to_string(),
            ..Default::default()
        };
        assert!(bad_codec.validate().is_err());

        let injected = RenderConfig {
            video_codec: "libx264 -vf x".to_string(),
            ..Default::default()
        };
        assert!(injected.validate().is_err());
    }

    #[test]
    fn test_remux_command() {
        let job = RemuxJob {
            video: "in.mp4".into(),
            audio: "clean.wav".into(),
            output: "remux.mkv".into(),
            frame_rate: 29.97,
        };
        let cmd = job.command(&RenderConfig::default()).unwrap();
        assert_eq!(cmd.program(), "ffmpeg");
        assert_eq!(
            cmd.arg_strings(),
            vec![
                "-y", "-i", "in.mp4", "-i", "clean.wav", "-map", "0:v:0", "-map", "1:a:0",
                "-c:v", "hevc_nvenc", "-rc", "constqp", "-qp", "30", "-r", "29.97",
                "-pix_fmt", "yuv420p", "-c:a", "aac", "-b:a", "320k", "-shortest",
                "remux.mkv"
            ]
        );
    }

    #[test]
    fn test_remux_rejects_bad_frame_rate() {
        let job = RemuxJob {
            video: "in.mp4".into(),
            audio: "clean.wav".into(),
            output: "remux.mkv".into(),
            frame_rate: 0.0,
        };
        assert!(job.command(&RenderConfig::default()).is_err());
    }

    #[test]
    fn test_burn_command() {
        let job = BurnJob {
            video: "music.mkv".into(),
            subtitles: "/work/captions.ass".into(),
            output: "final.mkv".into(),
        };
        let cmd = job.command(&RenderConfig::default()).unwrap();
        assert_eq!(
            cmd.arg_strings(),
            vec![
                "-y", "-i", "music.mkv", "-vf", "ass=filename='/work/captions.ass'", "-c:v",
                "hevc_nvenc", "-rc", "constqp", "-qp", "30", "-c:a", "copy", "final.mkv"
            ]
        );
    }

    #[test]
    fn test_run_requires_inputs() {
        let job = BurnJob {
            video: "/nonexistent/music.mkv".into(),
            subtitles: "/nonexistent/captions.ass".into(),
            output: "/nonexistent/final.mkv".into(),
        };
        assert!(matches!(
            job.run(&RenderConfig::default()),
            Err(WordlightError::FileNotFound { .. })
        ));
    }
}
