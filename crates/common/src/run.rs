//! Per-run context.
//!
//! Every pipeline invocation creates exactly one [`RunContext`]. The run id
//! is captured from the wall clock at creation and used to name every
//! artifact of the run, so two runs never share working files.

use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::WordlightResult;

/// Timestamp format used for run ids (`20260101_120000`).
const RUN_ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Working state scoped to a single pipeline run.
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: String,
    work_dir: PathBuf,
    output_dir: PathBuf,
    keep_intermediates: bool,
}

impl RunContext {
    /// Create a context anchored to the current wall-clock time and
    /// materialize its working and output directories.
    pub fn start(config: &AppConfig) -> WordlightResult<Self> {
        let run_id = chrono::Local::now().format(RUN_ID_FORMAT).to_string();
        Self::with_run_id(config, run_id)
    }

    /// Create a context with an explicit run id (for tests and re-runs).
    pub fn with_run_id(config: &AppConfig, run_id: impl Into<String>) -> WordlightResult<Self> {
        let run_id = run_id.into();
        let work_dir = config.work_root().join(format!(".wordlight-{run_id}"));
        std::fs::create_dir_all(&work_dir)?;
        std::fs::create_dir_all(&config.output_dir)?;

        tracing::debug!(
            run_id = %run_id,
            work_dir = %work_dir.display(),
            "Run context created"
        );

        Ok(Self {
            run_id,
            work_dir,
            output_dir: config.output_dir.clone(),
            keep_intermediates: config.keep_intermediates,
        })
    }

    /// Identifier shared by every artifact of this run.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Directory holding intermediate files for this run.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Directory receiving the final output.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of a named intermediate artifact inside the work directory.
    pub fn artifact(&self, file_name: &str) -> PathBuf {
        self.work_dir.join(file_name)
    }

    /// Final output path for a given input video:
    /// `<output_dir>/<stem>_Completed_<run_id>.mkv`.
    pub fn final_output_path(&self, input_video: &Path) -> PathBuf {
        let stem = input_video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        self.output_dir
            .join(format!("{stem}_Completed_{}.mkv", self.run_id))
    }

    /// Remove the work directory unless intermediates are kept.
    pub fn cleanup(&self) {
        if self.keep_intermediates {
            tracing::info!(work_dir = %self.work_dir.display(), "Keeping intermediate files");
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.work_dir) {
            tracing::warn!(
                error = %e,
                work_dir = %self.work_dir.display(),
                "Failed to remove work directory"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> AppConfig {
        AppConfig {
            output_dir: dir.join("out"),
            ..Default::default()
        }
    }

    #[test]
    fn test_artifacts_are_scoped_to_run() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::with_run_id(&config_in(dir.path()), "20260101_120000").unwrap();

        assert!(ctx.work_dir().exists());
        assert!(ctx.output_dir().exists());
        assert_eq!(
            ctx.artifact("extracted.wav"),
            dir.path()
                .join("out")
                .join(".wordlight-20260101_120000")
                .join("extracted.wav")
        );
    }

    #[test]
    fn test_final_output_name_uses_stem_and_run_id() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::with_run_id(&config_in(dir.path()), "20260101_120000").unwrap();
        let out = ctx.final_output_path(Path::new("/videos/talk.mp4"));
        assert_eq!(
            out.file_name().unwrap().to_str().unwrap(),
            "talk_Completed_20260101_120000.mkv"
        );
    }

    #[test]
    fn test_cleanup_respects_keep_flag() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.keep_intermediates = true;
        let kept = RunContext::with_run_id(&config, "a").unwrap();
        kept.cleanup();
        assert!(kept.work_dir().exists());

        config.keep_intermediates = false;
        let removed = RunContext::with_run_id(&config, "b").unwrap();
        std::fs::write(removed.artifact("x.wav"), b"x").unwrap();
        removed.cleanup();
        assert!(!removed.work_dir().exists());
    }

    #[test]
    fn test_start_uses_timestamp_run_id() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::start(&config_in(dir.path())).unwrap();
        assert_eq!(ctx.run_id().len(), 15);
        assert_eq!(&ctx.run_id()[8..9], "_");
    }
}
