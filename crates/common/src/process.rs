//! External tool invocation.
//!
//! Every black-box collaborator (ffmpeg, ffprobe, demucs, whisper, ...) runs
//! through [`ToolCommand`]. The runner blocks until the process exits,
//! forwards stdout lines at `debug`, and drains stderr on a separate thread
//! so a chatty tool never stalls on a full pipe. On a non-zero exit the tail
//! of stderr is attached to the returned error.

use std::ffi::{OsStr, OsString};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{WordlightError, WordlightResult};

/// Lines of stderr kept in failure messages.
const STDERR_TAIL_LINES: usize = 20;

/// A fully built external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<OsString>,
}

/// Captured output of a successful run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Program name as resolved on `PATH`.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments rendered lossily, for logs and assertions.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Run to completion. Non-zero exit is an error.
    pub fn run(&self) -> WordlightResult<ToolOutput> {
        tracing::debug!(tool = %self.program, args = ?self.arg_strings(), "Running external tool");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    WordlightError::tool(&self.program, "executable not found on PATH")
                } else {
                    WordlightError::tool(&self.program, format!("failed to start: {e}"))
                }
            })?;

        tracing::info!(tool = %self.program, pid = child.id(), "Tool process started");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| WordlightError::tool(&self.program, "failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| WordlightError::tool(&self.program, "failed to capture stderr"))?;

        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = Vec::new();
            match reader.read_to_end(&mut output) {
                Ok(_) => String::from_utf8_lossy(&output).into_owned(),
                Err(err) => format!("<failed to read stderr: {err}>"),
            }
        });

        let stdout_result = self.collect_stdout(stdout);

        // Reap the child even when reading stdout failed.
        let status = child
            .wait()
            .map_err(|e| WordlightError::tool(&self.program, format!("failed to wait: {e}")))?;
        let stdout_text = stdout_result?;

        let stderr_text = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(WordlightError::tool(
                &self.program,
                format!("exited with {status}: {}", stderr_tail(&stderr_text)),
            ));
        }

        Ok(ToolOutput {
            stdout: stdout_text,
            stderr: stderr_text,
        })
    }

    /// Read `stdout` to EOF line by line, logging each line at `debug`.
    ///
    /// Lines that are not valid UTF-8 are converted lossily.
    fn collect_stdout(&self, stdout: impl Read) -> WordlightResult<String> {
        let mut stdout_text = String::new();
        let mut reader = BufReader::new(stdout);
        let mut line = Vec::new();
        loop {
            line.clear();
            let bytes = reader.read_until(b'\n', &mut line).map_err(|e| {
                WordlightError::tool(&self.program, format!("failed reading stdout: {e}"))
            })?;
            if bytes == 0 {
                break;
            }
            let text = String::from_utf8_lossy(&line);
            let trimmed = text.trim_end();
            if !trimmed.is_empty() {
                tracing::debug!(tool = %self.program, "{trimmed}");
            }
            stdout_text.push_str(&text);
        }
        Ok(stdout_text)
    }

    /// Run and require `output` to exist afterwards.
    pub fn run_producing(&self, stage: &str, output: &Path) -> WordlightResult<PathBuf> {
        self.run()?;
        expect_artifact(stage, output)
    }
}

/// Return `path` if it exists, otherwise a `MissingArtifact` error.
pub fn expect_artifact(stage: &str, path: &Path) -> WordlightResult<PathBuf> {
    if path.exists() {
        Ok(path.to_path_buf())
    } else {
        Err(WordlightError::missing_artifact(stage, path))
    }
}

/// Fail with `FileNotFound` unless `path` exists.
pub fn require_file(path: &Path) -> WordlightResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(WordlightError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Whether `binary` resolves on `PATH`.
pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_args() {
        let cmd = ToolCommand::new("ffmpeg")
            .arg("-y")
            .args(["-i", "in.mkv"])
            .arg(Path::new("out.wav"));
        assert_eq!(cmd.program(), "ffmpeg");
        assert_eq!(cmd.arg_strings(), vec!["-y", "-i", "in.mkv", "out.wav"]);
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let text: String = (0..50).map(|i| format!("line {i}\n")).collect();
        let tail = stderr_tail(&text);
        assert!(tail.starts_with("line 30"));
        assert!(tail.ends_with("line 49"));
    }

    #[test]
    fn test_missing_program_is_tool_error() {
        let err = ToolCommand::new("wordlight-definitely-not-installed")
            .run()
            .unwrap_err();
        match err {
            WordlightError::Tool { tool, message } => {
                assert_eq!(tool, "wordlight-definitely-not-installed");
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stdout_with_invalid_utf8_is_read_lossily() {
        let cmd = ToolCommand::new("test-tool");
        let raw: &[u8] = b"ok\n\xff\xfe bytes\nlast";
        let text = cmd.collect_stdout(raw).unwrap();
        assert_eq!(text, "ok\n\u{FFFD}\u{FFFD} bytes\nlast");
    }

    #[cfg(unix)]
    #[test]
    fn test_binary_stdout_does_not_fail_the_run() {
        let output = ToolCommand::new("sh")
            .args(["-c", "printf 'a\\377b\\n'"])
            .run()
            .unwrap();
        assert_eq!(output.stdout, "a\u{FFFD}b\n");
    }

    #[test]
    fn test_expect_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.wav");
        std::fs::write(&present, b"x").unwrap();
        assert_eq!(expect_artifact("extract", &present).unwrap(), present);

        let missing = dir.path().join("b.wav");
        assert!(matches!(
            expect_artifact("extract", &missing),
            Err(WordlightError::MissingArtifact { .. })
        ));
    }
}
