//! Human-in-the-loop transcript editing checkpoint.

use std::io::{BufRead, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus};

use wordlight_caption_model::transcript_edit::{merge_edited_lines, render_edit_lines, EditMerge};
use wordlight_caption_model::word::Word;
use wordlight_common::error::{WordlightError, WordlightResult};

/// Something that lets a person revise the edit file in place.
pub trait TranscriptEditor: Send + Sync {
    /// Block until the file at `path` has been edited.
    fn edit(&self, path: &Path) -> WordlightResult<()>;
}

/// Opens the file for the operator.
///
/// With `$VISUAL` or `$EDITOR` set the editor runs in the foreground and
/// the checkpoint ends when it exits. Otherwise the platform opener
/// (`xdg-open` / `open`) launches and the operator confirms with Enter.
#[derive(Debug, Clone, Default)]
pub struct InteractiveEditor;

impl InteractiveEditor {
    fn configured_editor() -> Option<Vec<String>> {
        ["VISUAL", "EDITOR"]
            .into_iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|value| {
                value
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .find(|parts| !parts.is_empty())
    }

    fn opener() -> &'static str {
        if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        }
    }
}

impl TranscriptEditor for InteractiveEditor {
    fn edit(&self, path: &Path) -> WordlightResult<()> {
        if let Some(parts) = Self::configured_editor() {
            let (program, args) = parts.split_at(1);
            tracing::info!(editor = %program[0], path = %path.display(), "Opening transcript in editor");
            let status = Command::new(&program[0]).args(args).arg(path).status()?;
            if !status.success() {
                return Err(WordlightError::tool(
                    &program[0],
                    format!("editor exited with {status}"),
                ));
            }
            return Ok(());
        }

        let opener = Self::opener();
        tracing::info!(opener, path = %path.display(), "Opening transcript for editing");
        let mut child = match Command::new(opener).arg(path).spawn() {
            Ok(child) => Some(child),
            Err(e) => {
                tracing::warn!(opener, error = %e, "Could not launch opener; edit the file manually");
                None
            }
        };

        println!("Transcript: {}", path.display());
        print!("Edit the file and save. Press Enter when done...");
        std::io::stdout().flush()?;
        let mut line = String::new();
        let confirmed = std::io::stdin().lock().read_line(&mut line);

        if let Some(child) = child.as_mut() {
            reap_opener(opener, child);
        }
        confirmed?;
        Ok(())
    }
}

/// Wait for a launched opener so it does not linger as a zombie.
///
/// Openers usually hand off to a desktop application and exit at once, so
/// this rarely blocks. A failed exit is only logged.
fn reap_opener(opener: &str, child: &mut Child) -> Option<ExitStatus> {
    match child.wait() {
        Ok(status) => {
            if !status.success() {
                tracing::debug!(opener, %status, "Opener exited unsuccessfully");
            }
            Some(status)
        }
        Err(e) => {
            tracing::warn!(opener, error = %e, "Failed to wait for opener");
            None
        }
    }
}

/// Write `words` to `path`, hand it to `editor`, and merge the result.
pub fn edit_words(
    words: &[Word],
    path: &Path,
    editor: &dyn TranscriptEditor,
) -> WordlightResult<EditMerge> {
    std::fs::write(path, render_edit_lines(words))?;
    editor.edit(path)?;
    let edited = std::fs::read_to_string(path)?;
    let merge = merge_edited_lines(words, &edited);

    tracing::info!(
        original = words.len(),
        kept = merge.words.len(),
        dropped = merge.dropped.len(),
        "Merged edited transcript"
    );
    Ok(merge)
}
