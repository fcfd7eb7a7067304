//! Word-level transcription data.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A single spoken word with its timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds (`end >= start`).
    pub end: f64,
    /// Spoken text, possibly with trailing punctuation.
    #[serde(alias = "word")]
    pub text: String,
}

impl Word {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the text ends a sentence (`.`, `?` or `!` as its final
    /// non-whitespace character).
    pub fn ends_sentence(&self) -> bool {
        matches!(self.text.trim_end().chars().last(), Some('.' | '?' | '!'))
    }
}

/// An ordered word sequence for one media file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Language reported by the transcriber, if any.
    #[serde(default)]
    pub language: Option<String>,

    /// Words in document order.
    pub words: Vec<Word>,
}

impl Transcript {
    pub fn new(words: Vec<Word>) -> Self {
        Self {
            language: None,
            words,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Load a transcript from JSON.
    ///
    /// Accepts either `{"words": [...]}` or a bare array of words.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TranscriptError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TranscriptError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let parsed = match serde_json::from_str::<Transcript>(&content) {
            Ok(transcript) => transcript,
            Err(_) => serde_json::from_str::<Vec<Word>>(&content)
                .map(Transcript::new)
                .map_err(|e| TranscriptError::ParseError {
                    path: path.to_path_buf(),
                    source: e,
                })?,
        };

        parsed.validate()?;
        Ok(parsed)
    }

    /// Save the transcript as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TranscriptError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|e| TranscriptError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| TranscriptError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Check timing invariants on every word.
    pub fn validate(&self) -> Result<(), TranscriptError> {
        for (index, word) in self.words.iter().enumerate() {
            if !word.start.is_finite() || !word.end.is_finite() {
                return Err(TranscriptError::ValidationError {
                    message: format!("word {index} has a non-finite timestamp"),
                });
            }
            if word.end < word.start {
                return Err(TranscriptError::ValidationError {
                    message: format!(
                        "word {index} ({:?}) ends at {} before it starts at {}",
                        word.text, word.end, word.start
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Errors reading or validating transcripts.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid transcript: {message}")]
    ValidationError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_terminators() {
        assert!(Word::new(0.0, 1.0, "Hello.").ends_sentence());
        assert!(Word::new(0.0, 1.0, "Really?!").ends_sentence());
        assert!(Word::new(0.0, 1.0, "Stop! ").ends_sentence());
        assert!(!Word::new(0.0, 1.0, "e.g").ends_sentence());
        assert!(!Word::new(0.0, 1.0, "well,").ends_sentence());
        assert!(!Word::new(0.0, 1.0, "").ends_sentence());
    }

    #[test]
    fn test_word_accepts_whisper_field_name() {
        let word: Word = serde_json::from_str(r#"{"start":0.5,"end":0.9,"word":"hi"}"#).unwrap();
        assert_eq!(word, Word::new(0.5, 0.9, "hi"));
    }

    #[test]
    fn test_load_bare_array_and_object() {
        let dir = tempfile::tempdir().unwrap();

        let bare = dir.path().join("bare.json");
        std::fs::write(&bare, r#"[{"start":0,"end":1,"text":"one"}]"#).unwrap();
        assert_eq!(Transcript::load(&bare).unwrap().words.len(), 1);

        let object = dir.path().join("object.json");
        std::fs::write(
            &object,
            r#"{"language":"en","words":[{"start":0,"end":1,"text":"one"},{"start":1,"end":2,"text":"two"}]}"#,
        )
        .unwrap();
        let transcript = Transcript::load(&object).unwrap();
        assert_eq!(transcript.language.as_deref(), Some("en"));
        assert_eq!(transcript.words.len(), 2);
    }

    #[test]
    fn test_load_rejects_reversed_word() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"[{"start":2,"end":1,"text":"oops"}]"#).unwrap();
        assert!(matches!(
            Transcript::load(&path),
            Err(TranscriptError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        let transcript = Transcript::new(vec![Word::new(0.0, 0.4, "Hi."), Word::new(0.5, 1.0, "Yo")]);
        transcript.save(&path).unwrap();
        assert_eq!(Transcript::load(&path).unwrap(), transcript);
    }
}
