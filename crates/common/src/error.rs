//! Error types shared across WordLight crates.

use std::path::PathBuf;

/// Top-level error type for WordLight operations.
#[derive(Debug, thiserror::Error)]
pub enum WordlightError {
    #[error("Audio extraction error: {message}")]
    Extraction { message: String },

    #[error("Denoise error: {message}")]
    Denoise { message: String },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    #[error("{stage} did not produce expected output: {path}")]
    MissingArtifact { stage: String, path: PathBuf },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using WordlightError.
pub type WordlightResult<T> = Result<T, WordlightError>;

impl WordlightError {
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction {
            message: msg.into(),
        }
    }

    pub fn denoise(msg: impl Into<String>) -> Self {
        Self::Denoise {
            message: msg.into(),
        }
    }

    pub fn transcription(msg: impl Into<String>) -> Self {
        Self::Transcription {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn tool(tool: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: msg.into(),
        }
    }

    pub fn missing_artifact(stage: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingArtifact {
            stage: stage.into(),
            path: path.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
