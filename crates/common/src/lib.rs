//! WordLight Common Utilities
//!
//! Shared infrastructure for all WordLight crates:
//! - Error types and result aliases
//! - Per-run context (run id, working directory, artifact naming)
//! - External tool invocation
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod process;
pub mod run;

pub use config::*;
pub use error::*;
pub use process::{command_exists, expect_artifact, require_file, ToolCommand, ToolOutput};
pub use run::*;
