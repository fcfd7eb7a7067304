//! Logging and tracing initialization.
//!
//! Logs go to stderr; stdout is reserved for command output such as the
//! `config` dump.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Crates whose events follow the configured level. Everything else is
/// held at `warn`.
const WORDLIGHT_TARGETS: &[&str] = &[
    "wordlight_common",
    "wordlight_caption_model",
    "wordlight_caption_core",
    "wordlight_audio_ai",
    "wordlight_render_engine",
    "wordlight_pipeline",
    "wordlight",
];

/// Filter directives for `level`, e.g. `warn,wordlight_common=info,...`.
pub fn default_directives(level: &str) -> String {
    let level = match level.trim() {
        "" => "info",
        other => other,
    };
    let mut directives = String::from("warn");
    for target in WORDLIGHT_TARGETS {
        directives.push(',');
        directives.push_str(target);
        directives.push('=');
        directives.push_str(level);
    }
    directives
}

/// Install the global subscriber.
///
/// `RUST_LOG` replaces the configured directives entirely when set. Calling
/// this twice is harmless; the second subscriber is discarded.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(&config.level)))
        .unwrap_or_else(|e| {
            eprintln!("invalid log level {:?} ({e}), using info", config.level);
            EnvFilter::new(default_directives("info"))
        });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.with_target(false).compact().try_init()
    };
    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}
