//! WordLight CLI: command-line interface for the post-production pipeline.
//!
//! Usage:
//!   wordlight process <VIDEO>      Clean, trim, caption, and burn a video
//!   wordlight captions <WORDS>     Render an ASS file from a words.json
//!   wordlight check                Check external tool availability
//!   wordlight config               Show (or write) the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "wordlight",
    about = "Talking-head post-production with word-by-word captions",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the per-user config location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on a video
    Process {
        /// Input video
        video: PathBuf,

        /// Background music track to mix under the speech
        #[arg(long)]
        music: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the silence-removal stage
        #[arg(long)]
        bypass_silence_removal: bool,

        /// Pause after transcription to correct the words
        #[arg(long)]
        edit_transcript: bool,

        /// Caption font name
        #[arg(long)]
        font: Option<String>,

        /// Caption font size
        #[arg(long)]
        font_size: Option<u32>,

        /// Vertical caption margin in pixels
        #[arg(long)]
        margin_v: Option<u32>,

        /// Caption text color (#RRGGBB or rgb(...))
        #[arg(long)]
        primary_color: Option<String>,

        /// Color of the word being spoken
        #[arg(long)]
        highlight_color: Option<String>,

        /// Maximum sentences per caption
        #[arg(long)]
        max_sentences: Option<usize>,

        /// Maximum words per caption
        #[arg(long)]
        max_words: Option<usize>,

        /// Gap in seconds that forces a new caption
        #[arg(long)]
        max_gap: Option<f64>,

        /// Video encoder (e.g. hevc_nvenc, libx264)
        #[arg(long)]
        codec: Option<String>,

        /// Constant quantizer
        #[arg(long)]
        qp: Option<u32>,

        /// Keep the work directory after the run
        #[arg(long)]
        keep_intermediates: bool,
    },

    /// Render captions from a word-level transcript
    Captions {
        /// Path to a words.json transcript
        words: PathBuf,

        /// Video width
        #[arg(long, default_value = "1920")]
        width: u32,

        /// Video height
        #[arg(long, default_value = "1080")]
        height: u32,

        /// Output .ass path (defaults next to the transcript)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check external tool availability
    Check,

    /// Show the effective configuration
    Config {
        /// Write it to the config file location
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = wordlight_pipeline::PipelineConfig::load(cli.config.as_deref());

    // Initialize logging
    let mut logging = config.general.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    wordlight_common::logging::init_logging(&logging);
    tracing::debug!(config = ?cli.config, level = %logging.level, "Configuration loaded");

    match cli.command {
        Commands::Process {
            video,
            music,
            output,
            bypass_silence_removal,
            edit_transcript,
            font,
            font_size,
            margin_v,
            primary_color,
            highlight_color,
            max_sentences,
            max_words,
            max_gap,
            codec,
            qp,
            keep_intermediates,
        } => {
            let overrides = commands::process::Overrides {
                output,
                bypass_silence_removal,
                edit_transcript,
                font,
                font_size,
                margin_v,
                primary_color,
                highlight_color,
                max_sentences,
                max_words,
                max_gap,
                codec,
                qp,
                keep_intermediates,
            };
            commands::process::run(config, video, music, overrides).await
        }
        Commands::Captions {
            words,
            width,
            height,
            output,
        } => commands::captions::run(&config, words, width, height, output),
        Commands::Check => commands::check::run(&config),
        Commands::Config { write } => commands::config::run(&config, cli.config, write),
    }
}
