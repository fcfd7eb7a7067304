//! Show or persist the effective configuration.

use std::path::PathBuf;

use wordlight_common::config::config_file_path;
use wordlight_pipeline::PipelineConfig;

pub fn run(config: &PipelineConfig, path: Option<PathBuf>, write: bool) -> anyhow::Result<()> {
    if write {
        let path = path.unwrap_or_else(config_file_path);
        config
            .save(&path)
            .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
