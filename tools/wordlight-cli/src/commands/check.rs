//! Check external tool availability.

use wordlight_common::process::command_exists;
use wordlight_pipeline::{Pipeline, PipelineConfig};

pub fn run(config: &PipelineConfig) -> anyhow::Result<()> {
    println!("WordLight System Check");
    println!("{}", "=".repeat(50));

    let pipeline = Pipeline::new(config.clone())
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let mut all_required_ok = true;
    for tool in pipeline.required_tools() {
        if command_exists(tool) {
            println!("[OK]   {tool}");
        } else {
            println!("[FAIL] {tool} (required, not found on PATH)");
            all_required_ok = false;
        }
    }

    let denoise_tools = pipeline.denoise_tools();
    if !denoise_tools.is_empty() {
        println!();
        println!("Denoise stages:");
        for tool in denoise_tools {
            if command_exists(tool) {
                println!("[OK]   {tool}");
            } else {
                println!("[WARN] {tool} (not found on PATH)");
            }
        }
    }

    println!();
    if all_required_ok {
        println!("All required tools are available. WordLight is ready.");
    } else {
        println!("Some required tools are missing. Install them and re-run the check.");
    }

    Ok(())
}
