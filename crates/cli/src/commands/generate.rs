// Path: crates/cli/src/commands/generate.rs

use crate::config::{CliConfig, DEFAULT_OUTPUT_DIR};
use anyhow::Result;
use chainlink_orchestrator::plan;
use chainlink_orchestrator::render::{expand_home, write_manifests};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Directory to output the kubernetes yaml.
    #[clap(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_directory: String,
}

/// Renders the plan to disk. Needs no cluster access.
pub fn run(config: &CliConfig, args: &GenerateArgs) -> Result<Vec<PathBuf>> {
    tracing::info!(target: "cli", "Generating chain-link kubernetes yaml...");
    let plan = plan(&config.plan_spec())?;
    let dir = expand_home(&args.output_directory);
    let written = write_manifests(&plan, &dir)?;
    tracing::info!(
        target: "cli",
        "Wrote {} manifests to {}",
        written.len(),
        dir.display()
    );
    Ok(written)
}
