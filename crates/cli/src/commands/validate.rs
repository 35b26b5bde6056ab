// Path: crates/cli/src/commands/validate.rs

use crate::config::CliConfig;
use anyhow::Result;
use chainlink_orchestrator::{validate, KubeCluster};
use chainlink_types::config::DEFAULT_CHAIN_NAME;

/// Not-ready objects are reported through the log, not as an error.
pub async fn run(config: &CliConfig) -> Result<()> {
    tracing::info!(target: "cli", "Validating chain-link configuration...");
    let cluster = KubeCluster::connect().await?;
    validate(DEFAULT_CHAIN_NAME, config.instances, &config.namespace, &cluster).await;
    Ok(())
}
