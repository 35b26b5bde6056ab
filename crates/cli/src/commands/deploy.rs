// Path: crates/cli/src/commands/deploy.rs

use crate::config::CliConfig;
use anyhow::Result;
use chainlink_orchestrator::{apply, plan, KubeCluster};

/// Connects to the cluster, then plans and submits every object.
///
/// Missing cluster credentials are reported before the configuration is planned.
pub async fn run(config: &CliConfig) -> Result<()> {
    tracing::info!(target: "cli", "Deploying chain-link to Kubernetes cluster...");
    let cluster = KubeCluster::connect().await?;
    let plan = plan(&config.plan_spec())?;
    let report = apply(&plan, &cluster).await?;
    tracing::info!(
        target: "cli",
        "Deployment complete: {} created, {} already existed",
        report.created(),
        report.already_existed()
    );
    Ok(())
}
