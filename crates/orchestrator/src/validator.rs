// Path: crates/orchestrator/src/validator.rs

//! The Topology Validator: a read-only readiness snapshot of a deployed chain.

use crate::cluster::ClusterApi;
use crate::planner::{relay_workload_name, PROBER_NAME};
use chainlink_types::error::ClusterError;

/// The phase a healthy prober reports.
pub const PROBER_READY_PHASE: &str = "Running";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadReadiness {
    pub name: String,
    pub desired: i32,
    pub ready: i32,
    pub is_ready: bool,
    /// Set when the status could not be read; the workload then counts as not ready.
    pub error: Option<ClusterError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProberReadiness {
    pub name: String,
    pub phase: Option<String>,
    pub is_ready: bool,
    pub error: Option<ClusterError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub workloads: Vec<WorkloadReadiness>,
    pub prober: ProberReadiness,
}

impl ValidationReport {
    pub fn workloads_ready(&self) -> bool {
        self.workloads.iter().all(|w| w.is_ready)
    }

    pub fn all_ready(&self) -> bool {
        self.workloads_ready() && self.prober.is_ready
    }
}

async fn check_workload(cluster: &dyn ClusterApi, namespace: &str, name: String) -> WorkloadReadiness {
    match cluster.workload_status(namespace, &name).await {
        Ok(status) => {
            let is_ready = status.is_ready();
            if !is_ready {
                tracing::warn!(target: "validator", "Deployment '{}' is not ready", name);
            }
            WorkloadReadiness {
                name,
                desired: status.desired,
                ready: status.ready,
                is_ready,
                error: None,
            }
        }
        Err(e) => {
            tracing::error!(
                target: "validator",
                "Error reading Deployment status for '{}': {}",
                name,
                e
            );
            WorkloadReadiness {
                name,
                desired: 0,
                ready: 0,
                is_ready: false,
                error: Some(e),
            }
        }
    }
}

async fn check_prober(cluster: &dyn ClusterApi, namespace: &str) -> ProberReadiness {
    let name = PROBER_NAME.to_string();
    match cluster.pod_phase(namespace, &name).await {
        Ok(phase) => {
            let is_ready = phase.as_deref() == Some(PROBER_READY_PHASE);
            if !is_ready {
                tracing::warn!(target: "validator", "Pod '{}' is not running", name);
            }
            ProberReadiness {
                name,
                phase,
                is_ready,
                error: None,
            }
        }
        Err(e) => {
            tracing::error!(target: "validator", "Error reading Pod status for '{}': {}", name, e);
            ProberReadiness {
                name,
                phase: None,
                is_ready: false,
                error: Some(e),
            }
        }
    }
}

/// Checks every relay workload and the prober. Read errors are folded into the
/// per-object entries, so this always returns a complete report.
pub async fn validate(
    chain_name: &str,
    instance_count: usize,
    namespace: &str,
    cluster: &dyn ClusterApi,
) -> ValidationReport {
    tracing::info!(target: "validator", "Validating deployments...");
    let mut workloads = Vec::with_capacity(instance_count);
    for i in 0..instance_count {
        workloads.push(check_workload(cluster, namespace, relay_workload_name(chain_name, i)).await);
    }

    if workloads.iter().all(|w| w.is_ready) {
        tracing::info!(target: "validator", "Deployments ready");
    } else {
        tracing::error!(target: "validator", "Deployments not ready");
    }

    tracing::info!(target: "validator", "Validating pods...");
    let report = ValidationReport {
        workloads,
        prober: check_prober(cluster, namespace).await,
    };
    if report.prober.is_ready {
        tracing::info!(target: "validator", "Pods ready");
    } else {
        tracing::error!(target: "validator", "Pods not ready");
    }
    if report.all_ready() {
        tracing::info!(target: "validator", "All objects ready");
    }
    report
}
