// Path: crates/orchestrator/src/executor.rs

//! The Deployment Executor: submits a plan's objects in order.
//!
//! Creation is idempotent at the object level. An object that already exists is
//! logged and skipped; it is never compared against the plan or updated. Any
//! other control-plane error aborts the run, leaving earlier objects in place.

use crate::cluster::ClusterApi;
use crate::objects::ObjectKind;
use crate::planner::TopologyPlan;
use chainlink_types::error::{ClusterError, OrchestratorError};

/// What happened to one object during an apply run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created,
    AlreadyExisted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedObject {
    pub kind: ObjectKind,
    pub name: String,
    pub outcome: ApplyOutcome,
}

/// The per-object record of a successful apply run, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub objects: Vec<AppliedObject>,
}

impl ApplyReport {
    pub fn created(&self) -> usize {
        self.count(ApplyOutcome::Created)
    }

    pub fn already_existed(&self) -> usize {
        self.count(ApplyOutcome::AlreadyExisted)
    }

    fn count(&self, outcome: ApplyOutcome) -> usize {
        self.objects.iter().filter(|o| o.outcome == outcome).count()
    }
}

/// Submits every object of `plan` to `cluster`, stopping at the first error
/// that is not "already exists".
pub async fn apply(
    plan: &TopologyPlan,
    cluster: &dyn ClusterApi,
) -> Result<ApplyReport, OrchestratorError> {
    let namespace = &plan.spec().namespace;
    let mut report = ApplyReport::default();

    for object in plan.objects() {
        let kind = object.kind();
        let name = object.name();
        let outcome = match cluster.create(object).await {
            Ok(()) => {
                tracing::info!(
                    target: "executor",
                    "Created {} '{}' in namespace '{}'",
                    kind,
                    name,
                    namespace
                );
                ApplyOutcome::Created
            }
            Err(ClusterError::AlreadyExists { .. }) => {
                tracing::warn!(
                    target: "executor",
                    "{} {} already exists in namespace {}",
                    kind,
                    name,
                    namespace
                );
                ApplyOutcome::AlreadyExisted
            }
            Err(source) => {
                return Err(OrchestratorError::ObjectCreationFailed {
                    kind: kind.as_str(),
                    name: name.to_string(),
                    source,
                })
            }
        };
        report.objects.push(AppliedObject {
            kind,
            name: name.to_string(),
            outcome,
        });
    }

    tracing::info!(
        target: "executor",
        created = report.created(),
        already_existed = report.already_existed(),
        "apply finished"
    );
    Ok(report)
}
