// Path: crates/orchestrator/src/lib.rs
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Chain-Link Orchestrator
//!
//! Turns deployment parameters into a running chain on a cluster, in four steps
//! that share one object model:
//!
//! 1. [`planner::plan`] computes the [`TopologyPlan`] (pure, creates nothing).
//! 2. [`render::write_manifests`] writes one YAML document per object.
//! 3. [`executor::apply`] submits the objects in order; existing ones are skipped.
//! 4. [`validator::validate`] reports the readiness of every relay and the prober.
//!
//! The control plane is reached only through the [`ClusterApi`] trait.
//! [`KubeCluster`] talks to a Kubernetes API server; [`testing::InMemoryCluster`]
//! stands in for one in tests.

pub mod cluster;
pub mod executor;
pub mod objects;
pub mod planner;
pub mod render;
pub mod testing;
pub mod validator;

pub use cluster::{ClusterApi, KubeCluster, WorkloadStatus};
pub use executor::{apply, ApplyOutcome, ApplyReport};
pub use objects::{ClusterObject, ObjectKind};
pub use planner::{plan, PlanSpec, TopologyPlan};
pub use validator::{validate, ValidationReport};
