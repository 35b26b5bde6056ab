// Path: crates/telemetry/src/lib.rs
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

//! # Chain-Link Telemetry
//!
//! This crate provides the observability infrastructure for chain-link,
//! including structured logging initialization, span export with trace-context
//! propagation, the Prometheus `/metrics` handler, and abstract sinks for
//! decoupling metric instrumentation from the backend.

/// Shared HTTP plumbing: the `/metrics` handler, middleware error mapping and shutdown signal.
pub mod http;
/// The initialization routines for global structured logging.
pub mod init;
/// W3C trace-context propagation through HTTP headers.
pub mod propagation;
/// The concrete implementation of metrics sinks using the `prometheus` crate.
pub mod prometheus;
/// Abstract traits (`*MetricsSink`) that define the contract for metrics reporting.
pub mod sinks;
/// A simple RAII timer for measuring the duration of a scope.
pub mod time;

// Re-export the public helper functions for easy access to the global sinks.
pub use sinks::{error_metrics, relay_metrics};
