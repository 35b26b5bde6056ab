// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A lazily-initialized static reference to the global `MetricsSink` implementation.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns a static reference to the configured error metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured relay metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn relay_metrics() -> &'static dyn RelayMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

// --- Trait Definitions ---

/// A sink for metrics related to request handling on a relay node.
pub trait RelayMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for handled requests, labeled by route and status code.
    fn inc_requests_total(&self, route: &str, status_code: u16);
    /// Increments the counter of requests held back by the latency injector.
    fn inc_latency_injected(&self);
    /// Observes the duration of a forwarding call to the next member.
    fn observe_forward_duration(&self, duration_secs: f64);
    /// Increments a counter for failed forwarding calls, labeled by reason.
    fn inc_forward_failures(&self, reason: &'static str);
}
impl RelayMetricsSink for NopSink {
    fn inc_requests_total(&self, _route: &str, _status_code: u16) {}
    fn inc_latency_injected(&self) {}
    fn observe_forward_duration(&self, _duration_secs: f64) {}
    fn inc_forward_failures(&self, _reason: &'static str) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its kind and variant.
    fn inc_error(&self, kind: &'static str, variant: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _variant: &'static str) {}
}

/// A unified sink that implements all domain-specific traits, providing a single
/// point of implementation for metrics backends like Prometheus.
pub trait MetricsSink: RelayMetricsSink + ErrorMetricsSink {}

// Blanket implementation to allow any type that implements all sub-traits
// to be used as a `MetricsSink`.
impl<T> MetricsSink for T where T: RelayMetricsSink + ErrorMetricsSink {}
