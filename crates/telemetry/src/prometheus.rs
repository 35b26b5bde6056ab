// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_histogram, register_int_counter, register_int_counter_vec,
    Histogram, IntCounter, IntCounterVec,
};

// --- Metric Statics ---
// We use OnceCell to hold the metric collectors. They will be initialized
// exactly once by the `install` function.

static RELAY_REQUESTS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static RELAY_LATENCY_INJECTED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static RELAY_FORWARD_DURATION_SECONDS: OnceCell<Histogram> = OnceCell::new();
static RELAY_FORWARD_FAILURES_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

static INSTALLED: OnceCell<()> = OnceCell::new();
static PROMETHEUS_SINK: PrometheusSink = PrometheusSink;

#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

/// Runs `f` against a metric if `install()` has registered it.
macro_rules! with_metric {
    ($metric:ident, |$m:ident| $body:expr) => {
        if let Some($m) = $metric.get() {
            $body;
        }
    };
}

impl RelayMetricsSink for PrometheusSink {
    fn inc_requests_total(&self, route: &str, status_code: u16) {
        with_metric!(RELAY_REQUESTS_TOTAL, |m| m
            .with_label_values(&[route, &status_code.to_string()])
            .inc());
    }
    fn inc_latency_injected(&self) {
        with_metric!(RELAY_LATENCY_INJECTED_TOTAL, |m| m.inc());
    }
    fn observe_forward_duration(&self, duration_secs: f64) {
        with_metric!(RELAY_FORWARD_DURATION_SECONDS, |m| m.observe(duration_secs));
    }
    fn inc_forward_failures(&self, reason: &'static str) {
        with_metric!(RELAY_FORWARD_FAILURES_TOTAL, |m| m
            .with_label_values(&[reason])
            .inc());
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, variant: &'static str) {
        with_metric!(ERRORS_TOTAL, |m| m.with_label_values(&[kind, variant]).inc());
    }
}

fn register_all() -> Result<(), prometheus::Error> {
    let _ = RELAY_REQUESTS_TOTAL.set(register_int_counter_vec!(
        "chainlink_relay_requests_total",
        "Total requests handled by this relay.",
        &["route", "status"]
    )?);
    let _ = RELAY_LATENCY_INJECTED_TOTAL.set(register_int_counter!(
        "chainlink_relay_latency_injected_total",
        "Total requests held back by the latency injector."
    )?);
    let _ = RELAY_FORWARD_DURATION_SECONDS.set(register_histogram!(
        "chainlink_relay_forward_duration_seconds",
        "Latency of forwarding calls to the next chain member.",
        exponential_buckets(0.001, 2.0, 15)?
    )?);
    let _ = RELAY_FORWARD_FAILURES_TOTAL.set(register_int_counter_vec!(
        "chainlink_relay_forward_failures_total",
        "Total failed forwarding calls, by reason.",
        &["reason"]
    )?);
    let _ = ERRORS_TOTAL.set(register_int_counter_vec!(
        "chainlink_errors_total",
        "Total number of errors, categorized by type and variant.",
        &["kind", "variant"]
    )?);
    Ok(())
}

/// Initializes all Prometheus metrics collectors and returns a static reference to the sink.
/// Repeated calls return the same sink without re-registering.
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    INSTALLED.get_or_try_init(register_all)?;
    Ok(&PROMETHEUS_SINK)
}
