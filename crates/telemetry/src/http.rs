// Path: crates/telemetry/src/http.rs
use axum::{
    body::Bytes,
    http::{header::CONTENT_TYPE, HeaderName, StatusCode},
};
use prometheus::{Encoder, TextEncoder};
use tokio::signal;
use tower::BoxError;

/// Serves the default Prometheus registry in the text exposition format.
pub async fn metrics_handler() -> ([(HeaderName, String); 1], Bytes) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buf = Vec::with_capacity(1 << 16);
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::error!(error=%e, "Failed to encode prometheus metrics");
    }
    (
        [(CONTENT_TYPE, encoder.format_type().to_string())],
        buf.into(),
    )
}

/// Maps errors raised by the `tower` middleware stack.
///
/// Load shedding becomes 503; anything else is an internal error.
pub async fn handle_service_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::load_shed::error::Overloaded>() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Service overloaded".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", err),
        )
    }
}

/// Resolves when the process receives Ctrl-C.
pub async fn shutdown_signal(target: &'static str) {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(target: "telemetry", error = %e, "Failed to install CTRL+C handler");
    }
    tracing::info!(target: "telemetry", service = target, "shutting down gracefully");
}
