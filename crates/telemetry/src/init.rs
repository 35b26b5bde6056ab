// Path: crates/telemetry/src/init.rs
use crate::propagation::install_propagator;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Where a service reports its spans.
#[derive(Debug, Clone)]
pub struct SpanExport {
    /// The service name spans are reported under.
    pub service_name: String,
    /// The Zipkin v2 collector URL, e.g. `http://zipkin-service/api/v2/spans`.
    pub collector_endpoint: String,
}

/// Initializes the global `tracing` subscriber for structured JSON logging.
///
/// Used by long-running services, whose logs are collected by the cluster.
/// With `spans` set, spans are also exported to a Zipkin collector in batches
/// and trace context is read from and written to W3C `traceparent` headers.
pub fn init_tracing(spans: Option<SpanExport>) -> Result<(), anyhow::Error> {
    let fmt_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    install_propagator();
    let otel_layer = match spans {
        Some(export) => {
            let tracer = opentelemetry_zipkin::new_pipeline()
                .with_service_name(export.service_name)
                .with_collector_endpoint(export.collector_endpoint)
                .install_batch(opentelemetry_sdk::runtime::Tokio)?;
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer);
    tracing_log::LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Flushes buffered spans. Call once the server has stopped.
pub fn shutdown_tracing() {
    opentelemetry::global::shutdown_tracer_provider();
}

/// Initializes a compact, coloured subscriber for interactive command-line use.
///
/// `RUST_LOG` wins over `default_level` when it is set.
pub fn init_cli_tracing(default_level: &str) -> Result<(), anyhow::Error> {
    let fmt_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = Registry::default().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
