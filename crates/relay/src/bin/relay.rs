// Path: crates/relay/src/bin/relay.rs
#![forbid(unsafe_code)]

//! The main binary for a chain-link relay node.

use anyhow::{anyhow, Context, Result};
use chainlink_relay::{Forwarder, LatencyInjector, PeerResolver, RelayState};
use chainlink_telemetry::init::{init_tracing, shutdown_tracing, SpanExport};
use chainlink_telemetry::{http::shutdown_signal, sinks};
use chainlink_types::config::{
    manifest_mount_path, RelayTiming, DEFAULT_ZIPKIN_ENDPOINT, RELAY_LISTEN_PORT,
    SERVICE_NAME_ENV, UNKNOWN_SERVICE_NAME,
};
use chainlink_types::MembershipManifest;
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(name = "relay", version, about = "A chain-link relay node.")]
struct RelayOpts {
    /// This node's chain member identifier.
    #[clap(long, env = SERVICE_NAME_ENV, default_value = UNKNOWN_SERVICE_NAME)]
    service_name: String,

    /// Path to the mounted membership manifest (a JSON array of member identifiers).
    #[clap(long, env = "CHAIN_LINK_MANIFEST", default_value_t = manifest_mount_path())]
    manifest: String,

    /// Address to listen on.
    #[clap(long, env = "CHAIN_LINK_LISTEN_ADDR", default_value_t = format!("0.0.0.0:{}", RELAY_LISTEN_PORT))]
    listen_addr: String,

    /// Base URL of a member; `{member}` is replaced by the member identifier.
    #[clap(long, env = "CHAIN_LINK_PEER_URL_TEMPLATE", default_value = "http://{member}")]
    peer_url_template: String,

    /// Static peer address as `member=url`. When given, replaces the URL template.
    #[clap(long = "peer", value_parser = parse_peer)]
    peers: Vec<(String, String)>,

    /// Seconds a request is held when selected by the latency draw.
    #[clap(long)]
    injected_delay_secs: Option<f64>,

    /// Seconds before a forwarding call is abandoned.
    #[clap(long)]
    forward_timeout_secs: Option<f64>,

    /// Zipkin collector spans are reported to. Empty disables span export.
    #[clap(long, env = "CHAIN_LINK_ZIPKIN_ENDPOINT", default_value = DEFAULT_ZIPKIN_ENDPOINT)]
    zipkin_endpoint: String,
}

fn parse_peer(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(m, u)| (m.trim().to_string(), u.trim().to_string()))
        .filter(|(m, u)| !m.is_empty() && !u.is_empty())
        .ok_or_else(|| format!("expected member=url, got '{raw}'"))
}

fn secs(value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value).map_err(|e| anyhow!("invalid duration {value}: {e}"))
}

impl RelayOpts {
    fn timing(&self) -> Result<RelayTiming> {
        let mut timing = RelayTiming::default();
        if let Some(d) = self.injected_delay_secs {
            timing.injected_delay = secs(d)?;
        }
        if let Some(t) = self.forward_timeout_secs {
            timing.forward_timeout = secs(t)?;
        }
        Ok(timing)
    }

    fn span_export(&self) -> Option<SpanExport> {
        let endpoint = self.zipkin_endpoint.trim();
        (!endpoint.is_empty()).then(|| SpanExport {
            service_name: self.service_name.clone(),
            collector_endpoint: endpoint.to_string(),
        })
    }

    fn peer_resolver(&self) -> PeerResolver {
        if self.peers.is_empty() {
            PeerResolver::Template(self.peer_url_template.clone())
        } else {
            PeerResolver::Static(self.peers.iter().cloned().collect::<HashMap<_, _>>())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = RelayOpts::parse();
    init_tracing(opts.span_export())?;
    let metrics_sink = chainlink_telemetry::prometheus::install()?;
    if sinks::SINK.set(metrics_sink).is_err() {
        tracing::warn!(target: "relay", "metrics sink already installed");
    }

    tracing::info!(
        target: "relay",
        event = "startup",
        service_name = %opts.service_name,
        manifest = %opts.manifest,
        zipkin = %opts.zipkin_endpoint
    );

    // A missing or malformed manifest is fatal for the node, not per request.
    let manifest = MembershipManifest::load(PathBuf::from(&opts.manifest))
        .with_context(|| format!("loading membership manifest from {}", opts.manifest))?;
    tracing::info!(target: "relay", services = ?manifest.members(), "loaded membership manifest");
    if !manifest.is_member(&opts.service_name) {
        tracing::warn!(
            target: "relay",
            service_name = %opts.service_name,
            "own identifier is not a chain member; requests without a marker will be rejected"
        );
    }

    let timing = opts.timing()?;
    let state = Arc::new(RelayState {
        own_id: opts.service_name.clone(),
        manifest,
        latency: LatencyInjector::new(timing.injected_delay),
        forwarder: Forwarder::new(opts.peer_resolver(), timing.forward_timeout)?,
    });

    let listener = tokio::net::TcpListener::bind(&opts.listen_addr)
        .await
        .with_context(|| format!("binding {}", opts.listen_addr))?;
    let served = chainlink_relay::run(listener, state, shutdown_signal("relay")).await;
    shutdown_tracing();
    served
}
