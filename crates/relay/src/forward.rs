// Path: crates/relay/src/forward.rs

//! The outbound hop: one bounded GET to the next member's `/forward` route.

use axum::body::Bytes;
use axum::http::HeaderMap;
use chainlink_telemetry::propagation::inject_span_context;
use chainlink_telemetry::{relay_metrics, time::ForwardTimer};
use chainlink_types::config::{FORWARD_PATH, MARKER_HEADER};
use chainlink_types::error::ChainError;
use std::collections::HashMap;
use std::time::Duration;
use tracing::Instrument;

/// Placeholder substituted with the member identifier in a [`PeerResolver::Template`].
pub const MEMBER_PLACEHOLDER: &str = "{member}";

/// Maps a member identifier to the base URL its relay is reachable at.
#[derive(Debug, Clone)]
pub enum PeerResolver {
    /// A URL template such as `http://{member}`; in-cluster the identifier is a DNS name.
    Template(String),
    /// A fixed member-to-URL table, for local chains.
    Static(HashMap<String, String>),
}

impl Default for PeerResolver {
    fn default() -> Self {
        PeerResolver::Template(format!("http://{}", MEMBER_PLACEHOLDER))
    }
}

impl PeerResolver {
    /// The base URL of `member`, or `None` if a static table does not list it.
    pub fn base_url(&self, member: &str) -> Option<String> {
        match self {
            PeerResolver::Template(t) => Some(t.replace(MEMBER_PLACEHOLDER, member)),
            PeerResolver::Static(table) => table.get(member).cloned(),
        }
    }
}

/// A downstream response, passed back to the caller verbatim.
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Issues forwarding calls to the next chain member.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    peers: PeerResolver,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(peers: PeerResolver, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            peers,
            timeout,
        })
    }

    /// Sends the request to `next` with the marker set to `next`.
    ///
    /// The call runs in its own client span whose context travels in the
    /// request headers. Failures are not retried.
    pub async fn forward(&self, next: &str) -> Result<ForwardedResponse, ChainError> {
        let base = self
            .peers
            .base_url(next)
            .ok_or_else(|| ChainError::DownstreamUnavailable {
                member: next.to_string(),
                timed_out: false,
                reason: "no address known for member".to_string(),
            })?;
        let url = format!("{}{}", base.trim_end_matches('/'), FORWARD_PATH);
        tracing::info!(target: "relay", next_service = next, %url, "forwarding");

        let _timer = ForwardTimer::new(relay_metrics());
        let unavailable = |e: reqwest::Error| {
            let timed_out = e.is_timeout();
            relay_metrics().inc_forward_failures(if timed_out { "timeout" } else { "transport" });
            ChainError::DownstreamUnavailable {
                member: next.to_string(),
                timed_out,
                reason: e.to_string(),
            }
        };

        let span = tracing::info_span!("forward", otel.kind = "client", next_service = next);
        let mut trace_headers = HeaderMap::new();
        inject_span_context(&span, &mut trace_headers);

        let response = self
            .client
            .get(&url)
            .headers(trace_headers)
            .header(MARKER_HEADER, next)
            .timeout(self.timeout)
            .send()
            .instrument(span)
            .await
            .map_err(unavailable)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(unavailable)?;

        Ok(ForwardedResponse {
            status,
            content_type,
            body,
        })
    }
}
