// Path: crates/relay/src/server.rs

use crate::forward::{ForwardedResponse, Forwarder};
use crate::latency::LatencyInjector;
use crate::router::{resolve_hop, terminal_message, Hop};
use axum::{
    error_handling::HandleErrorLayer,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chainlink_telemetry::propagation::set_parent_from_headers;
use chainlink_telemetry::{error_metrics, http as telemetry_http, relay_metrics};
use chainlink_types::config::MARKER_HEADER;
use chainlink_types::error::{ChainError, ErrorCode};
use chainlink_types::MembershipManifest;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::Instrument;

const MAX_IN_FLIGHT: usize = 1024;

/// The JSON body of every response this relay produces itself.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

// --- Error Handling ---
pub struct RelayError(pub ChainError);

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let err = self.0;
        error_metrics().inc_error("chain", err.code());
        let (status, message) = match &err {
            ChainError::InvalidChainPosition(marker) => {
                tracing::warn!(target: "relay", %marker, "rejecting request with unknown marker");
                (StatusCode::BAD_REQUEST, "Invalid service".to_string())
            }
            ChainError::DownstreamUnavailable { timed_out, .. } => {
                tracing::error!(target: "relay", error = %err, "forwarding failed");
                let status = if *timed_out {
                    StatusCode::GATEWAY_TIMEOUT
                } else {
                    StatusCode::BAD_GATEWAY
                };
                (status, err.to_string())
            }
        };
        (status, MessageBody::new(message)).into_response()
    }
}

/// The outcome of a successfully handled hop.
pub enum ChainReply {
    /// The downstream member's response, unchanged.
    Forwarded(ForwardedResponse),
    /// This member is last in the chain.
    Terminal(String),
}

impl IntoResponse for ChainReply {
    fn into_response(self) -> Response {
        match self {
            ChainReply::Terminal(member) => {
                (StatusCode::OK, MessageBody::new(terminal_message(&member))).into_response()
            }
            ChainReply::Forwarded(resp) => {
                let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::BAD_GATEWAY);
                let mut response = (status, resp.body).into_response();
                if let Some(ct) = resp
                    .content_type
                    .as_deref()
                    .and_then(|ct| HeaderValue::from_str(ct).ok())
                {
                    response.headers_mut().insert(CONTENT_TYPE, ct);
                }
                response
            }
        }
    }
}

/// Process-scoped state shared read-only by every request.
#[derive(Debug)]
pub struct RelayState {
    pub own_id: String,
    pub manifest: MembershipManifest,
    pub latency: LatencyInjector,
    pub forwarder: Forwarder,
}

impl RelayState {
    /// Handles one hop: validate the position, maybe delay, then forward or terminate.
    pub async fn handle(&self, marker: Option<&str>) -> Result<ChainReply, ChainError> {
        let hop = resolve_hop(&self.manifest, marker, &self.own_id)?;
        tracing::info!(target: "relay", index = hop.index(), "current position");

        self.latency.maybe_delay(self.manifest.len()).await;

        match hop {
            Hop::Forward { next, .. } => self.forwarder.forward(next).await.map(ChainReply::Forwarded),
            Hop::Terminal { member, .. } => Ok(ChainReply::Terminal(member.to_string())),
        }
    }
}

/// Reads the marker header. A value that is not UTF-8 names no member.
fn marker(headers: &HeaderMap) -> Result<Option<&str>, ChainError> {
    headers
        .get(MARKER_HEADER)
        .map(|v| {
            std::str::from_utf8(v.as_bytes()).map_err(|_| {
                ChainError::InvalidChainPosition(String::from_utf8_lossy(v.as_bytes()).into_owned())
            })
        })
        .transpose()
}

async fn handle_request(state: &RelayState, headers: &HeaderMap) -> Result<ChainReply, ChainError> {
    state.handle(marker(headers)?).await
}

async fn dispatch(state: &RelayState, headers: &HeaderMap, route: &'static str) -> Response {
    let span = tracing::info_span!(
        "chain_hop",
        otel.kind = "server",
        service_name = %state.own_id,
        route
    );
    set_parent_from_headers(&span, headers);

    let response = match handle_request(state, headers).instrument(span).await {
        Ok(reply) => reply.into_response(),
        Err(e) => RelayError(e).into_response(),
    };
    relay_metrics().inc_requests_total(route, response.status().as_u16());
    response
}

// --- Handlers ---
async fn root_handler(State(state): State<Arc<RelayState>>, headers: HeaderMap) -> Response {
    dispatch(&state, &headers, "/").await
}

async fn forward_handler(State(state): State<Arc<RelayState>>, headers: HeaderMap) -> Response {
    dispatch(&state, &headers, "/forward").await
}

async fn readiness_handler() -> Json<MessageBody> {
    MessageBody::new("ok")
}

/// Builds the relay's HTTP surface.
pub fn app(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/forward", get(forward_handler))
        .route("/readiness", get(readiness_handler))
        .route("/metrics", get(telemetry_http::metrics_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(telemetry_http::handle_service_error))
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::new())
                .load_shed()
                .concurrency_limit(MAX_IN_FLIGHT),
        )
}

/// Serves the relay on `listener` until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, state: Arc<RelayState>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!(
        target: "relay",
        addr = %listener.local_addr()?,
        service_name = %state.own_id,
        "listening"
    );
    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
