// Path: crates/relay/tests/chain_e2e.rs

use anyhow::Result;
use axum::{
    http::{HeaderValue, StatusCode},
    routing::get,
    serve, Router,
};
use chainlink_relay::server::MessageBody;
use chainlink_relay::{Forwarder, LatencyInjector, PeerResolver, RelayState};
use chainlink_types::MembershipManifest;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

const MARKER: &str = "X-Current-Service";

struct LocalChain {
    urls: HashMap<String, String>,
}

impl LocalChain {
    fn url(&self, member: &str) -> &str {
        &self.urls[member]
    }
}

fn relay_state(
    own_id: &str,
    manifest: &MembershipManifest,
    peers: HashMap<String, String>,
    forward_timeout: Duration,
    injected_delay: Duration,
) -> Arc<RelayState> {
    Arc::new(RelayState {
        own_id: own_id.to_string(),
        manifest: manifest.clone(),
        latency: LatencyInjector::new(injected_delay),
        forwarder: Forwarder::new(PeerResolver::Static(peers), forward_timeout).unwrap(),
    })
}

/// Binds one relay per member on loopback, each knowing every other member's address.
/// Members listed in `overrides` are not started; their address is taken from the map instead.
async fn spawn_chain(
    ids: &[&str],
    overrides: HashMap<String, String>,
    forward_timeout: Duration,
) -> Result<LocalChain> {
    let manifest = MembershipManifest::new(ids.iter().map(|s| s.to_string()).collect())?;

    let mut listeners = Vec::new();
    let mut urls = overrides.clone();
    for id in ids {
        if overrides.contains_key(*id) {
            continue;
        }
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        urls.insert(id.to_string(), format!("http://{}", listener.local_addr()?));
        listeners.push((id.to_string(), listener));
    }

    for (id, listener) in listeners {
        let state = relay_state(&id, &manifest, urls.clone(), forward_timeout, Duration::ZERO);
        tokio::spawn(chainlink_relay::run(
            listener,
            state,
            std::future::pending(),
        ));
    }
    Ok(LocalChain { urls })
}

/// Starts the only member of a one-member chain, which always draws the delay.
async fn spawn_delayed_solo(injected_delay: Duration) -> Result<String> {
    let manifest = MembershipManifest::new(vec!["solo".to_string()])?;
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}", listener.local_addr()?);
    let state = relay_state(
        "solo",
        &manifest,
        HashMap::new(),
        Duration::from_secs(3),
        injected_delay,
    );
    tokio::spawn(chainlink_relay::run(listener, state, std::future::pending()));
    Ok(url)
}

async fn start_stub(app: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        serve(listener, app).await.unwrap();
    });
    Ok(format!("http://{}", addr))
}

#[tokio::test]
async fn entry_request_reaches_terminal_member() -> Result<()> {
    let chain = spawn_chain(&["svc-a", "svc-b", "svc-c"], HashMap::new(), Duration::from_secs(3)).await?;

    let resp = reqwest::get(format!("{}/", chain.url("svc-a"))).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: MessageBody = resp.json().await?;
    assert_eq!(body.message, "You have reached the final chain link svc-c");
    Ok(())
}

#[tokio::test]
async fn forward_route_behaves_like_root() -> Result<()> {
    let chain = spawn_chain(&["svc-a", "svc-b"], HashMap::new(), Duration::from_secs(3)).await?;

    let resp = reqwest::Client::new()
        .get(format!("{}/forward", chain.url("svc-a")))
        .header(MARKER, "svc-a")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: MessageBody = resp.json().await?;
    assert_eq!(body.message, "You have reached the final chain link svc-b");
    Ok(())
}

#[tokio::test]
async fn terminal_member_answers_directly() -> Result<()> {
    let chain = spawn_chain(&["svc-a", "svc-b", "svc-c"], HashMap::new(), Duration::from_secs(3)).await?;

    let resp = reqwest::get(format!("{}/", chain.url("svc-c"))).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: MessageBody = resp.json().await?;
    assert_eq!(body.message, "You have reached the final chain link svc-c");
    Ok(())
}

#[tokio::test]
async fn single_member_chain_terminates_at_entry() -> Result<()> {
    let chain = spawn_chain(&["solo"], HashMap::new(), Duration::from_secs(3)).await?;

    let body: MessageBody = reqwest::get(format!("{}/", chain.url("solo"))).await?.json().await?;
    assert_eq!(body.message, "You have reached the final chain link solo");
    Ok(())
}

#[tokio::test]
async fn unknown_marker_is_rejected_without_forwarding() -> Result<()> {
    // svc-b points at a stub that fails the test if it is ever called.
    let tripwire = start_stub(Router::new().route(
        "/forward",
        get(|| async { (StatusCode::IM_A_TEAPOT, "should not be called") }),
    ))
    .await?;
    let chain = spawn_chain(
        &["svc-a", "svc-b"],
        HashMap::from([("svc-b".to_string(), tripwire)]),
        Duration::from_secs(3),
    )
    .await?;

    let resp = reqwest::Client::new()
        .get(format!("{}/", chain.url("svc-a")))
        .header(MARKER, "svc-x")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: MessageBody = resp.json().await?;
    assert_eq!(body.message, "Invalid service");
    Ok(())
}

#[tokio::test]
async fn downstream_status_and_body_pass_through() -> Result<()> {
    let stub = start_stub(Router::new().route(
        "/forward",
        get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }),
    ))
    .await?;
    let chain = spawn_chain(
        &["svc-a", "svc-b"],
        HashMap::from([("svc-b".to_string(), stub)]),
        Duration::from_secs(3),
    )
    .await?;

    let resp = reqwest::get(format!("{}/", chain.url("svc-a"))).await?;
    assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(resp.text().await?, "short and stout");
    Ok(())
}

#[tokio::test]
async fn unreachable_next_member_surfaces_as_bad_gateway() -> Result<()> {
    let closed = {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        format!("http://{}", listener.local_addr()?)
    };
    let chain = spawn_chain(
        &["svc-a", "svc-b", "svc-c"],
        HashMap::from([("svc-c".to_string(), closed)]),
        Duration::from_secs(3),
    )
    .await?;

    // svc-b fails to reach svc-c; svc-a passes svc-b's answer through unchanged.
    let resp = reqwest::get(format!("{}/", chain.url("svc-a"))).await?;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: MessageBody = resp.json().await?;
    assert!(body.message.contains("svc-c"), "{}", body.message);
    Ok(())
}

#[tokio::test]
async fn slow_next_member_surfaces_as_gateway_timeout() -> Result<()> {
    let slow = start_stub(Router::new().route(
        "/forward",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "too late"
        }),
    ))
    .await?;
    let chain = spawn_chain(
        &["svc-a", "svc-b"],
        HashMap::from([("svc-b".to_string(), slow)]),
        Duration::from_millis(200),
    )
    .await?;

    let resp = reqwest::get(format!("{}/", chain.url("svc-a"))).await?;
    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    Ok(())
}

#[tokio::test]
async fn readiness_and_metrics_are_served() -> Result<()> {
    let chain = spawn_chain(&["svc-a"], HashMap::new(), Duration::from_secs(3)).await?;

    let resp = reqwest::get(format!("{}/readiness", chain.url("svc-a"))).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: MessageBody = resp.json().await?;
    assert_eq!(body.message, "ok");

    let resp = reqwest::get(format!("{}/metrics", chain.url("svc-a"))).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn non_utf8_marker_is_rejected() -> Result<()> {
    let chain = spawn_chain(&["solo"], HashMap::new(), Duration::from_secs(3)).await?;

    let resp = reqwest::Client::new()
        .get(format!("{}/", chain.url("solo")))
        .header(MARKER, HeaderValue::from_bytes(b"svc-\xff")?)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: MessageBody = resp.json().await?;
    assert_eq!(body.message, "Invalid service");
    Ok(())
}

#[tokio::test]
async fn rejected_requests_skip_the_injected_delay() -> Result<()> {
    let url = spawn_delayed_solo(Duration::from_millis(300)).await?;
    let client = reqwest::Client::new();

    let started = Instant::now();
    let resp = client.get(format!("{}/", url)).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_millis(300));

    let started = Instant::now();
    let resp = client
        .get(format!("{}/", url))
        .header(MARKER, "svc-x")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(
        started.elapsed() < Duration::from_millis(250),
        "rejection took {:?}",
        started.elapsed()
    );
    Ok(())
}

#[tokio::test]
async fn blank_marker_restarts_at_the_entry_member() -> Result<()> {
    // Acting as svc-a, the terminal node forwards to svc-b instead of answering itself.
    let stub = start_stub(Router::new().route(
        "/forward",
        get(|| async { (StatusCode::IM_A_TEAPOT, "svc-b reached") }),
    ))
    .await?;
    let chain = spawn_chain(
        &["svc-a", "svc-b", "svc-c"],
        HashMap::from([("svc-b".to_string(), stub)]),
        Duration::from_secs(3),
    )
    .await?;

    let resp = reqwest::Client::new()
        .get(format!("{}/", chain.url("svc-c")))
        .header(MARKER, "")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(resp.text().await?, "svc-b reached");
    Ok(())
}
