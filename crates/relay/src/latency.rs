// Path: crates/relay/src/latency.rs

//! Probabilistic latency injection.
//!
//! Every request takes one independent draw in `[0, 1)`; a draw below
//! `1 / chain_len` holds the request for the configured delay. Across a chain
//! of `N` members roughly one hop in `N` is slow, but a single end-to-end
//! request may see zero, one or several slow hops.

use chainlink_telemetry::relay_metrics;
use std::time::Duration;

/// Whether `draw` selects this request for the injected delay.
pub fn should_delay(draw: f64, chain_len: usize) -> bool {
    chain_len > 0 && draw < 1.0 / chain_len as f64
}

/// Holds back a share of requests to simulate one slow chain member.
#[derive(Debug, Clone, Copy)]
pub struct LatencyInjector {
    delay: Duration,
}

impl LatencyInjector {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Draws once and sleeps if selected. Returns whether the delay was applied.
    pub async fn maybe_delay(&self, chain_len: usize) -> bool {
        let draw: f64 = rand::random();
        tracing::debug!(target: "relay", draw, "latency draw");
        if !should_delay(draw, chain_len) {
            return false;
        }
        tracing::info!(
            target: "relay",
            delay_secs = self.delay.as_secs_f64(),
            "This node is sleeping"
        );
        relay_metrics().inc_latency_injected();
        tokio::time::sleep(self.delay).await;
        true
    }
}
