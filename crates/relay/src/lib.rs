// Path: crates/relay/src/lib.rs
#![forbid(unsafe_code)]
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

//! # Chain-Link Relay
//!
//! One relay node of a linear request chain. Each node loads the shared
//! membership manifest at startup, and for every request:
//!
//! 1. resolves its position from the `X-Current-Service` marker (or its own
//!    identifier when the marker is absent) and rejects unknown markers,
//! 2. takes a single latency draw and sleeps when selected,
//! 3. forwards to the next member and relays its response verbatim, or
//!    answers itself when it is the last member.

pub mod forward;
pub mod latency;
pub mod router;
pub mod server;

pub use forward::{Forwarder, PeerResolver};
pub use latency::LatencyInjector;
pub use server::{app, run, RelayState};
