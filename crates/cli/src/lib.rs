// Path: crates/cli/src/lib.rs
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

//! # Chain-Link CLI Library
//!
//! The configuration and action layers behind the `chain-link` binary.
//!
//! The CLI holds no orchestration logic of its own. It resolves a [`CliConfig`]
//! from flags and the persisted config file, turns it into a plan input, and
//! drives `chainlink-orchestrator` the way any other consumer would.

pub mod commands;
pub mod config;

pub use config::{CliConfig, ConfigOverrides};
