// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
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

//! # Chain-Link Types
//!
//! The foundational library for chain-link, shared by the relay service and the
//! orchestrator.
//!
//! ## Architectural Role
//!
//! `chainlink-types` has minimal dependencies and is a dependency of every other
//! crate in the workspace. It owns the canonical definition of the chain order
//! (the [`MembershipManifest`]), the naming rules that tie a chain position to a
//! member identifier, the fixed wire/deployment constants, and the error enums.

/// Fixed constants and tunables shared by the relay and the planner.
pub mod config;
/// A unified set of all error types used across the workspace.
pub mod error;
/// The ordered chain membership list.
pub mod manifest;
/// A prelude containing useful extension traits like `OptionExt`.
pub mod prelude;

pub use manifest::MembershipManifest;
