// Path: crates/types/src/error/mod.rs
//! Core error types for chain-link.

use std::path::PathBuf;
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Per-request errors raised by the chain router.
#[derive(Error, Debug)]
pub enum ChainError {
    /// The marker carried by the request does not name a chain member.
    #[error("Invalid chain position: '{0}' is not a chain member")]
    InvalidChainPosition(String),
    /// The forwarding call to the next member failed or timed out.
    #[error("Chain member '{member}' is unavailable: {reason}")]
    DownstreamUnavailable {
        /// The member the request was being forwarded to.
        member: String,
        /// Whether the failure was the forward timeout elapsing.
        timed_out: bool,
        /// The transport-level failure description.
        reason: String,
    },
}

impl ErrorCode for ChainError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidChainPosition(_) => "CHAIN_INVALID_POSITION",
            Self::DownstreamUnavailable {
                timed_out: true, ..
            } => "CHAIN_DOWNSTREAM_TIMEOUT",
            Self::DownstreamUnavailable { .. } => "CHAIN_DOWNSTREAM_UNAVAILABLE",
        }
    }
}

/// Fatal errors raised while loading the membership manifest at node startup.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest artifact could not be read.
    #[error("Failed to read membership manifest {path}: {source}")]
    Io {
        /// The path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The manifest is not a JSON array of strings.
    #[error("Malformed membership manifest: {0}")]
    Malformed(String),
    /// The manifest lists no members.
    #[error("Membership manifest is empty")]
    Empty,
    /// A member identifier is the empty string.
    #[error("Membership manifest contains an empty identifier at position {0}")]
    EmptyIdentifier(usize),
    /// A member identifier appears more than once.
    #[error("Membership manifest lists '{0}' more than once")]
    DuplicateMember(String),
}

impl ErrorCode for ManifestError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "MANIFEST_IO_ERROR",
            Self::Malformed(_) => "MANIFEST_MALFORMED",
            Self::Empty => "MANIFEST_EMPTY",
            Self::EmptyIdentifier(_) => "MANIFEST_EMPTY_IDENTIFIER",
            Self::DuplicateMember(_) => "MANIFEST_DUPLICATE_MEMBER",
        }
    }
}

/// Errors returned by a cluster control-plane client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    /// The object being created already exists (HTTP 409).
    #[error("{kind} '{name}' already exists")]
    AlreadyExists {
        /// The object kind.
        kind: String,
        /// The object name.
        name: String,
    },
    /// The object being read does not exist (HTTP 404).
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// The object kind.
        kind: String,
        /// The object name.
        name: String,
    },
    /// The control plane rejected the request.
    #[error("API error ({code}): {message}")]
    Api {
        /// The HTTP status code returned by the control plane.
        code: u16,
        /// The control plane's explanation.
        message: String,
    },
    /// The control plane could not be reached.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ErrorCode for ClusterError {
    fn code(&self) -> &'static str {
        match self {
            Self::AlreadyExists { .. } => "CLUSTER_ALREADY_EXISTS",
            Self::NotFound { .. } => "CLUSTER_NOT_FOUND",
            Self::Api { .. } => "CLUSTER_API_ERROR",
            Self::Transport(_) => "CLUSTER_TRANSPORT_ERROR",
        }
    }
}

/// Errors raised by the orchestrator (planning, rendering, applying).
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// The plan inputs violate a planner constraint.
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),
    /// The control plane refused to create an object.
    #[error("Error creating {kind} '{name}': {source}")]
    ObjectCreationFailed {
        /// The kind of the offending object.
        kind: &'static str,
        /// The name of the offending object.
        name: String,
        /// The control-plane error.
        #[source]
        source: ClusterError,
    },
    /// Cluster credentials or the CLI configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),
    /// A manifest could not be serialized or written to disk.
    #[error("Error writing manifest {file}: {reason}")]
    Render {
        /// The manifest file name.
        file: String,
        /// The serialization or I/O failure.
        reason: String,
    },
}

impl ErrorCode for OrchestratorError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidPlan(_) => "ORCH_INVALID_PLAN",
            Self::ObjectCreationFailed { .. } => "ORCH_OBJECT_CREATION_FAILED",
            Self::ConfigurationInvalid(_) => "ORCH_CONFIGURATION_INVALID",
            Self::Render { .. } => "ORCH_RENDER_FAILED",
        }
    }
}
