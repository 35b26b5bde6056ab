// Path: crates/types/src/manifest.rs

//! The Membership Manifest: the single source of truth for chain order.
//!
//! The manifest is serialized as a JSON array of member identifiers. Position 0
//! is the entry member and position `len - 1` is the terminal member. A relay
//! loads it once at startup; a malformed artifact aborts startup rather than
//! failing individual requests.

use crate::config::member_id;
use crate::error::ManifestError;
use std::collections::HashSet;
use std::path::Path;

/// An ordered, immutable list of chain member identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipManifest {
    members: Vec<String>,
}

impl MembershipManifest {
    /// Builds a manifest from an ordered list, enforcing the manifest invariants.
    pub fn new(members: Vec<String>) -> Result<Self, ManifestError> {
        if members.is_empty() {
            return Err(ManifestError::Empty);
        }
        let mut seen = HashSet::with_capacity(members.len());
        for (pos, id) in members.iter().enumerate() {
            if id.is_empty() {
                return Err(ManifestError::EmptyIdentifier(pos));
            }
            if !seen.insert(id.as_str()) {
                return Err(ManifestError::DuplicateMember(id.clone()));
            }
        }
        Ok(Self { members })
    }

    /// The deterministic manifest of a chain of `instance_count` members.
    pub fn for_chain(chain_name: &str, instance_count: usize) -> Result<Self, ManifestError> {
        Self::new((0..instance_count).map(|i| member_id(chain_name, i)).collect())
    }

    /// Parses the serialized (JSON array) form.
    pub fn from_json(raw: &str) -> Result<Self, ManifestError> {
        let members: Vec<String> =
            serde_json::from_str(raw).map_err(|e| ManifestError::Malformed(e.to_string()))?;
        Self::new(members)
    }

    /// Loads the manifest from a mounted artifact.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Serializes the manifest to its mounted (JSON array) form.
    pub fn to_json(&self) -> String {
        // A Vec<String> always serializes.
        serde_json::to_string(&self.members).unwrap_or_else(|_| "[]".to_string())
    }

    /// The members in forwarding order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// The number of members. Always at least 1.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The entry member (position 0).
    pub fn entry(&self) -> &str {
        self.members.first().map(String::as_str).unwrap_or_default()
    }

    /// The terminal member (position `len - 1`).
    pub fn terminal(&self) -> &str {
        self.members.last().map(String::as_str).unwrap_or_default()
    }

    /// Whether `id` names a chain member.
    pub fn is_member(&self, id: &str) -> bool {
        self.members.iter().any(|m| m == id)
    }

    /// The position of `id` in the chain, or `None` if it is not a member.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.members.iter().position(|m| m == id)
    }

    /// The member following position `index`, or `None` if `index` is terminal.
    pub fn next_after(&self, index: usize) -> Option<&str> {
        self.members.get(index + 1).map(String::as_str)
    }
}
