// Path: crates/relay/src/router.rs

//! Chain position resolution.
//!
//! Given the marker carried by a request, the relay's own identifier and the
//! membership manifest, decide whether this hop forwards or terminates. The
//! decision is pure; the side effects (delay, outbound call) live in the server.

use chainlink_types::error::ChainError;
use chainlink_types::prelude::*;

/// What the current hop does with a validated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hop<'a> {
    /// Forward to `next`, setting the outbound marker to `next`.
    Forward {
        /// The position of the member handling this hop.
        index: usize,
        /// The member the request goes to next.
        next: &'a str,
    },
    /// The current member is the last in the chain.
    Terminal {
        /// The position of the member handling this hop.
        index: usize,
        /// The terminal member's identifier.
        member: &'a str,
    },
}

impl Hop<'_> {
    /// The position of the member handling this hop.
    pub fn index(&self) -> usize {
        match self {
            Hop::Forward { index, .. } | Hop::Terminal { index, .. } => *index,
        }
    }
}

/// Picks the identifier the current hop acts as.
///
/// A missing marker means the request entered the chain here. A marker that
/// is present but blank names the entry member.
pub fn current_member<'a>(
    manifest: &'a MembershipManifest,
    marker: Option<&'a str>,
    own_id: &'a str,
) -> &'a str {
    match marker.map(str::trim) {
        None => own_id,
        Some("") => manifest.entry(),
        Some(m) => m,
    }
}

/// Resolves and validates the hop for one request.
pub fn resolve_hop<'a>(
    manifest: &'a MembershipManifest,
    marker: Option<&str>,
    own_id: &str,
) -> Result<Hop<'a>, ChainError> {
    let current = current_member(manifest, marker, own_id);
    let index = manifest
        .index_of(current)
        .required(ChainError::InvalidChainPosition(current.to_string()))?;

    Ok(match manifest.next_after(index) {
        Some(next) => Hop::Forward { index, next },
        None => Hop::Terminal {
            index,
            member: manifest.terminal(),
        },
    })
}

/// The message returned by the terminal member.
pub fn terminal_message(member: &str) -> String {
    format!("You have reached the final chain link {}", member)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> MembershipManifest {
        MembershipManifest::from_json(r#"["svc-a","svc-b","svc-c"]"#).unwrap()
    }

    #[test]
    fn entry_without_marker_forwards_to_second_member() {
        let m = manifest();
        assert_eq!(
            resolve_hop(&m, None, "svc-a").unwrap(),
            Hop::Forward {
                index: 0,
                next: "svc-b"
            }
        );
    }

    #[test]
    fn marker_takes_precedence_over_own_identifier() {
        let m = manifest();
        let hop = resolve_hop(&m, Some("svc-b"), "svc-a").unwrap();
        assert_eq!(
            hop,
            Hop::Forward {
                index: 1,
                next: "svc-c"
            }
        );
    }

    #[test]
    fn last_member_terminates() {
        let m = manifest();
        let hop = resolve_hop(&m, None, "svc-c").unwrap();
        assert_eq!(
            hop,
            Hop::Terminal {
                index: 2,
                member: "svc-c"
            }
        );
        assert_eq!(
            terminal_message("svc-c"),
            "You have reached the final chain link svc-c"
        );
    }

    #[test]
    fn unknown_marker_is_rejected() {
        let m = manifest();
        let err = resolve_hop(&m, Some("svc-x"), "svc-a").unwrap_err();
        assert!(matches!(err, ChainError::InvalidChainPosition(id) if id == "svc-x"));
    }

    #[test]
    fn unknown_own_identifier_is_rejected_on_entry() {
        let m = manifest();
        assert!(resolve_hop(&m, None, "unknown").is_err());
    }

    #[test]
    fn blank_marker_names_the_entry_member() {
        let m = manifest();
        for blank in ["", "  "] {
            assert_eq!(
                resolve_hop(&m, Some(blank), "svc-b").unwrap(),
                Hop::Forward {
                    index: 0,
                    next: "svc-b"
                }
            );
        }
        // Without the header the node's own identifier still decides.
        assert_eq!(resolve_hop(&m, None, "svc-b").unwrap().index(), 1);
    }

    #[test]
    fn forwards_iff_not_last_for_every_member() {
        for n in 1..=8usize {
            let ids: Vec<String> = (0..n).map(|i| format!("node-{i}")).collect();
            let m = MembershipManifest::new(ids.clone()).unwrap();
            for (i, id) in ids.iter().enumerate() {
                let hop = resolve_hop(&m, Some(id), "ignored").unwrap();
                assert_eq!(hop.index(), i);
                assert_eq!(matches!(hop, Hop::Forward { .. }), i + 1 < n);
            }
        }
    }

    #[test]
    fn walking_the_chain_visits_each_member_once() {
        let m = MembershipManifest::for_chain("chain-link", 5).unwrap();
        let mut marker: Option<String> = None;
        let mut visited = Vec::new();
        loop {
            let hop = resolve_hop(&m, marker.as_deref(), m.entry()).unwrap();
            visited.push(hop.index());
            match hop {
                Hop::Forward { next, .. } => marker = Some(next.to_string()),
                Hop::Terminal { member, .. } => {
                    assert_eq!(member, "chain-link-service-4");
                    break;
                }
            }
        }
        assert_eq!(visited, vec![0, 1, 2, 3, 4]);
    }
}
