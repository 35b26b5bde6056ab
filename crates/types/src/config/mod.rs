// Path: crates/types/src/config/mod.rs

//! Fixed constants and tunables shared by the relay service and the planner.
//!
//! The planner bakes these values into the objects it produces and the relay
//! reads them back at runtime, so both sides must agree on them.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The default chain name, used as the prefix of every generated object.
pub const DEFAULT_CHAIN_NAME: &str = "chain-link";
/// The request header carrying the identifier of the member that handles the request next.
pub const MARKER_HEADER: &str = "X-Current-Service";
/// The environment variable a relay reads its own identifier from.
pub const SERVICE_NAME_ENV: &str = "CHAIN_LINK_SERVICE_NAME";
/// The identifier a relay assumes when [`SERVICE_NAME_ENV`] is unset.
pub const UNKNOWN_SERVICE_NAME: &str = "unknown";
/// The directory the membership manifest is mounted into.
pub const MANIFEST_MOUNT_DIR: &str = "/etc/chain-link.conf.d";
/// The file name (and config artifact data key) of the membership manifest.
pub const MANIFEST_FILE_NAME: &str = "services.json";
/// The port a relay listens on inside its workload.
pub const RELAY_LISTEN_PORT: u16 = 8000;
/// The port each relay endpoint exposes to the rest of the cluster.
pub const ENDPOINT_PORT: u16 = 80;
/// The health path used by liveness and readiness checks.
pub const HEALTH_PATH: &str = "/readiness";
/// The path a relay forwards to on the next member.
pub const FORWARD_PATH: &str = "/forward";
/// The Zipkin v2 collector relays report spans to unless told otherwise.
pub const DEFAULT_ZIPKIN_ENDPOINT: &str = "http://zipkin-service/api/v2/spans";

/// Returns the absolute path of the mounted membership manifest.
pub fn manifest_mount_path() -> String {
    format!("{}/{}", MANIFEST_MOUNT_DIR, MANIFEST_FILE_NAME)
}

/// Returns the identifier of the chain member at `index`.
///
/// The identifier doubles as the DNS name of that member's endpoint.
pub fn member_id(chain_name: &str, index: usize) -> String {
    format!("{}-service-{}", chain_name, index)
}

/// Timing knobs applied by a relay to every request it handles.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RelayTiming {
    /// How long a request is held when the latency draw selects it.
    #[serde(default = "default_injected_delay", with = "duration_secs")]
    pub injected_delay: Duration,
    /// The bound on each forwarding call.
    #[serde(default = "default_forward_timeout", with = "duration_secs")]
    pub forward_timeout: Duration,
}

fn default_injected_delay() -> Duration {
    Duration::from_secs(2)
}
fn default_forward_timeout() -> Duration {
    Duration::from_secs(3)
}

impl Default for RelayTiming {
    fn default() -> Self {
        Self {
            injected_delay: default_injected_delay(),
            forward_timeout: default_forward_timeout(),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
