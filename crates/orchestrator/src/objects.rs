// Path: crates/orchestrator/src/objects.rs

//! The closed set of cluster objects a topology plan is made of.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Pod, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::fmt;

/// The kind of a [`ClusterObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Namespace,
    ConfigArtifact,
    Workload,
    Endpoint,
    Prober,
}

impl ObjectKind {
    /// The control-plane kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Namespace => "Namespace",
            ObjectKind::ConfigArtifact => "ConfigMap",
            ObjectKind::Workload => "Deployment",
            ObjectKind::Endpoint => "Service",
            ObjectKind::Prober => "Pod",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declarative object, carrying its kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterObject {
    Namespace(Namespace),
    /// Holds the serialized membership manifest.
    ConfigArtifact(ConfigMap),
    /// A replicated compute workload (relay or collector).
    Workload(Deployment),
    /// A stable network endpoint in front of a workload.
    Endpoint(Service),
    /// The one-shot periodic prober pod.
    Prober(Pod),
}

impl ClusterObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ClusterObject::Namespace(_) => ObjectKind::Namespace,
            ClusterObject::ConfigArtifact(_) => ObjectKind::ConfigArtifact,
            ClusterObject::Workload(_) => ObjectKind::Workload,
            ClusterObject::Endpoint(_) => ObjectKind::Endpoint,
            ClusterObject::Prober(_) => ObjectKind::Prober,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            ClusterObject::Namespace(o) => &o.metadata,
            ClusterObject::ConfigArtifact(o) => &o.metadata,
            ClusterObject::Workload(o) => &o.metadata,
            ClusterObject::Endpoint(o) => &o.metadata,
            ClusterObject::Prober(o) => &o.metadata,
        }
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    /// The namespace the object lives in; `None` for cluster-scoped objects.
    pub fn namespace(&self) -> Option<&str> {
        self.metadata().namespace.as_deref()
    }

    /// Serializes the object as a standalone YAML document.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        match self {
            ClusterObject::Namespace(o) => serde_yaml::to_string(o),
            ClusterObject::ConfigArtifact(o) => serde_yaml::to_string(o),
            ClusterObject::Workload(o) => serde_yaml::to_string(o),
            ClusterObject::Endpoint(o) => serde_yaml::to_string(o),
            ClusterObject::Prober(o) => serde_yaml::to_string(o),
        }
    }
}
