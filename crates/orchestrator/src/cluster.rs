// Path: crates/orchestrator/src/cluster.rs

use crate::objects::{ClusterObject, ObjectKind};
use async_trait::async_trait;
use chainlink_types::error::{ClusterError, OrchestratorError};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Pod, Service};
use kube::api::{Api, PostParams};
use kube::Client;

/// Replica counts of one workload as reported by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadStatus {
    /// `spec.replicas`, defaulting to 1 when unset.
    pub desired: i32,
    /// `status.readyReplicas`, defaulting to 0 when unset.
    pub ready: i32,
}

impl WorkloadStatus {
    pub fn is_ready(&self) -> bool {
        self.desired == self.ready
    }
}

/// The operations the orchestrator needs from a cluster control plane.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Submits one object. An existing object with the same name yields
    /// [`ClusterError::AlreadyExists`].
    async fn create(&self, object: &ClusterObject) -> Result<(), ClusterError>;

    /// Reads the replica status of a workload.
    async fn workload_status(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<WorkloadStatus, ClusterError>;

    /// Reads the lifecycle phase of a pod, if the control plane reports one.
    async fn pod_phase(&self, namespace: &str, name: &str) -> Result<Option<String>, ClusterError>;
}

/// A [`ClusterApi`] backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    /// Connects using the local kubeconfig or the in-cluster service account.
    pub async fn connect() -> Result<Self, OrchestratorError> {
        let client = Client::try_default().await.map_err(|e| {
            OrchestratorError::ConfigurationInvalid(format!(
                "failed to load cluster credentials: {}",
                e
            ))
        })?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn namespaced<K>(&self, namespace: &str) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn classify(err: kube::Error, kind: ObjectKind, name: &str) -> ClusterError {
    match err {
        kube::Error::Api(resp) if resp.code == 409 => ClusterError::AlreadyExists {
            kind: kind.to_string(),
            name: name.to_string(),
        },
        kube::Error::Api(resp) if resp.code == 404 => ClusterError::NotFound {
            kind: kind.to_string(),
            name: name.to_string(),
        },
        kube::Error::Api(resp) => ClusterError::Api {
            code: resp.code,
            message: resp.message,
        },
        other => ClusterError::Transport(other.to_string()),
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn create(&self, object: &ClusterObject) -> Result<(), ClusterError> {
        let pp = PostParams::default();
        let ns = object.namespace().unwrap_or("default");
        let result = match object {
            ClusterObject::Namespace(o) => Api::<Namespace>::all(self.client.clone())
                .create(&pp, o)
                .await
                .map(drop),
            ClusterObject::ConfigArtifact(o) => self
                .namespaced::<ConfigMap>(ns)
                .create(&pp, o)
                .await
                .map(drop),
            ClusterObject::Workload(o) => self
                .namespaced::<Deployment>(ns)
                .create(&pp, o)
                .await
                .map(drop),
            ClusterObject::Endpoint(o) => self
                .namespaced::<Service>(ns)
                .create(&pp, o)
                .await
                .map(drop),
            ClusterObject::Prober(o) => self.namespaced::<Pod>(ns).create(&pp, o).await.map(drop),
        };
        result.map_err(|e| classify(e, object.kind(), object.name()))
    }

    async fn workload_status(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<WorkloadStatus, ClusterError> {
        let deployment = self
            .namespaced::<Deployment>(namespace)
            .get_status(name)
            .await
            .map_err(|e| classify(e, ObjectKind::Workload, name))?;
        Ok(WorkloadStatus {
            desired: deployment.spec.and_then(|s| s.replicas).unwrap_or(1),
            ready: deployment
                .status
                .and_then(|s| s.ready_replicas)
                .unwrap_or(0),
        })
    }

    async fn pod_phase(&self, namespace: &str, name: &str) -> Result<Option<String>, ClusterError> {
        let pod = self
            .namespaced::<Pod>(namespace)
            .get_status(name)
            .await
            .map_err(|e| classify(e, ObjectKind::Prober, name))?;
        Ok(pod.status.and_then(|s| s.phase))
    }
}
