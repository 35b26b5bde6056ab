// Path: crates/orchestrator/src/testing.rs

//! An in-memory [`ClusterApi`] for exercising the executor and validator
//! without a control plane.

use crate::cluster::{ClusterApi, WorkloadStatus};
use crate::objects::{ClusterObject, ObjectKind};
use async_trait::async_trait;
use chainlink_types::error::ClusterError;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

type ObjectKey = (ObjectKind, String, String);

#[derive(Default)]
struct Inner {
    objects: BTreeMap<ObjectKey, ClusterObject>,
    create_log: Vec<(ObjectKind, String)>,
    create_failures: HashMap<(ObjectKind, String), ClusterError>,
    workload_status: HashMap<(String, String), Result<WorkloadStatus, ClusterError>>,
    pod_phase: HashMap<(String, String), Result<Option<String>, ClusterError>>,
}

/// Records every submitted object and answers status reads from preset values.
///
/// Creating an object twice yields [`ClusterError::AlreadyExists`], like a real
/// control plane. Status reads for names with no preset answer `NotFound`.
#[derive(Default)]
pub struct InMemoryCluster {
    inner: Mutex<Inner>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes the next `create` of `kind`/`name` fail with `error`.
    pub fn with_create_failure(self, kind: ObjectKind, name: &str, error: ClusterError) -> Self {
        self.lock()
            .create_failures
            .insert((kind, name.to_string()), error);
        self
    }

    pub fn set_workload_status(&self, namespace: &str, name: &str, status: WorkloadStatus) {
        self.lock()
            .workload_status
            .insert((namespace.to_string(), name.to_string()), Ok(status));
    }

    pub fn set_workload_error(&self, namespace: &str, name: &str, error: ClusterError) {
        self.lock()
            .workload_status
            .insert((namespace.to_string(), name.to_string()), Err(error));
    }

    pub fn set_pod_phase(&self, namespace: &str, name: &str, phase: &str) {
        self.lock().pod_phase.insert(
            (namespace.to_string(), name.to_string()),
            Ok(Some(phase.to_string())),
        );
    }

    /// Every successful creation so far, in order.
    pub fn created(&self) -> Vec<(ObjectKind, String)> {
        self.lock().create_log.clone()
    }

    pub fn contains(&self, kind: ObjectKind, namespace: Option<&str>, name: &str) -> bool {
        let key = (kind, namespace.unwrap_or_default().to_string(), name.to_string());
        self.lock().objects.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ClusterApi for InMemoryCluster {
    async fn create(&self, object: &ClusterObject) -> Result<(), ClusterError> {
        let kind = object.kind();
        let name = object.name().to_string();
        let mut inner = self.lock();

        if let Some(err) = inner.create_failures.remove(&(kind, name.clone())) {
            return Err(err);
        }
        let key = (
            kind,
            object.namespace().unwrap_or_default().to_string(),
            name.clone(),
        );
        if inner.objects.contains_key(&key) {
            return Err(ClusterError::AlreadyExists {
                kind: kind.to_string(),
                name,
            });
        }
        inner.objects.insert(key, object.clone());
        inner.create_log.push((kind, name));
        Ok(())
    }

    async fn workload_status(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<WorkloadStatus, ClusterError> {
        self.lock()
            .workload_status
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .unwrap_or_else(|| {
                Err(ClusterError::NotFound {
                    kind: ObjectKind::Workload.to_string(),
                    name: name.to_string(),
                })
            })
    }

    async fn pod_phase(&self, namespace: &str, name: &str) -> Result<Option<String>, ClusterError> {
        self.lock()
            .pod_phase
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .unwrap_or_else(|| {
                Err(ClusterError::NotFound {
                    kind: ObjectKind::Prober.to_string(),
                    name: name.to_string(),
                })
            })
    }
}
