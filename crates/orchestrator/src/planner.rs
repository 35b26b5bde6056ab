// Path: crates/orchestrator/src/planner.rs

//! The Topology Planner: a pure function from deployment parameters to the full
//! set of declarative objects for one chain.
//!
//! Every name is derived from the chain name and a position index, so planning
//! the same inputs twice yields the same objects.

use crate::objects::{ClusterObject, ObjectKind};
use chainlink_types::config::{
    member_id, DEFAULT_CHAIN_NAME, ENDPOINT_PORT, HEALTH_PATH, MANIFEST_FILE_NAME,
    MANIFEST_MOUNT_DIR, RELAY_LISTEN_PORT, SERVICE_NAME_ENV,
};
use chainlink_types::error::OrchestratorError;
use chainlink_types::MembershipManifest;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    ConfigMap, ConfigMapVolumeSource, Container, ContainerPort, EnvVar, HTTPGetAction, Namespace,
    Pod, PodSecurityContext, PodSpec, PodTemplateSpec, Probe, SecurityContext, Service,
    ServicePort, ServiceSpec, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

// --- Fixed topology ---
pub const DEFAULT_IMAGE: &str = "ghcr.io/ccollicutt/chain-link:latest";
pub const DEFAULT_NAMESPACE: &str = "chain-link";
pub const DEFAULT_INSTANCES: usize = 3;
/// The largest chain a plan may describe.
pub const MAX_INSTANCES: usize = 1000;
pub const DEFAULT_PROBER_INTERVAL_SECS: u64 = 60;

pub const COLLECTOR_WORKLOAD_NAME: &str = "zipkin-deployment";
pub const COLLECTOR_ENDPOINT_NAME: &str = "zipkin-service";
const COLLECTOR_IMAGE: &str = "openzipkin/zipkin";
const COLLECTOR_PORT: i32 = 9411;

pub const PROBER_NAME: &str = "loadgenerator";
const PROBER_IMAGE: &str = "busybox";

const RELAY_RUN_AS_USER: i64 = 10001;
const PROBER_RUN_AS_USER: i64 = 65534;
const PROBE_INITIAL_DELAY_SECS: i32 = 5;
const PROBE_PERIOD_SECS: i32 = 10;

/// The name of the relay workload at position `index`.
pub fn relay_workload_name(chain_name: &str, index: usize) -> String {
    format!("{}-deployment-{}", chain_name, index)
}

/// The name of the config artifact holding the membership manifest.
pub fn manifest_artifact_name(chain_name: &str) -> String {
    format!("{}-services", chain_name)
}

/// The inputs of one planning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSpec {
    pub chain_name: String,
    pub instance_count: usize,
    pub image: String,
    pub namespace: String,
    pub prober_interval_secs: u64,
}

impl Default for PlanSpec {
    fn default() -> Self {
        Self {
            chain_name: DEFAULT_CHAIN_NAME.to_string(),
            instance_count: DEFAULT_INSTANCES,
            image: DEFAULT_IMAGE.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            prober_interval_secs: DEFAULT_PROBER_INTERVAL_SECS,
        }
    }
}

impl PlanSpec {
    pub fn with_chain_name(mut self, name: impl Into<String>) -> Self {
        self.chain_name = name.into();
        self
    }

    pub fn with_instances(mut self, count: usize) -> Self {
        self.instance_count = count;
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_prober_interval(mut self, secs: u64) -> Self {
        self.prober_interval_secs = secs;
        self
    }

    fn check(&self) -> Result<(), OrchestratorError> {
        if self.instance_count == 0 {
            return Err(OrchestratorError::InvalidPlan(
                "instance count must be at least 1".into(),
            ));
        }
        if self.instance_count > MAX_INSTANCES {
            return Err(OrchestratorError::InvalidPlan(format!(
                "instance count {} exceeds the maximum of {}",
                self.instance_count, MAX_INSTANCES
            )));
        }
        for (field, value) in [
            ("chain name", &self.chain_name),
            ("namespace", &self.namespace),
            ("image", &self.image),
        ] {
            if value.trim().is_empty() {
                return Err(OrchestratorError::InvalidPlan(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }
        Ok(())
    }
}

/// The full declarative description of one chain deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyPlan {
    spec: PlanSpec,
    manifest: MembershipManifest,
    objects: Vec<ClusterObject>,
}

impl TopologyPlan {
    pub fn spec(&self) -> &PlanSpec {
        &self.spec
    }

    pub fn manifest(&self) -> &MembershipManifest {
        &self.manifest
    }

    /// Objects in submission order.
    pub fn objects(&self) -> &[ClusterObject] {
        &self.objects
    }

    pub fn count(&self, kind: ObjectKind) -> usize {
        self.objects.iter().filter(|o| o.kind() == kind).count()
    }

    pub fn names(&self) -> Vec<&str> {
        self.objects.iter().map(ClusterObject::name).collect()
    }
}

/// Computes the plan. Creates nothing.
pub fn plan(spec: &PlanSpec) -> Result<TopologyPlan, OrchestratorError> {
    spec.check()?;
    let manifest = MembershipManifest::for_chain(&spec.chain_name, spec.instance_count)
        .map_err(|e| OrchestratorError::InvalidPlan(e.to_string()))?;

    let mut objects = Vec::with_capacity(2 * spec.instance_count + 5);
    objects.push(ClusterObject::Namespace(namespace(spec)));
    objects.push(ClusterObject::ConfigArtifact(manifest_artifact(spec, &manifest)));
    objects.push(ClusterObject::Workload(collector_workload(spec)));
    objects.push(ClusterObject::Endpoint(collector_endpoint(spec)));
    objects.extend((0..spec.instance_count).map(|i| ClusterObject::Workload(relay_workload(spec, i))));
    objects.extend((0..spec.instance_count).map(|i| ClusterObject::Endpoint(relay_endpoint(spec, i))));
    objects.push(ClusterObject::Prober(prober(spec, manifest.entry())));

    tracing::debug!(
        target: "planner",
        chain = %spec.chain_name,
        instances = spec.instance_count,
        objects = objects.len(),
        "planned topology"
    );
    Ok(TopologyPlan {
        spec: spec.clone(),
        manifest,
        objects,
    })
}

fn labels<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn meta(spec: &PlanSpec, name: String, labels: Option<BTreeMap<String, String>>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name),
        namespace: Some(spec.namespace.clone()),
        labels,
        ..Default::default()
    }
}

fn relay_labels(spec: &PlanSpec, index: usize) -> BTreeMap<String, String> {
    labels([
        ("app", spec.chain_name.clone()),
        ("instance", index.to_string()),
        ("instance-name", format!("{}-{}", spec.chain_name, index)),
        ("service-name", member_id(&spec.chain_name, index)),
    ])
}

fn collector_labels(spec: &PlanSpec) -> BTreeMap<String, String> {
    labels([("app", spec.chain_name.clone()), ("instance", "zipkin".to_string())])
}

fn namespace(spec: &PlanSpec) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(spec.namespace.clone()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn manifest_artifact(spec: &PlanSpec, manifest: &MembershipManifest) -> ConfigMap {
    ConfigMap {
        metadata: meta(spec, manifest_artifact_name(&spec.chain_name), None),
        data: Some(BTreeMap::from([(
            MANIFEST_FILE_NAME.to_string(),
            manifest.to_json(),
        )])),
        ..Default::default()
    }
}

fn health_probe() -> Probe {
    Probe {
        http_get: Some(HTTPGetAction {
            path: Some(HEALTH_PATH.to_string()),
            port: IntOrString::Int(i32::from(RELAY_LISTEN_PORT)),
            scheme: Some("HTTP".to_string()),
            ..Default::default()
        }),
        initial_delay_seconds: Some(PROBE_INITIAL_DELAY_SECS),
        period_seconds: Some(PROBE_PERIOD_SECS),
        ..Default::default()
    }
}

fn single_replica(
    labels: BTreeMap<String, String>,
    pod: PodSpec,
) -> DeploymentSpec {
    DeploymentSpec {
        replicas: Some(1),
        selector: LabelSelector {
            match_labels: Some(labels.clone()),
            ..Default::default()
        },
        template: PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: Some(labels),
                ..Default::default()
            }),
            spec: Some(pod),
        },
        ..Default::default()
    }
}

fn relay_workload(spec: &PlanSpec, index: usize) -> Deployment {
    let artifact = manifest_artifact_name(&spec.chain_name);
    let container = Container {
        name: spec.chain_name.clone(),
        image: Some(spec.image.clone()),
        image_pull_policy: Some("Always".to_string()),
        env: Some(vec![EnvVar {
            name: SERVICE_NAME_ENV.to_string(),
            value: Some(member_id(&spec.chain_name, index)),
            ..Default::default()
        }]),
        ports: Some(vec![ContainerPort {
            container_port: i32::from(RELAY_LISTEN_PORT),
            ..Default::default()
        }]),
        readiness_probe: Some(health_probe()),
        liveness_probe: Some(health_probe()),
        volume_mounts: Some(vec![VolumeMount {
            name: artifact.clone(),
            mount_path: MANIFEST_MOUNT_DIR.to_string(),
            read_only: Some(true),
            ..Default::default()
        }]),
        ..Default::default()
    };
    let pod = PodSpec {
        security_context: Some(PodSecurityContext {
            run_as_user: Some(RELAY_RUN_AS_USER),
            ..Default::default()
        }),
        containers: vec![container],
        volumes: Some(vec![Volume {
            name: artifact.clone(),
            config_map: Some(ConfigMapVolumeSource {
                name: artifact.into(),
                ..Default::default()
            }),
            ..Default::default()
        }]),
        ..Default::default()
    };

    Deployment {
        metadata: meta(spec, relay_workload_name(&spec.chain_name, index), None),
        spec: Some(single_replica(relay_labels(spec, index), pod)),
        ..Default::default()
    }
}

fn endpoint(
    spec: &PlanSpec,
    name: String,
    labels: BTreeMap<String, String>,
    target_port: i32,
) -> Service {
    Service {
        metadata: meta(spec, name, Some(labels.clone())),
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                port: i32::from(ENDPOINT_PORT),
                target_port: Some(IntOrString::Int(target_port)),
                ..Default::default()
            }]),
            selector: Some(labels),
            type_: Some("ClusterIP".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn relay_endpoint(spec: &PlanSpec, index: usize) -> Service {
    endpoint(
        spec,
        member_id(&spec.chain_name, index),
        relay_labels(spec, index),
        i32::from(RELAY_LISTEN_PORT),
    )
}

fn collector_workload(spec: &PlanSpec) -> Deployment {
    let container = Container {
        name: "zipkin".to_string(),
        image: Some(COLLECTOR_IMAGE.to_string()),
        image_pull_policy: Some("Always".to_string()),
        ports: Some(vec![ContainerPort {
            container_port: COLLECTOR_PORT,
            ..Default::default()
        }]),
        ..Default::default()
    };
    Deployment {
        metadata: meta(spec, COLLECTOR_WORKLOAD_NAME.to_string(), None),
        spec: Some(single_replica(
            collector_labels(spec),
            PodSpec {
                containers: vec![container],
                ..Default::default()
            },
        )),
        ..Default::default()
    }
}

fn collector_endpoint(spec: &PlanSpec) -> Service {
    endpoint(
        spec,
        COLLECTOR_ENDPOINT_NAME.to_string(),
        collector_labels(spec),
        COLLECTOR_PORT,
    )
}

/// The shell loop the prober runs for its whole lifetime.
pub fn prober_command(interval_secs: u64, entry_member: &str) -> String {
    format!(
        "while sleep {}; do wget -qO- {}; done",
        interval_secs, entry_member
    )
}

fn prober(spec: &PlanSpec, entry_member: &str) -> Pod {
    let container = Container {
        name: PROBER_IMAGE.to_string(),
        image: Some(PROBER_IMAGE.to_string()),
        command: Some(vec![
            "/bin/sh".to_string(),
            "-c".to_string(),
            prober_command(spec.prober_interval_secs, entry_member),
        ]),
        security_context: Some(SecurityContext {
            run_as_user: Some(PROBER_RUN_AS_USER),
            ..Default::default()
        }),
        ..Default::default()
    };
    Pod {
        metadata: meta(
            spec,
            PROBER_NAME.to_string(),
            Some(labels([
                ("app", spec.chain_name.clone()),
                ("service", PROBER_NAME.to_string()),
            ])),
        ),
        spec: Some(PodSpec {
            restart_policy: Some("Never".to_string()),
            containers: vec![container],
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workloads(plan: &TopologyPlan) -> Vec<&Deployment> {
        plan.objects()
            .iter()
            .filter_map(|o| match o {
                ClusterObject::Workload(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn plan_has_expected_object_counts() {
        for n in [1usize, 3, 7] {
            let plan = plan(&PlanSpec::default().with_instances(n)).unwrap();
            assert_eq!(plan.count(ObjectKind::Namespace), 1);
            assert_eq!(plan.count(ObjectKind::ConfigArtifact), 1);
            assert_eq!(plan.count(ObjectKind::Workload), n + 1);
            assert_eq!(plan.count(ObjectKind::Endpoint), n + 1);
            assert_eq!(plan.count(ObjectKind::Prober), 1);
            assert_eq!(plan.objects().len(), 2 * n + 5);
        }
    }

    #[test]
    fn planning_is_deterministic() {
        let spec = PlanSpec::default().with_instances(4).with_namespace("demo");
        assert_eq!(plan(&spec).unwrap(), plan(&spec).unwrap());
    }

    #[test]
    fn submission_order_starts_with_namespace_then_manifest() {
        let plan = plan(&PlanSpec::default().with_instances(2)).unwrap();
        assert_eq!(
            plan.names(),
            vec![
                "chain-link",
                "chain-link-services",
                "zipkin-deployment",
                "zipkin-service",
                "chain-link-deployment-0",
                "chain-link-deployment-1",
                "chain-link-service-0",
                "chain-link-service-1",
                "loadgenerator",
            ]
        );
    }

    #[test]
    fn every_namespaced_object_carries_the_namespace() {
        let plan = plan(&PlanSpec::default().with_namespace("demo")).unwrap();
        for obj in plan.objects() {
            match obj.kind() {
                ObjectKind::Namespace => assert_eq!(obj.namespace(), None),
                _ => assert_eq!(obj.namespace(), Some("demo"), "{}", obj.name()),
            }
        }
    }

    #[test]
    fn manifest_artifact_lists_members_in_order() {
        let plan = plan(&PlanSpec::default().with_instances(3)).unwrap();
        let Some(ClusterObject::ConfigArtifact(cm)) = plan.objects().get(1) else {
            panic!("second object must be the manifest artifact");
        };
        let data = cm.data.as_ref().unwrap();
        assert_eq!(
            data["services.json"],
            r#"["chain-link-service-0","chain-link-service-1","chain-link-service-2"]"#
        );
        assert_eq!(plan.manifest().entry(), "chain-link-service-0");
    }

    #[test]
    fn relay_workload_is_wired_to_its_identity_and_manifest() {
        let plan = plan(&PlanSpec::default().with_instances(2).with_image("relay:dev")).unwrap();
        let relay = workloads(&plan)
            .into_iter()
            .find(|d| d.metadata.name.as_deref() == Some("chain-link-deployment-1"))
            .unwrap();
        let spec = relay.spec.as_ref().unwrap();
        assert_eq!(spec.replicas, Some(1));
        let selector = spec.selector.match_labels.as_ref().unwrap();
        assert_eq!(selector["app"], "chain-link");
        assert_eq!(selector["instance"], "1");

        let pod = spec.template.spec.as_ref().unwrap();
        let container = &pod.containers[0];
        assert_eq!(container.image.as_deref(), Some("relay:dev"));
        let env = &container.env.as_ref().unwrap()[0];
        assert_eq!(env.name, "CHAIN_LINK_SERVICE_NAME");
        assert_eq!(env.value.as_deref(), Some("chain-link-service-1"));
        let mount = &container.volume_mounts.as_ref().unwrap()[0];
        assert_eq!(mount.mount_path, "/etc/chain-link.conf.d");
        assert_eq!(mount.read_only, Some(true));
        let probe = container.readiness_probe.as_ref().unwrap();
        assert_eq!(
            probe.http_get.as_ref().unwrap().path.as_deref(),
            Some("/readiness")
        );
        assert!(container.liveness_probe.is_some());
    }

    #[test]
    fn relay_endpoint_maps_external_port_to_listener() {
        let plan = plan(&PlanSpec::default().with_instances(1)).unwrap();
        let svc = plan
            .objects()
            .iter()
            .find_map(|o| match o {
                ClusterObject::Endpoint(s) if s.metadata.name.as_deref() == Some("chain-link-service-0") => Some(s),
                _ => None,
            })
            .unwrap();
        let spec = svc.spec.as_ref().unwrap();
        let port = &spec.ports.as_ref().unwrap()[0];
        assert_eq!(port.port, 80);
        assert_eq!(port.target_port, Some(IntOrString::Int(8000)));
        assert_eq!(spec.selector.as_ref().unwrap()["instance"], "0");
    }

    #[test]
    fn prober_targets_entry_member_and_never_restarts() {
        let plan = plan(&PlanSpec::default().with_prober_interval(15)).unwrap();
        let Some(ClusterObject::Prober(pod)) = plan.objects().last() else {
            panic!("last object must be the prober");
        };
        let spec = pod.spec.as_ref().unwrap();
        assert_eq!(spec.restart_policy.as_deref(), Some("Never"));
        let command = spec.containers[0].command.as_ref().unwrap();
        assert_eq!(
            command[2],
            "while sleep 15; do wget -qO- chain-link-service-0; done"
        );
    }

    #[test]
    fn rejects_empty_chain() {
        let err = plan(&PlanSpec::default().with_instances(0)).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidPlan(_)));
        let err = plan(&PlanSpec::default().with_namespace(" ")).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidPlan(_)));
    }

    #[test]
    fn rejects_oversized_chain_before_allocating() {
        let err = plan(&PlanSpec::default().with_instances(usize::MAX)).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidPlan(ref m) if m.contains("maximum")));
        let err = plan(&PlanSpec::default().with_instances(MAX_INSTANCES + 1)).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidPlan(_)));
        assert!(plan(&PlanSpec::default().with_instances(MAX_INSTANCES)).is_ok());
    }
}
