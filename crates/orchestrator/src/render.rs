// Path: crates/orchestrator/src/render.rs

//! The Manifest Renderer: serializes a plan to one YAML document per object.

use crate::objects::ClusterObject;
use crate::planner::TopologyPlan;
use chainlink_types::error::OrchestratorError;
use std::path::{Path, PathBuf};

/// One rendered object, ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedManifest {
    pub file_name: String,
    pub contents: String,
}

/// `{object-name}-{kind}.yaml`, with the kind lowercased.
pub fn file_name(object: &ClusterObject) -> String {
    format!(
        "{}-{}.yaml",
        object.name(),
        object.kind().as_str().to_lowercase()
    )
}

/// Renders every object of the plan, in submission order.
pub fn render(plan: &TopologyPlan) -> Result<Vec<RenderedManifest>, OrchestratorError> {
    plan.objects()
        .iter()
        .map(|object| {
            let file_name = file_name(object);
            let contents = object.to_yaml().map_err(|e| OrchestratorError::Render {
                file: file_name.clone(),
                reason: e.to_string(),
            })?;
            Ok(RenderedManifest {
                file_name,
                contents,
            })
        })
        .collect()
}

/// Writes the rendered plan into `dir`, creating it if needed. Existing files
/// with the same names are overwritten. Returns the written paths.
pub fn write_manifests(plan: &TopologyPlan, dir: &Path) -> Result<Vec<PathBuf>, OrchestratorError> {
    std::fs::create_dir_all(dir).map_err(|e| OrchestratorError::Render {
        file: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut written = Vec::new();
    for manifest in render(plan)? {
        let path = dir.join(&manifest.file_name);
        std::fs::write(&path, manifest.contents).map_err(|e| OrchestratorError::Render {
            file: manifest.file_name.clone(),
            reason: e.to_string(),
        })?;
        tracing::info!(target: "render", path = %path.display(), "wrote manifest");
        written.push(path);
    }
    Ok(written)
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            PathBuf::from(home).join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{plan, PlanSpec};

    #[test]
    fn file_names_follow_name_and_kind() {
        let plan = plan(&PlanSpec::default().with_instances(1)).unwrap();
        let names: Vec<String> = plan.objects().iter().map(file_name).collect();
        assert_eq!(
            names,
            vec![
                "chain-link-namespace.yaml",
                "chain-link-services-configmap.yaml",
                "zipkin-deployment-deployment.yaml",
                "zipkin-service-service.yaml",
                "chain-link-deployment-0-deployment.yaml",
                "chain-link-service-0-service.yaml",
                "loadgenerator-pod.yaml",
            ]
        );
    }

    #[test]
    fn rendered_documents_are_valid_yaml() {
        let plan = plan(&PlanSpec::default().with_instances(2)).unwrap();
        for manifest in render(&plan).unwrap() {
            let doc: serde_yaml::Value = serde_yaml::from_str(&manifest.contents).unwrap();
            assert!(doc.get("metadata").is_some(), "{}", manifest.file_name);
        }
    }

    #[test]
    fn expand_home_only_touches_leading_tilde() {
        std::env::set_var("HOME", "/home/tester");
        assert_eq!(
            expand_home("~/.config/chain-link"),
            PathBuf::from("/home/tester/.config/chain-link")
        );
        assert_eq!(expand_home("/tmp/out"), PathBuf::from("/tmp/out"));
        assert_eq!(expand_home("~other/x"), PathBuf::from("~other/x"));
    }
}
