// Path: crates/cli/src/config.rs

//! The persisted CLI configuration file.
//!
//! Values are resolved per key with the precedence: explicit flag, then the
//! value stored in the file, then the built-in default. When the file does not
//! exist it is created with the resolved values.

use chainlink_orchestrator::planner::{
    PlanSpec, DEFAULT_IMAGE, DEFAULT_INSTANCES, DEFAULT_NAMESPACE, DEFAULT_PROBER_INTERVAL_SECS,
};
use chainlink_orchestrator::render::expand_home;
use chainlink_types::config::DEFAULT_CHAIN_NAME;
use chainlink_types::error::OrchestratorError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "~/.config/chain-link/chain-link-cli.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "~/.config/chain-link/manifests";

/// The resolved settings every action runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    pub instances: usize,
    pub namespace: String,
    pub chain_link_image: String,
    /// Seconds the prober sleeps between requests.
    pub sleep_time: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            instances: DEFAULT_INSTANCES,
            namespace: DEFAULT_NAMESPACE.to_string(),
            chain_link_image: DEFAULT_IMAGE.to_string(),
            sleep_time: DEFAULT_PROBER_INTERVAL_SECS,
        }
    }
}

/// The file form. Every key is optional so a partial file still loads.
#[derive(Debug, Default, Deserialize)]
struct StoredConfig {
    instances: Option<usize>,
    namespace: Option<String>,
    chain_link_image: Option<String>,
    sleep_time: Option<u64>,
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub instances: Option<usize>,
    pub namespace: Option<String>,
    pub chain_link_image: Option<String>,
    pub sleep_time: Option<u64>,
}

impl CliConfig {
    fn merge(overrides: &ConfigOverrides, stored: StoredConfig) -> Self {
        let defaults = Self::default();
        Self {
            instances: overrides
                .instances
                .or(stored.instances)
                .unwrap_or(defaults.instances),
            namespace: overrides
                .namespace
                .clone()
                .or(stored.namespace)
                .unwrap_or(defaults.namespace),
            chain_link_image: overrides
                .chain_link_image
                .clone()
                .or(stored.chain_link_image)
                .unwrap_or(defaults.chain_link_image),
            sleep_time: overrides
                .sleep_time
                .or(stored.sleep_time)
                .unwrap_or(defaults.sleep_time),
        }
    }

    /// Resolves the configuration against the file at `path`, creating the
    /// file when it is missing.
    pub fn resolve(path: &Path, overrides: &ConfigOverrides) -> Result<Self, OrchestratorError> {
        if path.exists() {
            tracing::warn!(target: "cli", "Using existing config file: {}", path.display());
            let raw = std::fs::read_to_string(path).map_err(|e| {
                OrchestratorError::ConfigurationInvalid(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let stored: StoredConfig = toml::from_str(&raw).map_err(|e| {
                OrchestratorError::ConfigurationInvalid(format!(
                    "malformed config file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            return Ok(Self::merge(overrides, stored));
        }

        tracing::warn!(target: "cli", "Config file does not exist, creating one now");
        let config = Self::merge(overrides, StoredConfig::default());
        config.save(path)?;
        tracing::info!(target: "cli", "Created config file: {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), OrchestratorError> {
        let invalid = |e: String| OrchestratorError::ConfigurationInvalid(e);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| invalid(format!("cannot create {}: {}", dir.display(), e)))?;
        }
        let contents = toml::to_string_pretty(self).map_err(|e| invalid(e.to_string()))?;
        std::fs::write(path, contents)
            .map_err(|e| invalid(format!("cannot write {}: {}", path.display(), e)))
    }

    /// Logs the settings the action is about to run with.
    pub fn log(&self) {
        tracing::info!(target: "cli", "Using the following configuration...");
        tracing::info!(target: "cli", "Number of instances: {}", self.instances);
        tracing::info!(target: "cli", "Namespace: {}", self.namespace);
        tracing::info!(target: "cli", "ChainLink image: {}", self.chain_link_image);
        tracing::info!(target: "cli", "Loadgenerator sleep time: {}", self.sleep_time);
    }

    pub fn plan_spec(&self) -> PlanSpec {
        PlanSpec::default()
            .with_chain_name(DEFAULT_CHAIN_NAME)
            .with_instances(self.instances)
            .with_image(self.chain_link_image.clone())
            .with_namespace(self.namespace.clone())
            .with_prober_interval(self.sleep_time)
    }
}

/// The config file to use: the one given, or the default under `$HOME`.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    expand_home(explicit.unwrap_or(DEFAULT_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chain-link-cli.toml");

        let config = CliConfig::resolve(&path, &ConfigOverrides::default()).unwrap();

        assert_eq!(config, CliConfig::default());
        let stored: CliConfig = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored, config);
    }

    #[test]
    fn created_file_keeps_explicit_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        let overrides = ConfigOverrides {
            instances: Some(5),
            ..Default::default()
        };

        CliConfig::resolve(&path, &overrides).unwrap();
        let reread = CliConfig::resolve(&path, &ConfigOverrides::default()).unwrap();

        assert_eq!(reread.instances, 5);
        assert_eq!(reread.namespace, "chain-link");
    }

    #[test]
    fn flag_beats_file_beats_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(&path, "instances = 7\nnamespace = \"from-file\"\n").unwrap();
        let overrides = ConfigOverrides {
            namespace: Some("from-flag".into()),
            ..Default::default()
        };

        let config = CliConfig::resolve(&path, &overrides).unwrap();

        assert_eq!(config.instances, 7);
        assert_eq!(config.namespace, "from-flag");
        assert_eq!(config.chain_link_image, DEFAULT_IMAGE);
        assert_eq!(config.sleep_time, 60);
    }

    #[test]
    fn malformed_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(&path, "instances = \"three\"").unwrap();

        let err = CliConfig::resolve(&path, &ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, OrchestratorError::ConfigurationInvalid(_)));
    }

    #[test]
    fn plan_spec_carries_resolved_values() {
        let config = CliConfig {
            instances: 4,
            namespace: "demo".into(),
            chain_link_image: "relay:dev".into(),
            sleep_time: 5,
        };
        let spec = config.plan_spec();
        assert_eq!(spec.chain_name, "chain-link");
        assert_eq!(spec.instance_count, 4);
        assert_eq!(spec.namespace, "demo");
        assert_eq!(spec.image, "relay:dev");
        assert_eq!(spec.prober_interval_secs, 5);
    }

    #[test]
    fn explicit_config_path_is_used_verbatim() {
        assert_eq!(config_path(Some("/etc/cl.toml")), PathBuf::from("/etc/cl.toml"));
    }
}
