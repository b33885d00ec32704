//! Dependency configuration loading
//!
//! The dependency table is an explicit value handed to the pipeline. It comes
//! from a YAML file, from `*.deps.yaml` fragments in a directory, or from the
//! built-in cluster-operator table.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::component::validate_id;
use crate::deps::DependencyMap;
use crate::error::CheckError;

/// File name pattern for dependency fragments
pub const FRAGMENT_PATTERN: &str = "*.deps.yaml";

/// Default dependency table for OpenShift cluster operators
const BUILTIN_DEPENDENCIES: &str = r#"
dependencies:
  etcd: []
  kube-apiserver: [etcd]
  kube-controller-manager: [kube-apiserver]
  kube-scheduler: [kube-apiserver]
  openshift-apiserver: [etcd, kube-apiserver]
  openshift-controller-manager: [openshift-apiserver]
  service-ca: [kube-apiserver]
  network: [kube-apiserver]
  dns: [network]
  ingress: [dns, network]
  authentication: [ingress, openshift-apiserver]
  console: [authentication, ingress]
  storage: [kube-apiserver]
  csi-snapshot-controller: [storage]
  image-registry: [openshift-apiserver, storage]
  monitoring: [ingress, storage]
  machine-api: [kube-apiserver]
  machine-config: [kube-apiserver, machine-api]
  baremetal: [machine-api]
  cloud-credential: [kube-apiserver]
  node-tuning: [kube-apiserver]
  operator-lifecycle-manager: [openshift-apiserver]
  marketplace: [operator-lifecycle-manager]
  insights: [openshift-apiserver]
"#;

/// Hand-authored direct dependency table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyConfig {
    #[serde(default)]
    pub dependencies: BTreeMap<String, Vec<String>>,
}

impl DependencyConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, CheckError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml).map_err(|source| CheckError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The built-in cluster-operator table
    pub fn builtin() -> Result<Self, CheckError> {
        Self::from_yaml(BUILTIN_DEPENDENCIES).map_err(|source| CheckError::ConfigParse {
            path: PathBuf::from("<builtin>"),
            source,
        })
    }

    /// Union `other` into this table, key by key
    pub fn merge(&mut self, other: DependencyConfig) {
        for (id, deps) in other.dependencies {
            let entry = self.dependencies.entry(id).or_default();
            let merged: BTreeSet<String> = entry.drain(..).chain(deps).collect();
            entry.extend(merged);
        }
    }

    /// Merge every `*.deps.yaml` file in `dir`, in path order
    ///
    /// A missing directory contributes nothing. Returns the number of files merged.
    pub fn merge_fragments(&mut self, dir: &Path) -> Result<usize, CheckError> {
        if !dir.is_dir() {
            return Ok(0);
        }

        let pattern = dir.join(FRAGMENT_PATTERN).to_string_lossy().to_string();
        let entries = glob::glob(&pattern).map_err(|e| CheckError::FragmentGlob(e.to_string()))?;

        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry.map_err(|e| CheckError::FragmentGlob(e.to_string()))?);
        }
        paths.sort();

        for path in &paths {
            debug!(fragment = %path.display(), "merging dependency fragment");
            let fragment = Self::from_file(path)?;
            self.merge(fragment);
        }

        Ok(paths.len())
    }

    /// Check identifiers and reject self-dependencies
    pub fn validate(&self) -> Result<(), CheckError> {
        for (id, deps) in &self.dependencies {
            validate_id(id)?;
            for dep in deps {
                validate_id(dep)?;
                if dep == id {
                    return Err(CheckError::SelfDependency { id: id.clone() });
                }
            }
        }
        Ok(())
    }

    /// Validate and convert into the direct map the pipeline consumes
    pub fn to_dependency_map(&self) -> Result<DependencyMap, CheckError> {
        self.validate()?;
        Ok(self
            .dependencies
            .iter()
            .map(|(id, deps)| (id.as_str(), deps.iter().map(String::as_str)))
            .collect())
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_dependency_table() {
        let config = DependencyConfig::from_yaml(
            r#"
dependencies:
  kube-apiserver: [etcd]
  console: [authentication, ingress, ingress]
"#,
        )
        .unwrap();
        let map = config.to_dependency_map().unwrap();
        let console: Vec<&str> = map.get("console").iter().map(|d| d.as_ref()).collect();
        assert_eq!(console, vec!["authentication", "ingress"]);
    }

    #[test]
    fn empty_document_field_defaults() {
        let config = DependencyConfig::from_yaml("dependencies: {}").unwrap();
        assert!(config.to_dependency_map().unwrap().is_empty());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(DependencyConfig::from_yaml("deps:\n  a: [b]\n").is_err());
    }

    #[test]
    fn rejects_invalid_ids() {
        let config = DependencyConfig::from_yaml("dependencies:\n  Console: [ingress]\n").unwrap();
        assert!(matches!(
            config.to_dependency_map(),
            Err(CheckError::InvalidComponentId { id }) if id == "Console"
        ));
    }

    #[test]
    fn rejects_self_dependency() {
        let config = DependencyConfig::from_yaml("dependencies:\n  dns: [dns]\n").unwrap();
        assert!(matches!(config.validate(), Err(CheckError::SelfDependency { id }) if id == "dns"));
    }

    #[test]
    fn builtin_table_is_valid_and_acyclic() {
        let config = DependencyConfig::builtin().unwrap();
        let map = config.to_dependency_map().unwrap();
        assert!(map.contains_key("kube-apiserver"));
        let expanded = crate::expand::expand(&map);
        assert!(crate::topo::sort(&expanded.universe(), &expanded).is_ok());
    }

    #[test]
    fn merge_unions_dependencies() {
        let mut base = DependencyConfig::from_yaml("dependencies:\n  ingress: [network]\n").unwrap();
        let extra =
            DependencyConfig::from_yaml("dependencies:\n  ingress: [dns, network]\n  dns: [network]\n").unwrap();
        base.merge(extra);
        assert_eq!(base.dependencies["ingress"], vec!["dns", "network"]);
        assert_eq!(base.dependencies["dns"], vec!["network"]);
    }

    #[test]
    fn merges_fragments_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("10-net.deps.yaml"), "dependencies:\n  dns: [network]\n").unwrap();
        fs::write(temp_dir.path().join("20-ui.deps.yaml"), "dependencies:\n  console: [dns]\n").unwrap();
        fs::write(temp_dir.path().join("ignored.yaml"), "not: [a, fragment]\n").unwrap();

        let mut config = DependencyConfig::default();
        let merged = config.merge_fragments(temp_dir.path()).unwrap();
        assert_eq!(merged, 2);
        assert_eq!(config.dependencies.len(), 2);
    }

    #[test]
    fn missing_fragment_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = DependencyConfig::default();
        assert_eq!(config.merge_fragments(&temp_dir.path().join("nope")).unwrap(), 0);
    }

    #[test]
    fn bad_fragment_reports_its_path() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.deps.yaml"), "dependencies: [oops").unwrap();
        let mut config = DependencyConfig::default();
        let err = config.merge_fragments(temp_dir.path()).unwrap_err();
        assert!(matches!(err, CheckError::ConfigParse { .. }));
        assert!(err.to_string().contains("bad.deps.yaml"));
    }

    #[test]
    fn yaml_round_trips_through_to_yaml() {
        let config = DependencyConfig::builtin().unwrap();
        let again = DependencyConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(config, again);
    }
}
