//! Error types with fix suggestions

use std::path::PathBuf;

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Ordering errors (OPC-010)
    // ─────────────────────────────────────────────────────────────

    #[error("OPC-010: Dependency cycle: {cycle} (unresolved: {})", .unresolved.join(", "))]
    DependencyCycle {
        cycle: String,
        unresolved: Vec<String>,
    },

    // ─────────────────────────────────────────────────────────────
    // Configuration validation errors (OPC-020 to OPC-021)
    // ─────────────────────────────────────────────────────────────

    #[error("OPC-020: Invalid component id '{id}'")]
    InvalidComponentId { id: String },

    #[error("OPC-021: Component '{id}' lists itself as a dependency")]
    SelfDependency { id: String },

    // ─────────────────────────────────────────────────────────────
    // File loading errors (OPC-030 to OPC-032)
    // ─────────────────────────────────────────────────────────────

    #[error("OPC-030: Dependency config parse error in {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("OPC-031: Status snapshot parse error in {}: {source}", .path.display())]
    SnapshotParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("OPC-032: Invalid fragment pattern: {0}")]
    FragmentGlob(String),

    // ─────────────────────────────────────────────────────────────
    // Report errors (OPC-040)
    // ─────────────────────────────────────────────────────────────

    #[error("OPC-040: Failed to write JUnit report: {0}")]
    Report(String),
}

impl FixSuggestion for CheckError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            CheckError::Io(_) => Some("Check file path and permissions"),
            CheckError::DependencyCycle { .. } => {
                Some("Remove one edge of the reported cycle from the dependency config")
            }
            CheckError::InvalidComponentId { .. } => {
                Some("Use lowercase names: letters, digits, '-' and '.' (e.g. kube-apiserver)")
            }
            CheckError::SelfDependency { .. } => {
                Some("Drop the component from its own dependency list")
            }
            CheckError::ConfigParse { .. } => {
                Some("Expected a top-level 'dependencies:' map of name -> [names]")
            }
            CheckError::SnapshotParse { .. } => {
                Some("Expected a top-level 'operators:' list with name and conditions")
            }
            CheckError::FragmentGlob(_) => Some("Check the --deps-dir path"),
            CheckError::Report(_) => Some("Check the --junit output path is writable"),
        }
    }
}
