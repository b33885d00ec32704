//! opcheck - dependency-ordered health checks for cluster operators
//!
//! Expands a hand-authored dependency table, orders components so every
//! dependency is checked first, and skips components whose prerequisites
//! already failed.

pub mod component;
pub mod config;
pub mod deps;
pub mod error;
pub mod executor;
pub mod expand;
pub mod outcome;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod snapshot;
pub mod topo;

pub use component::ComponentId;
pub use config::DependencyConfig;
pub use deps::DependencyMap;
pub use error::{CheckError, FixSuggestion};
pub use executor::CascadeExecutor;
pub use expand::expand;
pub use outcome::{OutcomeKind, OutcomeRecord, OutcomeReport, OutcomeSummary};
pub use pipeline::{ExecutionPlan, HealthValidation};
pub use probe::{ComponentProbe, FnProbe, Health, ProbeError};
pub use report::JunitReport;
pub use snapshot::{ClusterSnapshot, HealthPolicy, SnapshotProbe};
pub use topo::sort;
