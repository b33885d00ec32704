//! Cluster-operator status snapshot
//!
//! A YAML capture of operator status conditions, standing in for live
//! cluster API queries. [`SnapshotProbe`] answers the executor's
//! `present` / `check` calls from it.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CheckError;
use crate::probe::{ComponentProbe, Health, ProbeError};

pub const CONDITION_AVAILABLE: &str = "Available";
pub const CONDITION_DEGRADED: &str = "Degraded";
pub const CONDITION_PROGRESSING: &str = "Progressing";

/// Condition status as reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// One status condition of an operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Condition {
    /// `Type=Status (reason: R): message`, omitting absent parts
    pub fn describe(&self) -> String {
        let mut out = format!("{}={:?}", self.condition_type, self.status);
        if let Some(reason) = &self.reason {
            out.push_str(&format!(" (reason: {reason})"));
        }
        if let Some(message) = &self.message {
            out.push_str(&format!(": {message}"));
        }
        out
    }
}

/// Status of one cluster operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorStatus {
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl OperatorStatus {
    pub fn condition(&self, condition_type: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.condition_type == condition_type)
    }

    fn condition_is(&self, condition_type: &str, status: ConditionStatus) -> bool {
        self.condition(condition_type).is_some_and(|c| c.status == status)
    }

    /// Available=True
    pub fn is_available(&self) -> bool {
        self.condition_is(CONDITION_AVAILABLE, ConditionStatus::True)
    }

    /// Degraded=True
    pub fn is_degraded(&self) -> bool {
        self.condition_is(CONDITION_DEGRADED, ConditionStatus::True)
    }

    /// Progressing=True
    pub fn is_progressing(&self) -> bool {
        self.condition_is(CONDITION_PROGRESSING, ConditionStatus::True)
    }
}

/// Which conditions count against an operator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthPolicy {
    /// Treat Progressing=True as healthy
    pub allow_progressing: bool,
}

impl HealthPolicy {
    /// Healthy iff available, not degraded and (unless allowed) not progressing
    pub fn evaluate(&self, operator: &OperatorStatus) -> Health {
        if operator.conditions.is_empty() {
            return Health::Unhealthy("no status conditions reported".to_string());
        }

        let mut problems = Vec::new();
        match operator.condition(CONDITION_AVAILABLE) {
            Some(c) if c.status == ConditionStatus::True => {}
            Some(c) => problems.push(c.describe()),
            None => problems.push(format!("{CONDITION_AVAILABLE} condition missing")),
        }
        if let Some(c) = operator.condition(CONDITION_DEGRADED).filter(|c| c.status == ConditionStatus::True) {
            problems.push(c.describe());
        }
        if !self.allow_progressing {
            if let Some(c) = operator
                .condition(CONDITION_PROGRESSING)
                .filter(|c| c.status == ConditionStatus::True)
            {
                problems.push(c.describe());
            }
        }

        if problems.is_empty() {
            Health::Healthy
        } else {
            Health::Unhealthy(problems.join("; "))
        }
    }
}

/// Captured operator statuses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterSnapshot {
    #[serde(default)]
    pub operators: Vec<OperatorStatus>,
}

impl ClusterSnapshot {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_file(path: &Path) -> Result<Self, CheckError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml).map_err(|source| CheckError::SnapshotParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn operator_names(&self) -> impl Iterator<Item = &str> {
        self.operators.iter().map(|o| o.name.as_str())
    }
}

/// Probe answering from a snapshot under a health policy
pub struct SnapshotProbe {
    operators: HashMap<String, OperatorStatus>,
    policy: HealthPolicy,
}

impl SnapshotProbe {
    /// Later entries win when a name appears twice
    pub fn new(snapshot: ClusterSnapshot, policy: HealthPolicy) -> Self {
        let operators = snapshot
            .operators
            .into_iter()
            .map(|o| (o.name.clone(), o))
            .collect();
        Self { operators, policy }
    }
}

impl ComponentProbe for SnapshotProbe {
    fn present(&self, id: &str) -> Result<bool, ProbeError> {
        Ok(self.operators.contains_key(id))
    }

    fn check(&self, id: &str) -> Result<Health, ProbeError> {
        self.operators
            .get(id)
            .map(|operator| self.policy.evaluate(operator))
            .ok_or_else(|| ProbeError::new(format!("operator '{id}' disappeared from snapshot")))
    }
}
