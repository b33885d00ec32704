//! Outcome records and their aggregation
//!
//! Records are append-only: once the executor pushes a record it is never
//! revised, and the report keeps them in visit order.

use std::fmt;

use serde::Serialize;

use crate::component::ComponentId;

/// Classification of one component in one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    Passed,
    Failed,
    /// Component not present in the environment
    SkippedMissing,
    /// A (transitive) dependency failed earlier in the run
    SkippedDependencyFailed,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 4] = [
        OutcomeKind::Passed,
        OutcomeKind::Failed,
        OutcomeKind::SkippedMissing,
        OutcomeKind::SkippedDependencyFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Passed => "passed",
            OutcomeKind::Failed => "failed",
            OutcomeKind::SkippedMissing => "skipped-missing",
            OutcomeKind::SkippedDependencyFailed => "skipped-dependency-failed",
        }
    }

    #[inline]
    pub fn is_skip(&self) -> bool {
        matches!(self, OutcomeKind::SkippedMissing | OutcomeKind::SkippedDependencyFailed)
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable outcome of one visited component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeRecord {
    component: ComponentId,
    kind: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostic: Option<String>,
}

impl OutcomeRecord {
    pub fn new(component: ComponentId, kind: OutcomeKind, diagnostic: Option<String>) -> Self {
        Self { component, kind, diagnostic }
    }

    pub fn passed(component: ComponentId) -> Self {
        Self::new(component, OutcomeKind::Passed, None)
    }

    pub fn failed(component: ComponentId, diagnostic: impl Into<String>) -> Self {
        Self::new(component, OutcomeKind::Failed, Some(diagnostic.into()))
    }

    pub fn component(&self) -> &ComponentId {
        &self.component
    }

    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }
}

/// Ordered, append-only collection of outcome records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeReport {
    records: Vec<OutcomeRecord>,
}

impl OutcomeReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: OutcomeRecord) {
        self.records.push(record);
    }

    /// Records in the order components were visited
    pub fn records(&self) -> &[OutcomeRecord] {
        &self.records
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }

    pub fn passed(&self) -> usize {
        self.count(OutcomeKind::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(OutcomeKind::Failed)
    }

    /// Both skip kinds together
    pub fn skipped(&self) -> usize {
        self.records.iter().filter(|r| r.kind.is_skip()).count()
    }

    /// True when no component failed
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Record for `component`, if it was visited
    pub fn get(&self, component: &str) -> Option<&OutcomeRecord> {
        self.records.iter().find(|r| r.component.as_ref() == component)
    }

    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary {
            total: self.total(),
            passed: self.passed(),
            failed: self.failed(),
            skipped_missing: self.count(OutcomeKind::SkippedMissing),
            skipped_dependency_failed: self.count(OutcomeKind::SkippedDependencyFailed),
        }
    }
}

impl<'a> IntoIterator for &'a OutcomeReport {
    type Item = &'a OutcomeRecord;
    type IntoIter = std::slice::Iter<'a, OutcomeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Counts by outcome kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutcomeSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped_missing: usize,
    pub skipped_dependency_failed: usize,
}

impl fmt::Display for OutcomeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} skipped ({} missing, {} dependency failed)",
            self.passed,
            self.failed,
            self.skipped_missing + self.skipped_dependency_failed,
            self.skipped_missing,
            self.skipped_dependency_failed
        )
    }
}
