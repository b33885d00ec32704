//! Validation pipeline: expand, sort, then run the cascading checks
//!
//! Every phase runs to completion before the next starts. A dependency
//! cycle aborts the pipeline before any probe call.

use serde::Serialize;
use tracing::{info, instrument};

use crate::component::ComponentId;
use crate::deps::DependencyMap;
use crate::error::CheckError;
use crate::executor;
use crate::expand::expand;
use crate::outcome::OutcomeReport;
use crate::probe::ComponentProbe;
use crate::topo;

/// Expanded dependencies plus the order components will be visited in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    pub expanded: DependencyMap,
    pub order: Vec<ComponentId>,
}

/// A validation run over an explicit direct dependency map
#[derive(Debug, Clone, Default)]
pub struct HealthValidation {
    direct: DependencyMap,
}

impl HealthValidation {
    pub fn new(direct: DependencyMap) -> Self {
        Self { direct }
    }

    /// Add components with no declared dependencies so they are checked too
    pub fn with_components<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ComponentId>,
    {
        for id in ids {
            self.direct.ensure_component(id);
        }
        self
    }

    pub fn direct(&self) -> &DependencyMap {
        &self.direct
    }

    /// Expand and sort without probing anything
    #[instrument(skip(self), fields(components = self.direct.len()))]
    pub fn plan(&self) -> Result<ExecutionPlan, CheckError> {
        let expanded = expand(&self.direct);
        let universe = expanded.universe();
        info!(universe = universe.len(), "expanded dependency map");

        let order = topo::sort(&universe, &expanded)?;
        info!(order = order.len(), "computed execution order");

        Ok(ExecutionPlan { expanded, order })
    }

    /// Plan, then run the cascading checks against `probe`
    pub fn run<P: ComponentProbe + ?Sized>(&self, probe: &P) -> Result<OutcomeReport, CheckError> {
        let plan = self.plan()?;
        let report = executor::run(&plan.order, &plan.expanded, probe);
        info!(summary = %report.summary(), "validation finished");
        Ok(report)
    }
}
