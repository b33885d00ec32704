//! Cascading validation
//!
//! Walks a topological order and checks each component, skipping any
//! component whose (transitive) dependency has already failed in this run.
//! Probe errors become `failed` outcomes; nothing here aborts a run.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, warn};

use crate::component::ComponentId;
use crate::deps::DependencyMap;
use crate::outcome::{OutcomeKind, OutcomeRecord, OutcomeReport};
use crate::probe::{ComponentProbe, Health};

/// Diagnostic for components the probe reports as absent
pub const MISSING_DIAGNOSTIC: &str = "component not found, skipping";

/// Single-run executor owning the failure set
///
/// The failure set only grows and is dropped with the executor, so separate
/// runs never share state. Components skipped because of a failure remember
/// the failed ancestor, so a direct (unexpanded) map still cascades.
pub struct CascadeExecutor<'a, P: ?Sized> {
    deps: &'a DependencyMap,
    probe: &'a P,
    failed: HashSet<ComponentId>,
    blocked: HashMap<ComponentId, ComponentId>,
    report: OutcomeReport,
}

impl<'a, P: ComponentProbe + ?Sized> CascadeExecutor<'a, P> {
    /// `deps` may be direct or expanded; with the expanded map the cited
    /// dependency is the first failed one in sorted order
    pub fn new(deps: &'a DependencyMap, probe: &'a P) -> Self {
        Self {
            deps,
            probe,
            failed: HashSet::new(),
            blocked: HashMap::new(),
            report: OutcomeReport::new(),
        }
    }

    /// Visit every component of `order`, in sequence
    #[instrument(skip_all, fields(components = order.len()))]
    pub fn run(mut self, order: &[ComponentId]) -> OutcomeReport {
        for id in order {
            let record = self.visit(id);
            debug!(component = %id, outcome = %record.kind(), "visited component");
            self.report.push(record);
        }
        self.report
    }

    fn visit(&mut self, id: &ComponentId) -> OutcomeRecord {
        match self.probe.present(id) {
            Ok(true) => {}
            Ok(false) => {
                return OutcomeRecord::new(
                    id.clone(),
                    OutcomeKind::SkippedMissing,
                    Some(MISSING_DIAGNOSTIC.to_string()),
                );
            }
            Err(e) => {
                return self.fail(id, format!("existence probe failed: {e}"));
            }
        }

        if let Some(dep) = self.failed_ancestor(id) {
            warn!(component = %id, dependency = %dep, "skipping, dependency failed");
            self.blocked.insert(id.clone(), dep.clone());
            return OutcomeRecord::new(
                id.clone(),
                OutcomeKind::SkippedDependencyFailed,
                Some(format!("dependency '{dep}' failed, skipping")),
            );
        }

        match self.probe.check(id) {
            Ok(Health::Healthy) => OutcomeRecord::passed(id.clone()),
            Ok(Health::Unhealthy(diagnostic)) => self.fail(id, diagnostic),
            Err(e) => self.fail(id, format!("health check failed: {e}")),
        }
    }

    /// First failed dependency in sorted order, else the ancestor that made
    /// a dependency skip
    fn failed_ancestor(&self, id: &str) -> Option<ComponentId> {
        let deps = self.deps.get(id);
        deps.iter()
            .find(|d| self.failed.contains(*d))
            .or_else(|| deps.iter().find_map(|d| self.blocked.get(d)))
            .cloned()
    }

    fn fail(&mut self, id: &ComponentId, diagnostic: String) -> OutcomeRecord {
        warn!(component = %id, diagnostic = diagnostic.as_str(), "component failed");
        self.failed.insert(id.clone());
        OutcomeRecord::failed(id.clone(), diagnostic)
    }
}

/// Run one cascading pass over `order`
///
/// `order` must list every dependency before its dependents. Pass the
/// expanded map when diagnostics should cite the first failed dependency in
/// sorted order rather than the nearest skipped one's cause.
pub fn run<P: ComponentProbe + ?Sized>(
    order: &[ComponentId],
    deps: &DependencyMap,
    probe: &P,
) -> OutcomeReport {
    CascadeExecutor::new(deps, probe).run(order)
}
