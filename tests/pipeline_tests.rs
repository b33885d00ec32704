//! # Pipeline Tests
//!
//! End-to-end runs of expand → sort → cascading checks through the public API:
//! - ordering of simple chains
//! - cycle detection aborting the run
//! - failure cascades, including through diamonds
//! - missing components not cascading
//! - repeat runs producing identical reports

use std::cell::RefCell;
use std::collections::HashSet;

use opcheck::{
    CheckError, ComponentId, DependencyMap, FnProbe, Health, HealthValidation, OutcomeKind,
    OutcomeReport, ProbeError,
};

// ============================================================================
// TEST HELPERS
// ============================================================================

fn map(entries: Vec<(&str, Vec<&str>)>) -> DependencyMap {
    entries.into_iter().collect()
}

fn names(order: &[ComponentId]) -> Vec<&str> {
    order.iter().map(|id| id.as_ref()).collect()
}

/// Run with every component present and `failing` reporting unhealthy
fn run_with_failures(direct: DependencyMap, failing: &[&str]) -> OutcomeReport {
    let failing: HashSet<String> = failing.iter().map(|s| s.to_string()).collect();
    let probe = FnProbe::new(
        |_: &str| Ok(true),
        |id: &str| {
            if failing.contains(id) {
                Ok(Health::Unhealthy(format!("{id} unhealthy")))
            } else {
                Ok(Health::Healthy)
            }
        },
    );
    HealthValidation::new(direct).run(&probe).unwrap()
}

fn kind_of(report: &OutcomeReport, id: &str) -> OutcomeKind {
    report.get(id).unwrap_or_else(|| panic!("{id} not visited")).kind()
}

// ============================================================================
// ORDERING
// ============================================================================

#[test]
fn simple_chain_expands_and_sorts() {
    let direct = map(vec![("a", vec![]), ("b", vec!["a"]), ("c", vec!["a", "b"])]);
    let plan = HealthValidation::new(direct).plan().unwrap();

    assert!(plan.expanded.get("a").is_empty());
    assert_eq!(names(plan.expanded.get("b")), vec!["a"]);
    assert_eq!(names(plan.expanded.get("c")), vec!["a", "b"]);
    assert_eq!(names(&plan.order), vec!["a", "b", "c"]);
}

#[test]
fn builtin_table_orders_etcd_before_apiservers() {
    let direct = opcheck::DependencyConfig::builtin().unwrap().to_dependency_map().unwrap();
    let plan = HealthValidation::new(direct).plan().unwrap();
    let position = |id: &str| plan.order.iter().position(|o| o.as_ref() == id).unwrap();

    assert!(position("etcd") < position("kube-apiserver"));
    assert!(position("kube-apiserver") < position("openshift-apiserver"));
    assert!(position("ingress") < position("authentication"));
    assert!(position("authentication") < position("console"));
}

// ============================================================================
// CYCLES
// ============================================================================

#[test]
fn cycle_is_fatal_and_nothing_is_checked() {
    let direct = map(vec![("a", vec!["b"]), ("b", vec!["a"])]);
    let calls = RefCell::new(0);
    let probe = FnProbe::new(
        |_: &str| {
            *calls.borrow_mut() += 1;
            Ok(true)
        },
        |_: &str| -> Result<Health, ProbeError> {
            *calls.borrow_mut() += 1;
            Ok(Health::Healthy)
        },
    );

    let err = HealthValidation::new(direct).run(&probe).unwrap_err();
    assert!(matches!(err, CheckError::DependencyCycle { .. }));
    assert!(err.to_string().contains("a → b → a"));
    assert_eq!(*calls.borrow(), 0);
}

// ============================================================================
// CASCADES
// ============================================================================

#[test]
fn failed_root_skips_all_dependents() {
    let direct = map(vec![("a", vec![]), ("b", vec!["a"]), ("c", vec!["a", "b"])]);
    let report = run_with_failures(direct, &["a"]);

    assert_eq!(kind_of(&report, "a"), OutcomeKind::Failed);
    assert_eq!(kind_of(&report, "b"), OutcomeKind::SkippedDependencyFailed);
    assert_eq!(kind_of(&report, "c"), OutcomeKind::SkippedDependencyFailed);
    assert_eq!(report.summary().skipped_dependency_failed, 2);
}

#[test]
fn absent_dependency_does_not_skip_dependent() {
    let direct = map(vec![("b", vec!["a"])]);
    let probe = FnProbe::new(|id: &str| Ok(id != "a"), |_: &str| Ok(Health::Healthy));
    let report = HealthValidation::new(direct).run(&probe).unwrap();

    assert_eq!(kind_of(&report, "a"), OutcomeKind::SkippedMissing);
    assert_eq!(kind_of(&report, "b"), OutcomeKind::Passed);
}

#[test]
fn absent_dependency_dependent_can_still_fail() {
    let direct = map(vec![("b", vec!["a"])]);
    let probe = FnProbe::new(
        |id: &str| Ok(id != "a"),
        |_: &str| Ok(Health::Unhealthy("Degraded=True".to_string())),
    );
    let report = HealthValidation::new(direct).run(&probe).unwrap();

    assert_eq!(kind_of(&report, "a"), OutcomeKind::SkippedMissing);
    assert_eq!(kind_of(&report, "b"), OutcomeKind::Failed);
}

#[test]
fn diamond_cites_the_failed_ancestor() {
    let direct = map(vec![("d", vec!["b", "c"]), ("b", vec!["a"]), ("c", vec!["a"]), ("a", vec![])]);
    let report = run_with_failures(direct, &["a"]);

    let d = report.get("d").unwrap();
    assert_eq!(d.kind(), OutcomeKind::SkippedDependencyFailed);
    assert_eq!(d.diagnostic(), Some("dependency 'a' failed, skipping"));
    assert_eq!(kind_of(&report, "b"), OutcomeKind::SkippedDependencyFailed);
    assert_eq!(kind_of(&report, "c"), OutcomeKind::SkippedDependencyFailed);
}

#[test]
fn mid_chain_failure_leaves_upstream_passing() {
    let direct = map(vec![("b", vec!["a"]), ("c", vec!["b"]), ("x", vec!["a"])]);
    let report = run_with_failures(direct, &["b"]);

    assert_eq!(kind_of(&report, "a"), OutcomeKind::Passed);
    assert_eq!(kind_of(&report, "b"), OutcomeKind::Failed);
    assert_eq!(kind_of(&report, "c"), OutcomeKind::SkippedDependencyFailed);
    assert_eq!(kind_of(&report, "x"), OutcomeKind::Passed);
}

// ============================================================================
// DETERMINISM
// ============================================================================

#[test]
fn repeated_runs_are_identical() {
    let direct = opcheck::DependencyConfig::builtin().unwrap().to_dependency_map().unwrap();
    let first = run_with_failures(direct.clone(), &["network", "storage"]);
    let second = run_with_failures(direct, &["network", "storage"]);
    assert_eq!(first, second);
    assert!(!first.is_success());
}
