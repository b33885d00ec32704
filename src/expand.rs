//! Dependency expansion
//!
//! Closes a hand-authored direct map under transitivity. Every identifier
//! referenced anywhere in the direct map becomes a key of the result; pure
//! leaves map to an empty list.
//!
//! Malformed (cyclic) input is tolerated here: the visited set makes the
//! traversal total, and cycles are reported later by [`crate::topo::sort`].

use std::collections::BTreeSet;

use tracing::debug;

use crate::component::ComponentId;
use crate::deps::DependencyMap;

/// Expand `direct` into the full transitive dependency map
pub fn expand(direct: &DependencyMap) -> DependencyMap {
    let mut expanded = DependencyMap::new();

    for id in direct.universe() {
        if direct.contains_key(&id) {
            let reachable = transitive_dependencies(&id, direct);
            expanded.insert(id, reachable);
        } else {
            expanded.ensure_component(id);
        }
    }

    debug!(
        components = expanded.len(),
        edges = expanded.edge_count(),
        "expanded dependency map"
    );
    expanded
}

/// Every node reachable from `start` by one or more direct edges, excluding `start`
///
/// Depth-first with an explicit stack so deep chains cannot exhaust the call stack.
pub fn transitive_dependencies(start: &str, direct: &DependencyMap) -> BTreeSet<ComponentId> {
    let mut visited: BTreeSet<ComponentId> = BTreeSet::new();
    let mut stack: Vec<&ComponentId> = direct.get(start).iter().rev().collect();

    while let Some(node) = stack.pop() {
        if !visited.insert(node.clone()) {
            continue;
        }
        stack.extend(direct.get(node).iter().rev().filter(|d| !visited.contains(*d)));
    }

    visited.remove(start);
    visited
}
