//! Topological ordering (Kahn's algorithm)
//!
//! Identifiers are mapped to dense indices once, so in-degree bookkeeping and
//! the dependents table are plain vectors.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::component::ComponentId;
use crate::deps::DependencyMap;
use crate::error::CheckError;

/// Order `universe` so every component comes after all of its dependencies
///
/// `universe` is sorted and deduplicated first, which makes the FIFO queue
/// discipline reproducible. Dependencies outside `universe` are treated as
/// already satisfied. Any cycle among `universe` members is fatal.
pub fn sort(universe: &[ComponentId], deps: &DependencyMap) -> Result<Vec<ComponentId>, CheckError> {
    let mut nodes: Vec<&ComponentId> = universe.iter().collect();
    nodes.sort();
    nodes.dedup();

    let index: HashMap<&str, usize> = nodes.iter().enumerate().map(|(i, id)| (id.as_ref(), i)).collect();

    let mut in_degree = vec![0usize; nodes.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];

    for (i, id) in nodes.iter().enumerate() {
        for dep in deps.get(id) {
            if let Some(&d) = index.get(dep.as_ref()) {
                in_degree[i] += 1;
                dependents[d].push(i);
            }
        }
    }

    let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order: Vec<ComponentId> = Vec::with_capacity(nodes.len());

    while let Some(current) = queue.pop_front() {
        order.push(nodes[current].clone());
        for &dependent in &dependents[current] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                queue.push_back(dependent);
            }
        }
    }

    if order.len() < nodes.len() {
        let unresolved: Vec<usize> = (0..nodes.len()).filter(|&i| in_degree[i] > 0).collect();
        let cycle = find_cycle(&unresolved, &nodes, &index, deps);
        debug!(unresolved = unresolved.len(), cycle = cycle.as_str(), "dependency cycle detected");
        return Err(CheckError::DependencyCycle {
            cycle,
            unresolved: unresolved.iter().map(|&i| nodes[i].to_string()).collect(),
        });
    }

    debug!(components = order.len(), "sorted components");
    Ok(order)
}

/// Walk unresolved nodes along unresolved dependencies until one repeats
///
/// Every unresolved node still has an unresolved dependency, so the walk
/// always closes a cycle.
fn find_cycle(
    unresolved: &[usize],
    nodes: &[&ComponentId],
    index: &HashMap<&str, usize>,
    deps: &DependencyMap,
) -> String {
    let mut stuck = vec![false; nodes.len()];
    for &i in unresolved {
        stuck[i] = true;
    }

    let Some(&start) = unresolved.first() else {
        return String::new();
    };

    let mut path: Vec<usize> = Vec::new();
    let mut position: HashMap<usize, usize> = HashMap::new();
    let mut current = start;

    loop {
        if let Some(&at) = position.get(&current) {
            let mut names: Vec<&str> = path[at..].iter().map(|&i| nodes[i].as_ref()).collect();
            names.push(nodes[current].as_ref());
            return names.join(" → ");
        }
        position.insert(current, path.len());
        path.push(current);

        let next = deps
            .get(nodes[current])
            .iter()
            .filter_map(|d| index.get(d.as_ref()).copied())
            .find(|&d| stuck[d]);

        match next {
            Some(n) => current = n,
            None => {
                return path.iter().map(|&i| nodes[i].as_ref()).collect::<Vec<_>>().join(" → ");
            }
        }
    }
}
