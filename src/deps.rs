//! Dependency map shared by the expander, the sorter and the executor
//!
//! The same type carries both variants: the hand-authored *direct* map
//! (possibly incomplete) and the *expanded* map produced by
//! [`crate::expand::expand`], where every referenced component is a key.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::component::ComponentId;

/// Component -> dependencies, with each dependency list sorted and deduplicated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyMap {
    edges: BTreeMap<ComponentId, Vec<ComponentId>>,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add dependencies for `id`, merging with any already recorded
    pub fn insert<I, D>(&mut self, id: impl Into<ComponentId>, deps: I)
    where
        I: IntoIterator<Item = D>,
        D: Into<ComponentId>,
    {
        let entry = self.edges.entry(id.into()).or_default();
        let mut merged: BTreeSet<ComponentId> = entry.drain(..).collect();
        merged.extend(deps.into_iter().map(Into::into));
        entry.extend(merged);
    }

    /// Make sure `id` is a key, with no dependencies if it was absent
    pub fn ensure_component(&mut self, id: impl Into<ComponentId>) {
        self.edges.entry(id.into()).or_default();
    }

    /// Union every entry of `other` into this map
    pub fn merge(&mut self, other: &DependencyMap) {
        for (id, deps) in &other.edges {
            self.insert(id.clone(), deps.iter().cloned());
        }
    }

    /// Dependencies of `id` (empty when `id` is not a key)
    #[inline]
    pub fn get(&self, id: &str) -> &[ComponentId] {
        static EMPTY: &[ComponentId] = &[];
        self.edges.get(id).map(|v| v.as_slice()).unwrap_or(EMPTY)
    }

    #[inline]
    pub fn contains_key(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    /// Every identifier appearing as a key or as a dependency, sorted
    pub fn universe(&self) -> Vec<ComponentId> {
        let mut all: BTreeSet<ComponentId> = self.edges.keys().cloned().collect();
        for deps in self.edges.values() {
            all.extend(deps.iter().cloned());
        }
        all.into_iter().collect()
    }

    /// Keys in lexicographic order
    pub fn components(&self) -> impl Iterator<Item = &ComponentId> {
        self.edges.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ComponentId, &[ComponentId])> {
        self.edges.iter().map(|(id, deps)| (id, deps.as_slice()))
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Total number of (component, dependency) edges
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}

impl<K, I, D> FromIterator<(K, I)> for DependencyMap
where
    K: Into<ComponentId>,
    I: IntoIterator<Item = D>,
    D: Into<ComponentId>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut map = DependencyMap::new();
        for (id, deps) in iter {
            map.insert(id, deps);
        }
        map
    }
}
