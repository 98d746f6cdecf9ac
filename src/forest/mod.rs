//! Namespace forest
//!
//! The forest is the in-memory tree-of-trees over every namespace the
//! controller knows about. It is an arena: a flat name → [`Namespace`] table
//! where parent links and the children index are name-keyed lookups through
//! the same table, so no node ever owns another.
//!
//! Invariants held after every successful write:
//! 1. the parent relation is acyclic (no self-parenting)
//! 2. names are unique across the whole forest
//! 3. a node's children index is exactly the set of nodes naming it as parent
//! 4. an excluded namespace never has a parent
//!
//! All state sits behind one reader/writer lock. Readers that need several
//! lookups to agree with each other (the admission validator walking an
//! ancestry chain, for example) take [`Forest::read`] once and keep the guard
//! for the whole traversal.

mod namespace;

pub use namespace::Namespace;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use crate::config::ExcludedNamespaces;

/// Writes the forest refuses because they would break an invariant, and
/// corruption detected while reading
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ForestError {
    /// The named namespace has no node in the forest
    #[error("namespace '{0}' is not in the forest")]
    UnknownNamespace(String),

    /// Setting the parent would close a loop in the hierarchy
    #[error("setting the parent of '{child}' to '{parent}' would create a cycle")]
    Cycle {
        /// Namespace whose parent was being set
        child: String,
        /// Proposed parent
        parent: String,
    },

    /// Excluded namespaces cannot be linked into the hierarchy
    #[error("excluded namespace '{0}' cannot take part in the hierarchy")]
    Excluded(String),

    /// A cycle was found in existing state while walking an ancestry chain
    #[error("cycle detected in the ancestry of '{0}'")]
    CycleDetected(String),

    /// Parent pointers and children index disagree
    #[error("inconsistent hierarchy index at '{0}'")]
    InconsistentIndex(String),
}

/// Restartable iterator over a namespace and its ancestors, nearest first
///
/// The walk is bounded by the number of nodes in the forest, so a corrupted
/// parent chain ends the iteration instead of looping. Use
/// [`ForestState::check_ancestry`] when corruption must be reported.
#[derive(Clone, Debug)]
pub struct Ancestors<'a> {
    state: &'a ForestState,
    next: Option<&'a Namespace>,
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Namespace;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next.take()?;
        self.remaining -= 1;
        self.next = current.parent().and_then(|p| self.state.get(p));
        Some(current)
    }
}

/// The forest's table and its read/write operations
///
/// Only reachable through a [`Forest`] lock guard, so every method here runs
/// inside the forest's critical section.
#[derive(Debug, Default)]
pub struct ForestState {
    namespaces: HashMap<String, Namespace>,
    excluded: Arc<ExcludedNamespaces>,
}

impl ForestState {
    fn new(excluded: Arc<ExcludedNamespaces>) -> Self {
        Self {
            namespaces: HashMap::new(),
            excluded,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Look up a namespace without creating it
    pub fn get(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.get(name)
    }

    /// Returns true if the forest has a node (observed or placeholder) for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.namespaces.contains_key(name)
    }

    /// Number of nodes, placeholders included
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    /// Returns true if the forest holds no nodes
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// All node names, in no particular order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// The excluded namespace set this forest was built with
    pub fn excluded(&self) -> &ExcludedNamespaces {
        &self.excluded
    }

    /// Namespaces without a parent, sorted by name
    pub fn roots(&self) -> Vec<&Namespace> {
        let mut roots: Vec<_> = self.namespaces.values().filter(|ns| ns.is_root()).collect();
        roots.sort_by(|a, b| a.name().cmp(b.name()));
        roots
    }

    /// Direct children of `name`, sorted by name
    pub fn children(&self, name: &str) -> Vec<&Namespace> {
        self.get(name)
            .map(|ns| ns.children().filter_map(|c| self.get(c)).collect())
            .unwrap_or_default()
    }

    /// The namespace itself followed by its ancestors up to the root
    pub fn ancestors(&self, name: &str) -> Ancestors<'_> {
        Ancestors {
            state: self,
            next: self.get(name),
            remaining: self.namespaces.len(),
        }
    }

    /// Like [`ancestors`](Self::ancestors) but reports corrupted chains
    ///
    /// Returns an empty chain for unknown names.
    pub fn check_ancestry(&self, name: &str) -> Result<Vec<&Namespace>, ForestError> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.get(name);

        while let Some(ns) = current {
            if !seen.insert(ns.name()) {
                return Err(ForestError::CycleDetected(name.to_string()));
            }
            chain.push(ns);
            current = match ns.parent() {
                Some(parent) => Some(
                    self.get(parent)
                        .ok_or_else(|| ForestError::InconsistentIndex(ns.name().to_string()))?,
                ),
                None => None,
            };
        }

        Ok(chain)
    }

    /// Returns true if `ancestor` is a strict ancestor of `name`
    pub fn is_ancestor(&self, ancestor: &str, name: &str) -> bool {
        self.ancestors(name).skip(1).any(|ns| ns.name() == ancestor)
    }

    /// Every namespace reachable below `name`, sorted by name
    pub fn descendants(&self, name: &str) -> Vec<&Namespace> {
        let mut found = Vec::new();
        let mut seen = HashSet::from([name]);
        let mut stack: Vec<&str> = self
            .get(name)
            .map(|ns| ns.children().collect())
            .unwrap_or_default();

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(ns) = self.get(current) {
                stack.extend(ns.children());
                found.push(ns);
            }
        }

        found.sort_by(|a, b| a.name().cmp(b.name()));
        found
    }

    /// Check all four forest invariants against the whole table
    pub fn verify(&self) -> Result<(), ForestError> {
        for ns in self.namespaces.values() {
            if let Some(parent) = ns.parent() {
                if ns.is_excluded() {
                    return Err(ForestError::Excluded(ns.name().to_string()));
                }
                let linked = self
                    .get(parent)
                    .is_some_and(|p| p.children.contains(ns.name()));
                if !linked {
                    return Err(ForestError::InconsistentIndex(ns.name().to_string()));
                }
            }
            for child in ns.children() {
                if self.get(child).and_then(Namespace::parent) != Some(ns.name()) {
                    return Err(ForestError::InconsistentIndex(ns.name().to_string()));
                }
            }
            self.check_ancestry(ns.name())?;
        }
        Ok(())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Return the node for `name`, creating a parentless, unowned one if needed
    pub fn get_or_create(&mut self, name: &str) -> &Namespace {
        let excluded = self.excluded.contains(name);
        self.namespaces
            .entry(name.to_string())
            .or_insert_with(|| Namespace::new(name, excluded))
    }

    /// Return the node for a name referenced as a parent, creating a
    /// placeholder that has not been observed in the cluster if needed
    pub fn get_or_create_placeholder(&mut self, name: &str) -> &Namespace {
        let excluded = self.excluded.contains(name);
        self.namespaces
            .entry(name.to_string())
            .or_insert_with(|| Namespace::placeholder(name, excluded))
    }

    /// Mark `name` as observed in the cluster, creating it if needed
    pub fn set_exists(&mut self, name: &str) -> &Namespace {
        let excluded = self.excluded.contains(name);
        let ns = self
            .namespaces
            .entry(name.to_string())
            .or_insert_with(|| Namespace::new(name, excluded));
        ns.exists = true;
        ns
    }

    /// Rewire the hierarchy edge above `child`
    ///
    /// Updates the old parent's children index, the new parent's children
    /// index and the child's parent pointer together. Refuses writes that
    /// would break an invariant; a refused write changes nothing.
    pub fn set_parent(&mut self, child: &str, parent: Option<&str>) -> Result<(), ForestError> {
        let node = self
            .get(child)
            .ok_or_else(|| ForestError::UnknownNamespace(child.to_string()))?;
        if node.parent() == parent {
            return Ok(());
        }

        if let Some(parent) = parent {
            if node.is_excluded() {
                return Err(ForestError::Excluded(child.to_string()));
            }
            let parent_node = self
                .get(parent)
                .ok_or_else(|| ForestError::UnknownNamespace(parent.to_string()))?;
            if parent_node.is_excluded() {
                return Err(ForestError::Excluded(parent.to_string()));
            }
            let closes_loop = parent == child
                || self
                    .check_ancestry(parent)?
                    .iter()
                    .any(|ns| ns.name() == child);
            if closes_loop {
                return Err(ForestError::Cycle {
                    child: child.to_string(),
                    parent: parent.to_string(),
                });
            }
        }

        let old_parent = self.unlink(child);
        if let Some(parent) = parent {
            if let Some(p) = self.namespaces.get_mut(parent) {
                p.children.insert(child.to_string());
            }
            if let Some(c) = self.namespaces.get_mut(child) {
                c.parent = Some(parent.to_string());
            }
        }
        if let Some(old) = old_parent {
            self.prune(&old);
        }
        Ok(())
    }

    /// Mark `name` as an owned subnamespace (or not)
    pub fn set_owned(&mut self, name: &str, owned: bool) -> Result<(), ForestError> {
        self.node_mut(name)?.is_owned = owned;
        Ok(())
    }

    /// Set whether `name` may be deleted together with its subtree
    pub fn set_allow_cascading_delete(&mut self, name: &str, allow: bool) -> Result<(), ForestError> {
        self.node_mut(name)?.allow_cascading_delete = allow;
        Ok(())
    }

    /// Record the parent `name`'s HierarchyConfiguration declares
    ///
    /// Only records the declaration; [`set_parent`](Self::set_parent) moves
    /// the edge.
    pub fn set_declared_parent(&mut self, name: &str, parent: Option<&str>) -> Result<(), ForestError> {
        self.node_mut(name)?.declared_parent = parent.map(String::from);
        Ok(())
    }

    /// Forget a namespace that was deleted from the cluster
    ///
    /// The node is detached from its parent. If other namespaces still name
    /// it as parent it stays behind as a placeholder so their edges remain
    /// indexed; otherwise it leaves the table. Returns false for unknown names.
    pub fn remove(&mut self, name: &str) -> bool {
        if !self.contains(name) {
            return false;
        }

        let old_parent = self.unlink(name);
        if let Some(ns) = self.namespaces.get_mut(name) {
            ns.exists = false;
            ns.is_owned = false;
            ns.allow_cascading_delete = false;
            ns.declared_parent = None;
        }
        self.prune(name);
        if let Some(old) = old_parent {
            self.prune(&old);
        }
        true
    }

    fn node_mut(&mut self, name: &str) -> Result<&mut Namespace, ForestError> {
        self.namespaces
            .get_mut(name)
            .ok_or_else(|| ForestError::UnknownNamespace(name.to_string()))
    }

    /// Clear `child`'s parent pointer and its entry in the parent's index
    fn unlink(&mut self, child: &str) -> Option<String> {
        let old = self.namespaces.get_mut(child)?.parent.take()?;
        if let Some(p) = self.namespaces.get_mut(&old) {
            p.children.remove(child);
        }
        Some(old)
    }

    /// Drop unobserved placeholders that no longer have children
    fn prune(&mut self, name: &str) {
        let mut next = Some(name.to_string());
        while let Some(current) = next.take() {
            let Some(ns) = self.namespaces.get(&current) else {
                break;
            };
            if ns.exists() || ns.has_children() {
                break;
            }
            next = self.unlink(&current);
            self.namespaces.remove(&current);
        }
    }
}

/// Process-wide namespace forest guarded by a single reader/writer lock
///
/// The convenience methods each take the lock once and hand back owned
/// snapshots. Callers that need several operations to observe the same state
/// use [`read`](Self::read) or [`write`](Self::write) and keep the guard.
#[derive(Debug, Default)]
pub struct Forest {
    state: RwLock<ForestState>,
}

impl Forest {
    /// Create an empty forest that treats `excluded` as reserved names
    pub fn new(excluded: Arc<ExcludedNamespaces>) -> Self {
        Self {
            state: RwLock::new(ForestState::new(excluded)),
        }
    }

    /// Acquire the shared read lock
    pub fn read(&self) -> RwLockReadGuard<'_, ForestState> {
        self.state.read()
    }

    /// Acquire the exclusive write lock
    pub fn write(&self) -> RwLockWriteGuard<'_, ForestState> {
        self.state.write()
    }

    /// Return the node for `name`, creating a parentless, unowned one if needed
    pub fn get_or_create(&self, name: &str) -> Namespace {
        self.write().get_or_create(name).clone()
    }

    /// Look up a namespace without creating it
    pub fn get(&self, name: &str) -> Option<Namespace> {
        self.read().get(name).cloned()
    }

    /// Rewire the hierarchy edge above `child`; see [`ForestState::set_parent`]
    pub fn set_parent(&self, child: &str, parent: Option<&str>) -> Result<(), ForestError> {
        self.write().set_parent(child, parent)
    }

    /// Mark `name` as an owned subnamespace (or not)
    pub fn set_owned(&self, name: &str, owned: bool) -> Result<(), ForestError> {
        self.write().set_owned(name, owned)
    }

    /// Set whether `name` may be deleted together with its subtree
    pub fn set_allow_cascading_delete(&self, name: &str, allow: bool) -> Result<(), ForestError> {
        self.write().set_allow_cascading_delete(name, allow)
    }

    /// Mark `name` as observed in the cluster, creating it if needed
    pub fn set_exists(&self, name: &str) -> Namespace {
        self.write().set_exists(name).clone()
    }

    /// Forget a deleted namespace; see [`ForestState::remove`]
    pub fn remove(&self, name: &str) -> bool {
        self.write().remove(name)
    }

    /// Snapshot of `name` and its ancestors, nearest first
    pub fn ancestors(&self, name: &str) -> Vec<Namespace> {
        self.read().ancestors(name).cloned().collect()
    }

    /// Snapshot of every namespace below `name`, sorted by name
    pub fn descendants(&self, name: &str) -> Vec<Namespace> {
        self.read().descendants(name).into_iter().cloned().collect()
    }

    /// Number of nodes, placeholders included
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the forest holds no nodes
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Check all forest invariants
    pub fn verify(&self) -> Result<(), ForestError> {
        self.read().verify()
    }
}

/// Thread-safe shared reference to the forest
pub type SharedForest = Arc<Forest>;

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Test Fixtures
    // =========================================================================

    fn forest() -> Forest {
        Forest::new(Arc::new(ExcludedNamespaces::default()))
    }

    /// root -> team-a -> team-a-dev, root -> team-b
    fn tree() -> Forest {
        let f = forest();
        for name in ["root", "team-a", "team-a-dev", "team-b"] {
            f.get_or_create(name);
        }
        f.set_parent("team-a", Some("root")).unwrap();
        f.set_parent("team-a-dev", Some("team-a")).unwrap();
        f.set_parent("team-b", Some("root")).unwrap();
        f
    }

    fn names(nodes: &[Namespace]) -> Vec<&str> {
        nodes.iter().map(Namespace::name).collect()
    }

    // =========================================================================
    // Basic Operations Tests
    // =========================================================================

    #[test]
    fn test_get_or_create_registers_parentless_unowned_node() {
        let f = forest();
        let ns = f.get_or_create("foo");

        assert_eq!(ns.name(), "foo");
        assert!(ns.is_root());
        assert!(!ns.is_owned());
        assert!(!ns.allows_cascading_delete());
        assert!(ns.exists());
        assert!(!ns.is_excluded());
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn test_get_or_create_returns_existing_node() {
        let f = forest();
        f.get_or_create("foo");
        f.set_owned("foo", true).unwrap();

        let again = f.get_or_create("foo");
        assert!(again.is_owned());
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn test_get_does_not_create() {
        let f = forest();
        assert!(f.get("missing").is_none());
        assert!(f.is_empty());
    }

    #[test]
    fn test_excluded_flag_derived_from_configuration() {
        let f = forest();
        assert!(f.get_or_create("kube-system").is_excluded());
        assert!(!f.get_or_create("kube-systems").is_excluded());
    }

    #[test]
    fn test_flag_setters_require_known_namespace() {
        let f = forest();
        assert_eq!(
            f.set_owned("ghost", true),
            Err(ForestError::UnknownNamespace("ghost".to_string()))
        );
        assert!(f.set_allow_cascading_delete("ghost", true).is_err());

        f.get_or_create("real");
        f.set_allow_cascading_delete("real", true).unwrap();
        assert!(f.get("real").unwrap().allows_cascading_delete());
    }

    // =========================================================================
    // Edge Tests
    // =========================================================================

    #[test]
    fn test_set_parent_updates_both_indices() {
        let f = tree();

        let root = f.get("root").unwrap();
        assert_eq!(root.children().collect::<Vec<_>>(), vec!["team-a", "team-b"]);
        assert_eq!(f.get("team-a").unwrap().parent(), Some("root"));
        f.verify().unwrap();
    }

    #[test]
    fn test_reparent_moves_child_between_indices() {
        let f = tree();
        f.set_parent("team-a-dev", Some("team-b")).unwrap();

        assert!(!f.get("team-a").unwrap().has_children());
        assert_eq!(
            f.get("team-b").unwrap().children().collect::<Vec<_>>(),
            vec!["team-a-dev"]
        );
        f.verify().unwrap();
    }

    #[test]
    fn test_clear_parent_makes_root() {
        let f = tree();
        f.set_parent("team-b", None).unwrap();

        assert!(f.get("team-b").unwrap().is_root());
        assert_eq!(f.get("root").unwrap().children().collect::<Vec<_>>(), vec!["team-a"]);
        f.verify().unwrap();
    }

    #[test]
    fn test_set_parent_same_parent_is_noop() {
        let f = tree();
        f.set_parent("team-a", Some("root")).unwrap();
        assert_eq!(f.get("root").unwrap().children().count(), 2);
    }

    #[test]
    fn test_set_parent_refuses_self_parent() {
        let f = tree();
        let err = f.set_parent("team-a", Some("team-a")).unwrap_err();
        assert!(matches!(err, ForestError::Cycle { .. }));
    }

    #[test]
    fn test_set_parent_refuses_cycle_through_descendant() {
        let f = tree();
        let err = f.set_parent("root", Some("team-a-dev")).unwrap_err();
        assert_eq!(
            err,
            ForestError::Cycle {
                child: "root".to_string(),
                parent: "team-a-dev".to_string(),
            }
        );
        // Refused write leaves the forest untouched
        assert!(f.get("root").unwrap().is_root());
        f.verify().unwrap();
    }

    #[test]
    fn test_set_parent_refuses_unknown_endpoints() {
        let f = tree();
        assert_eq!(
            f.set_parent("ghost", Some("root")),
            Err(ForestError::UnknownNamespace("ghost".to_string()))
        );
        assert_eq!(
            f.set_parent("team-a", Some("ghost")),
            Err(ForestError::UnknownNamespace("ghost".to_string()))
        );
    }

    #[test]
    fn test_set_parent_refuses_excluded_namespaces() {
        let f = tree();
        f.get_or_create("kube-system");

        assert_eq!(
            f.set_parent("kube-system", Some("root")),
            Err(ForestError::Excluded("kube-system".to_string()))
        );
        assert_eq!(
            f.set_parent("team-b", Some("kube-system")),
            Err(ForestError::Excluded("kube-system".to_string()))
        );
        // Clearing is always fine
        f.set_parent("kube-system", None).unwrap();
    }

    // =========================================================================
    // Traversal Tests
    // =========================================================================

    #[test]
    fn test_ancestors_nearest_first() {
        let f = tree();
        assert_eq!(
            names(&f.ancestors("team-a-dev")),
            vec!["team-a-dev", "team-a", "root"]
        );
        assert_eq!(names(&f.ancestors("root")), vec!["root"]);
        assert!(f.ancestors("ghost").is_empty());
    }

    #[test]
    fn test_ancestors_iterator_is_restartable() {
        let f = tree();
        let state = f.read();
        let walk = state.ancestors("team-a-dev");
        let first: Vec<_> = walk.clone().map(Namespace::name).collect();
        let second: Vec<_> = walk.map(Namespace::name).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_descendants_transitive() {
        let f = tree();
        assert_eq!(
            names(&f.descendants("root")),
            vec!["team-a", "team-a-dev", "team-b"]
        );
        assert_eq!(names(&f.descendants("team-a")), vec!["team-a-dev"]);
        assert!(f.descendants("team-b").is_empty());
        assert!(f.descendants("ghost").is_empty());
    }

    #[test]
    fn test_is_ancestor_is_strict() {
        let f = tree();
        let state = f.read();
        assert!(state.is_ancestor("root", "team-a-dev"));
        assert!(state.is_ancestor("team-a", "team-a-dev"));
        assert!(!state.is_ancestor("team-a-dev", "team-a-dev"));
        assert!(!state.is_ancestor("team-b", "team-a-dev"));
    }

    #[test]
    fn test_roots_and_children() {
        let f = tree();
        f.get_or_create("other");
        let state = f.read();

        let roots: Vec<_> = state.roots().into_iter().map(Namespace::name).collect();
        assert_eq!(roots, vec!["other", "root"]);

        let children: Vec<_> = state.children("root").into_iter().map(Namespace::name).collect();
        assert_eq!(children, vec!["team-a", "team-b"]);
    }

    // =========================================================================
    // Removal Tests
    // =========================================================================

    #[test]
    fn test_remove_leaf_drops_node() {
        let f = tree();
        assert!(f.remove("team-b"));

        assert!(f.get("team-b").is_none());
        assert_eq!(f.get("root").unwrap().children().collect::<Vec<_>>(), vec!["team-a"]);
        f.verify().unwrap();
    }

    #[test]
    fn test_remove_with_children_keeps_placeholder() {
        let f = tree();
        assert!(f.remove("team-a"));

        let placeholder = f.get("team-a").unwrap();
        assert!(!placeholder.exists());
        assert!(placeholder.is_root());
        assert_eq!(f.get("team-a-dev").unwrap().parent(), Some("team-a"));
        f.verify().unwrap();

        // Once the last child moves away the placeholder is pruned
        f.set_parent("team-a-dev", None).unwrap();
        assert!(f.get("team-a").is_none());
        f.verify().unwrap();
    }

    #[test]
    fn test_placeholder_pruned_when_child_removed() {
        let f = forest();
        f.write().get_or_create_placeholder("parent");
        f.get_or_create("child");
        f.set_parent("child", Some("parent")).unwrap();
        assert!(!f.get("parent").unwrap().exists());

        f.remove("child");
        assert!(f.is_empty());
    }

    #[test]
    fn test_set_exists_promotes_placeholder() {
        let f = forest();
        f.write().get_or_create_placeholder("parent");
        assert!(f.set_exists("parent").exists());

        f.get_or_create("child");
        f.set_parent("child", Some("parent")).unwrap();
        f.set_parent("child", None).unwrap();
        // Observed namespaces are never pruned
        assert!(f.get("parent").is_some());
    }

    #[test]
    fn test_declared_parent_is_recorded_not_linked() {
        let mut state = ForestState::default();
        state.get_or_create("team");
        state.set_declared_parent("team", Some("org")).unwrap();

        let team = state.get("team").unwrap();
        assert_eq!(team.declared_parent(), Some("org"));
        assert!(team.is_root());
        assert!(!state.contains("org"));

        assert!(state.remove("team"));
        assert_eq!(
            state.set_declared_parent("team", None),
            Err(ForestError::UnknownNamespace("team".to_string()))
        );
    }

    #[test]
    fn test_remove_unknown_returns_false() {
        let f = forest();
        assert!(!f.remove("ghost"));
    }

    // =========================================================================
    // Concurrency Tests
    // =========================================================================

    #[test]
    fn test_concurrent_access() {
        use std::thread;

        let f = Arc::new(tree());
        let mut handles = vec![];

        // Writers add children under team-b
        for i in 0..10 {
            let f = Arc::clone(&f);
            handles.push(thread::spawn(move || {
                let name = format!("svc-{i}");
                f.get_or_create(&name);
                f.set_parent(&name, Some("team-b")).unwrap();
            }));
        }

        // Readers walk ancestry while writes land
        for _ in 0..10 {
            let f = Arc::clone(&f);
            handles.push(thread::spawn(move || {
                let chain = f.ancestors("team-a-dev");
                assert_eq!(chain.last().map(Namespace::name), Some("root"));
                let _ = f.descendants("root");
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(f.descendants("team-b").len(), 10);
        f.verify().unwrap();
    }
}
