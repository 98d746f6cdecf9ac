//! HierarchyConfiguration observations
//!
//! A namespace's HierarchyConfiguration carries its cascading-delete setting
//! and the declared parent. The declared parent is always recorded on the
//! node, but only full namespaces are linked to it; subnamespaces take their
//! parent from the ownership annotation until they lose it.
//!
//! A full namespace's parent is always its declared parent, or none when the
//! declared parent is refused, so replaying the same objects in any order
//! yields the same forest.

use tracing::{debug, warn};

use crate::crd::HierarchyConfiguration;
use crate::forest::ForestState;

use super::namespace::link;

/// Apply one observed HierarchyConfiguration to the forest
pub fn apply_hierarchy_config(state: &mut ForestState, config: &HierarchyConfiguration) {
    let Some(namespace) = config.metadata.namespace.as_deref() else {
        return;
    };
    if !config.is_singleton() {
        debug!(namespace = %namespace, name = ?config.metadata.name, "Ignoring non-singleton HierarchyConfiguration");
        return;
    }

    let node = state.set_exists(namespace);
    let owned = node.is_owned();
    let excluded = node.is_excluded();
    if let Err(e) = state.set_allow_cascading_delete(namespace, config.spec.allow_cascading_delete) {
        warn!(namespace = %namespace, error = %e, "Failed to apply allowCascadingDelete");
    }

    if excluded {
        if config.spec.parent.is_some() {
            debug!(namespace = %namespace, "Excluded namespace cannot declare a parent");
        }
        return;
    }

    if let Err(e) = config.spec.validate(namespace) {
        warn!(namespace = %namespace, error = %e, "Invalid HierarchyConfiguration");
        return;
    }

    let declared = config.spec.parent.as_deref();
    if let Err(e) = state.set_declared_parent(namespace, declared) {
        warn!(namespace = %namespace, error = %e, "Failed to record declared parent");
        return;
    }
    if owned {
        if declared.is_some() {
            debug!(namespace = %namespace, "Subnamespace keeps its annotation parent");
        }
        return;
    }

    let result = match declared {
        Some(parent) => link(state, namespace, parent),
        None => state.set_parent(namespace, None),
    };
    match result {
        Ok(()) => debug!(namespace = %namespace, parent = ?declared, "Hierarchy configuration applied"),
        Err(e) => {
            warn!(namespace = %namespace, parent = ?declared, error = %e, "Refusing declared parent");
            if let Err(e) = state.set_parent(namespace, None) {
                warn!(namespace = %namespace, error = %e, "Failed to detach namespace");
            }
        }
    }
}

/// Reset a namespace whose HierarchyConfiguration was deleted
///
/// Cascading delete goes back to its default, the declared parent is
/// dropped and a full namespace becomes a root. Owned namespaces keep the
/// parent their annotation gave them.
pub fn forget_hierarchy_config(state: &mut ForestState, namespace: &str) {
    let Some(node) = state.get(namespace) else {
        return;
    };
    let owned = node.is_owned();

    if let Err(e) = state.set_allow_cascading_delete(namespace, false) {
        warn!(namespace = %namespace, error = %e, "Failed to reset allowCascadingDelete");
    }
    if let Err(e) = state.set_declared_parent(namespace, None) {
        warn!(namespace = %namespace, error = %e, "Failed to clear declared parent");
    }
    if !owned {
        if let Err(e) = state.set_parent(namespace, None) {
            warn!(namespace = %namespace, error = %e, "Failed to detach namespace");
        }
    }
    debug!(namespace = %namespace, "Hierarchy configuration reset");
}
