//! Namespace observations
//!
//! Replays cluster `Namespace` objects into the forest: a namespace seen in
//! the cluster becomes an existing node, and the subnamespace annotation makes
//! it an owned child of the namespace it names.

use k8s_openapi::api::core::v1::Namespace as CoreNamespace;
use tracing::{debug, warn};

use crate::crd::SUBNAMESPACE_OF_ANNOTATION;
use crate::forest::{ForestError, ForestState};

/// Apply one observed cluster namespace to the forest
pub fn apply_namespace(state: &mut ForestState, namespace: &CoreNamespace) {
    let Some(name) = namespace.metadata.name.as_deref() else {
        return;
    };
    state.set_exists(name);

    if state.excluded().contains(name) {
        debug!(namespace = %name, "Excluded namespace observed, not linking");
        return;
    }

    let owner = namespace
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(SUBNAMESPACE_OF_ANNOTATION))
        .map(String::as_str)
        .filter(|s| !s.is_empty());

    match owner {
        Some(parent) => match link(state, name, parent) {
            Ok(()) => {
                if let Err(e) = state.set_owned(name, true) {
                    warn!(namespace = %name, error = %e, "Failed to mark subnamespace owned");
                }
                debug!(namespace = %name, parent = %parent, "Subnamespace linked");
            }
            Err(e) => {
                warn!(namespace = %name, parent = %parent, error = %e, "Ignoring subnamespace annotation");
                if state.get(name).is_some_and(|ns| ns.is_owned()) {
                    release_ownership(state, name);
                }
            }
        },
        None => {
            if state.get(name).is_some_and(|ns| ns.is_owned()) {
                release_ownership(state, name);
                debug!(namespace = %name, "Namespace is no longer a subnamespace");
            }
        }
    }
}

/// Turn a subnamespace back into a full namespace
///
/// The parent the annotation gave it is dropped; the namespace falls back to
/// the parent its HierarchyConfiguration declares, or becomes a root.
fn release_ownership(state: &mut ForestState, name: &str) {
    if let Err(e) = state.set_owned(name, false) {
        warn!(namespace = %name, error = %e, "Failed to release subnamespace");
        return;
    }

    let declared = state
        .get(name)
        .and_then(|ns| ns.declared_parent())
        .map(String::from);
    let result = match declared.as_deref() {
        Some(parent) => link(state, name, parent),
        None => state.set_parent(name, None),
    };
    if let Err(e) = result {
        warn!(namespace = %name, parent = ?declared, error = %e, "Declared parent refused, detaching");
        if let Err(e) = state.set_parent(name, None) {
            warn!(namespace = %name, error = %e, "Failed to detach namespace");
        }
    }
}

/// Forget a namespace deleted from the cluster; returns false if it was unknown
pub fn forget_namespace(state: &mut ForestState, name: &str) -> bool {
    let removed = state.remove(name);
    if removed {
        debug!(namespace = %name, "Namespace removed from forest");
    }
    removed
}

/// Point `child` at `parent`, creating `parent` as a placeholder if unseen
///
/// A placeholder created here is dropped again when the write is refused.
pub(super) fn link(state: &mut ForestState, child: &str, parent: &str) -> Result<(), ForestError> {
    let created = !state.contains(parent);
    state.get_or_create_placeholder(parent);

    let result = state.set_parent(child, Some(parent));
    if result.is_err() && created {
        state.remove(parent);
    }
    result
}
