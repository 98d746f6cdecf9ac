//! Hierarchy validator
//!
//! Decides whether a proposed hierarchy edge change may be persisted. The
//! validator holds only a handle to the shared forest; every decision,
//! including the excluded-namespace check against the forest's own set, is a
//! pure function of the forest state seen under one read lock, held from the first rule to the last so the parent
//! chain and descendant set it inspects cannot be torn by a concurrent write.
//!
//! Rules are evaluated in order and the first failing one wins.
//!
//! Create `parent -> child`:
//! 1. `parent == child` → [`DenialReason::Cycle`]
//! 2. either endpoint is excluded → [`DenialReason::ExcludedNamespace`]
//! 3. the edge already exists → allowed (idempotent, changes nothing)
//! 4. `child` exists elsewhere → [`DenialReason::NameCollision`]
//! 5. `parent` sits below `child` → [`DenialReason::Cycle`]
//!
//! Delete `parent -> child`:
//! 1. `child` unknown, or not currently under `parent` → [`DenialReason::NoSuchEdge`]
//! 2. `child` has descendants or is owned, without `allowCascadingDelete`
//!    → [`DenialReason::CascadingDeleteForbidden`]
//!
//! Corruption found while walking the forest denies with
//! [`DenialReason::InternalError`]; the validator fails closed.

mod operation;
mod verdict;

pub use operation::{Edge, EdgeOperation};
pub use verdict::{Denial, DenialReason, Verdict};

use tracing::{debug, error, info, instrument};

use crate::forest::{ForestError, ForestState, SharedForest};

/// Stateless admission decision logic over the shared forest
#[derive(Clone, Debug)]
pub struct HierarchyValidator {
    forest: SharedForest,
}

impl HierarchyValidator {
    /// Create a validator over `forest`, using the forest's excluded set
    pub fn new(forest: SharedForest) -> Self {
        Self { forest }
    }

    /// The forest this validator reads
    pub fn forest(&self) -> &SharedForest {
        &self.forest
    }

    /// Decide whether `operation` may be persisted
    #[instrument(skip(self, operation), fields(op = operation.kind(), edge = %operation.edge()))]
    pub fn decide(&self, operation: &EdgeOperation) -> Verdict {
        let state = self.forest.read();
        let verdict = match operation {
            EdgeOperation::Create(edge) => Self::decide_create(&state, edge),
            EdgeOperation::Delete(edge) => Self::decide_delete(&state, edge),
        };
        drop(state);

        match &verdict.denial {
            Some(denial) => info!(reason = ?denial.reason, message = %denial.message, "denied"),
            None => debug!("allowed"),
        }
        verdict
    }

    fn decide_create(state: &ForestState, edge: &Edge) -> Verdict {
        let Edge { parent, child } = edge;

        if parent == child {
            return Verdict::deny(
                DenialReason::Cycle,
                format!("namespace '{child}' cannot be its own parent"),
            );
        }

        let excluded = state.excluded();
        if excluded.contains(child) {
            return Verdict::deny(
                DenialReason::ExcludedNamespace,
                format!("namespace '{child}' is excluded from the hierarchy"),
            );
        }
        if excluded.contains(parent) {
            return Verdict::deny(
                DenialReason::ExcludedNamespace,
                format!("subnamespaces cannot be created in excluded namespace '{parent}'"),
            );
        }

        if let Some(existing) = state.get(child) {
            match existing.parent() {
                Some(current) if current == parent.as_str() => return Verdict::allow(),
                Some(current) if existing.exists() => {
                    return Verdict::deny(
                        DenialReason::NameCollision,
                        format!("namespace '{child}' already exists under '{current}'"),
                    );
                }
                None if existing.exists() => {
                    return Verdict::deny(
                        DenialReason::NameCollision,
                        format!("namespace '{child}' already exists; please use a different name"),
                    );
                }
                _ => {}
            }
        }

        match state.check_ancestry(parent) {
            Ok(chain) if chain.iter().any(|ns| ns.name() == child.as_str()) => Verdict::deny(
                DenialReason::Cycle,
                format!("'{parent}' is a descendant of '{child}'"),
            ),
            Ok(_) => Verdict::allow(),
            Err(e) => fail_closed(e),
        }
    }

    fn decide_delete(state: &ForestState, edge: &Edge) -> Verdict {
        let Edge { parent, child } = edge;

        let Some(ns) = state.get(child) else {
            return Verdict::deny(
                DenialReason::NoSuchEdge,
                format!("namespace '{child}' is not known to the hierarchy"),
            );
        };
        match ns.parent() {
            Some(current) if current == parent.as_str() => {}
            Some(current) => {
                return Verdict::deny(
                    DenialReason::NoSuchEdge,
                    format!("'{child}' is a child of '{current}', not '{parent}'"),
                );
            }
            None => {
                return Verdict::deny(
                    DenialReason::NoSuchEdge,
                    format!("'{child}' has no parent"),
                );
            }
        }

        if let Err(e) = state.check_ancestry(child) {
            return fail_closed(e);
        }

        if !ns.allows_cascading_delete() {
            let descendants = state.descendants(child).len();
            if descendants > 0 {
                return Verdict::deny(
                    DenialReason::CascadingDeleteForbidden,
                    format!(
                        "'{child}' has {descendants} descendant namespace(s); \
                         set allowCascadingDelete on '{child}' to delete it"
                    ),
                );
            }
            if ns.is_owned() {
                return Verdict::deny(
                    DenialReason::CascadingDeleteForbidden,
                    format!(
                        "'{child}' is a subnamespace and deleting this edge deletes it; \
                         set allowCascadingDelete on '{child}' to delete it"
                    ),
                );
            }
        }

        Verdict::allow()
    }
}

fn fail_closed(err: ForestError) -> Verdict {
    error!(error = %err, "forest invariant violated, denying");
    Verdict::deny(DenialReason::InternalError, err)
}
