//! A single namespace node in the forest

use std::collections::BTreeSet;

/// A namespace known to the forest
///
/// Parent and children are stored as names and resolved through the forest's
/// table; the forest alone owns node lifetime. Values handed out by
/// [`Forest`](super::Forest) are snapshots taken under its lock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Namespace {
    name: String,
    pub(super) parent: Option<String>,
    pub(super) declared_parent: Option<String>,
    pub(super) children: BTreeSet<String>,
    pub(super) is_owned: bool,
    pub(super) allow_cascading_delete: bool,
    pub(super) exists: bool,
    excluded: bool,
}

impl Namespace {
    pub(super) fn new(name: &str, excluded: bool) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            declared_parent: None,
            children: BTreeSet::new(),
            is_owned: false,
            allow_cascading_delete: false,
            exists: true,
            excluded,
        }
    }

    pub(super) fn placeholder(name: &str, excluded: bool) -> Self {
        Self {
            exists: false,
            ..Self::new(name, excluded)
        }
    }

    /// Namespace name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the parent namespace, `None` for roots
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Parent declared by the namespace's HierarchyConfiguration
    ///
    /// This is the parent of a full namespace. Subnamespaces keep the value
    /// but take their parent from the ownership annotation instead.
    pub fn declared_parent(&self) -> Option<&str> {
        self.declared_parent.as_deref()
    }

    /// Names of the direct children, sorted
    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(String::as_str)
    }

    /// Returns true if this namespace has no parent
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns true if at least one namespace names this one as parent
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns true if this namespace is a subnamespace created through a
    /// hierarchy edge rather than an independently created namespace
    pub fn is_owned(&self) -> bool {
        self.is_owned
    }

    /// Returns true if deleting this namespace may take its subtree with it
    pub fn allows_cascading_delete(&self) -> bool {
        self.allow_cascading_delete
    }

    /// Returns true once the namespace has been observed in the cluster
    ///
    /// Placeholders are kept only because other namespaces still name them
    /// as parent.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Returns true if this is a reserved namespace outside the hierarchy
    pub fn is_excluded(&self) -> bool {
        self.excluded
    }
}
