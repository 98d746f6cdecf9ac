//! Proposed hierarchy edge operations

use std::fmt;

/// A parent → child hierarchy edge
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Namespace the subnamespace hangs under
    pub parent: String,
    /// The subnamespace itself
    pub child: String,
}

impl Edge {
    /// Create an edge from parent and child names
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.parent, self.child)
    }
}

/// A change to a hierarchy edge proposed through admission
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeOperation {
    /// Create the edge (a new subnamespace under `parent`)
    Create(Edge),
    /// Delete the edge
    Delete(Edge),
}

impl EdgeOperation {
    /// Propose creating `parent -> child`
    pub fn create(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::Create(Edge::new(parent, child))
    }

    /// Propose deleting `parent -> child`
    pub fn delete(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::Delete(Edge::new(parent, child))
    }

    /// The edge this operation acts on
    pub fn edge(&self) -> &Edge {
        match self {
            Self::Create(edge) | Self::Delete(edge) => edge,
        }
    }

    /// Short lowercase name of the operation kind, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Delete(_) => "delete",
        }
    }
}
