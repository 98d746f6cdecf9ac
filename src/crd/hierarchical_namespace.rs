//! HierarchicalNamespace Custom Resource Definition
//!
//! A HierarchicalNamespace is the hierarchy edge object. It lives in the
//! parent namespace and is named after the subnamespace it creates, so the
//! admission webhook reads the parent from `metadata.namespace` and the
//! child from `metadata.name`.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Specification for a HierarchicalNamespace
///
/// The edge carries no settings of its own; both endpoints come from the
/// object's metadata.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "hnc.x-k8s.io",
    version = "v1alpha1",
    kind = "HierarchicalNamespace",
    plural = "hierarchicalnamespaces",
    shortname = "hns",
    status = "HierarchicalNamespaceStatus",
    namespaced,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.state"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct HierarchicalNamespaceSpec {}

/// State of the subnamespace an edge points at
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum HierarchicalNamespaceState {
    /// The subnamespace has not been created yet
    #[default]
    Missing,
    /// The subnamespace exists and is owned by this edge
    Ok,
    /// A namespace with this name exists but belongs elsewhere
    Conflict,
    /// The edge sits in an excluded namespace
    Forbidden,
}

impl std::fmt::Display for HierarchicalNamespaceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "Missing"),
            Self::Ok => write!(f, "Ok"),
            Self::Conflict => write!(f, "Conflict"),
            Self::Forbidden => write!(f, "Forbidden"),
        }
    }
}

/// Status for a HierarchicalNamespace
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HierarchicalNamespaceStatus {
    /// Current state of the subnamespace
    #[serde(default)]
    pub state: HierarchicalNamespaceState,
}
