//! HierarchyConfiguration Custom Resource Definition
//!
//! Every namespace in the hierarchy may carry one HierarchyConfiguration,
//! always named [`HIERARCHY_CONFIGURATION_NAME`]. It declares the parent of a
//! full (non-owned) namespace and whether the namespace may be deleted along
//! with its subtree.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::is_namespace_name;

/// Name of the per-namespace HierarchyConfiguration singleton
pub const HIERARCHY_CONFIGURATION_NAME: &str = "hierarchy";

/// Specification for a HierarchyConfiguration
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "hnc.x-k8s.io",
    version = "v1alpha1",
    kind = "HierarchyConfiguration",
    plural = "hierarchyconfigurations",
    shortname = "hc",
    namespaced,
    printcolumn = r#"{"name":"Parent","type":"string","jsonPath":".spec.parent"}"#,
    printcolumn = r#"{"name":"Cascade","type":"boolean","jsonPath":".spec.allowCascadingDelete"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyConfigurationSpec {
    /// Parent namespace, for namespaces that are not subnamespaces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Allow deleting this namespace together with its descendants
    #[serde(default)]
    pub allow_cascading_delete: bool,
}

impl HierarchyConfigurationSpec {
    /// Validate the declared parent for a configuration living in `namespace`
    pub fn validate(&self, namespace: &str) -> Result<(), crate::Error> {
        let Some(parent) = self.parent.as_deref() else {
            return Ok(());
        };
        if !is_namespace_name(parent) {
            return Err(crate::Error::validation(format!(
                "parent '{parent}' is not a valid namespace name"
            )));
        }
        if parent == namespace {
            return Err(crate::Error::validation(format!(
                "namespace '{namespace}' cannot be its own parent"
            )));
        }
        Ok(())
    }
}

impl HierarchyConfiguration {
    /// Returns true if this object is the namespace's singleton
    pub fn is_singleton(&self) -> bool {
        self.metadata.name.as_deref() == Some(HIERARCHY_CONFIGURATION_NAME)
    }
}
