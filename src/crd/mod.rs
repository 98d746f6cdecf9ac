//! Custom Resource Definitions for the hierarchical namespace controller
//!
//! This module contains the `hnc.x-k8s.io/v1alpha1` API types.

mod hierarchical_namespace;
mod hierarchy_configuration;

pub use hierarchical_namespace::{
    HierarchicalNamespace, HierarchicalNamespaceSpec, HierarchicalNamespaceState,
    HierarchicalNamespaceStatus,
};
pub use hierarchy_configuration::{
    HierarchyConfiguration, HierarchyConfigurationSpec, HIERARCHY_CONFIGURATION_NAME,
};

use kube::CustomResourceExt;

use crate::Error;

/// Annotation on a subnamespace naming the namespace that owns it
pub const SUBNAMESPACE_OF_ANNOTATION: &str = "hnc.x-k8s.io/subnamespaceOf";

/// Render every CRD this crate defines as one multi-document YAML stream
pub fn manifests() -> crate::Result<String> {
    let hns = serde_yaml::to_string(&HierarchicalNamespace::crd())
        .map_err(|e| Error::serialization(format!("HierarchicalNamespace CRD: {e}")))?;
    let hc = serde_yaml::to_string(&HierarchyConfiguration::crd())
        .map_err(|e| Error::serialization(format!("HierarchyConfiguration CRD: {e}")))?;
    Ok(format!("{hns}---\n{hc}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifests_contain_both_crds() {
        let yaml = manifests().unwrap();
        let docs: Vec<serde_yaml::Value> = yaml
            .split("---\n")
            .map(|doc| serde_yaml::from_str(doc).unwrap())
            .collect();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["metadata"]["name"], "hierarchicalnamespaces.hnc.x-k8s.io");
        assert_eq!(docs[1]["metadata"]["name"], "hierarchyconfigurations.hnc.x-k8s.io");
        assert_eq!(docs[1]["spec"]["scope"], "Namespaced");

        // Only the edge object reports status
        let subresources = |doc: &serde_yaml::Value| doc["spec"]["versions"][0]["subresources"].clone();
        assert!(subresources(&docs[0]).get("status").is_some());
        assert!(subresources(&docs[1]).get("status").is_none());
    }
}
