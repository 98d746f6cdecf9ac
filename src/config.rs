//! Excluded namespace configuration
//!
//! Excluded namespaces are reserved system namespaces that never take part in
//! the hierarchy: they cannot become children and cannot host subnamespaces.
//! The set is injected into the forest and the validator so operators can
//! extend it from the command line without code changes.

use std::collections::BTreeSet;

use crate::Error;

/// Namespaces excluded from the hierarchy unless the operator overrides them
pub const DEFAULT_EXCLUDED_NAMESPACES: &[&str] =
    &["kube-system", "kube-public", "kube-node-lease", "hnc-system"];

/// Maximum length of a namespace name (RFC 1123 label)
const MAX_NAMESPACE_NAME_LEN: usize = 63;

/// Set of namespace names that can never participate in a hierarchy edge
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExcludedNamespaces {
    names: BTreeSet<String>,
}

impl Default for ExcludedNamespaces {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_NAMESPACES.iter().copied())
    }
}

impl ExcludedNamespaces {
    /// Create a set from exactly the given names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an empty set (nothing is excluded)
    pub fn none() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    /// Build the set from the defaults plus operator-supplied names
    ///
    /// Every extra name must be a valid namespace name; blank entries are
    /// ignored so that `HNC_EXCLUDED_NAMESPACES=""` behaves like no extras.
    pub fn with_extra<I, S>(extra: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for name in extra {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if !is_namespace_name(name) {
                return Err(Error::validation(format!(
                    "excluded namespace '{name}' is not a valid namespace name"
                )));
            }
            set.names.insert(name.to_string());
        }
        Ok(set)
    }

    /// Returns true if `name` is excluded
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Iterate the excluded names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of excluded names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing is excluded
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Check that `name` is a valid Kubernetes namespace name (RFC 1123 label)
pub fn is_namespace_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAMESPACE_NAME_LEN {
        return false;
    }
    let bytes = name.as_bytes();
    let alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    bytes.iter().all(|b| alnum(b) || *b == b'-')
        && bytes.first().is_some_and(alnum)
        && bytes.last().is_some_and(alnum)
}
