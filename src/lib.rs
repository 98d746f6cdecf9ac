//! HNC - hierarchical namespace admission controller for Kubernetes
//!
//! Namespaces form a forest: each namespace has at most one parent, and a
//! subnamespace is created by placing a HierarchicalNamespace object in its
//! parent. The admission webhook decides, against an in-memory copy of that
//! forest, whether a proposed hierarchy edge may be created or deleted.
//!
//! # Architecture
//!
//! - The forest sync controllers watch `Namespace` and
//!   `HierarchyConfiguration` objects and replay them into the forest
//! - The webhook receives `AdmissionReview` requests for
//!   HierarchicalNamespaces and asks the validator for a verdict
//! - The validator reads the forest under one lock for each decision
//!
//! # Modules
//!
//! - [`forest`] - Namespace forest (arena, ancestry walks, write API)
//! - [`validator`] - Edge create/delete decisions
//! - [`webhook`] - Admission webhook server and request adapter
//! - [`controller`] - Forest sync from cluster state
//! - [`crd`] - Custom Resource Definitions (HierarchicalNamespace, HierarchyConfiguration)
//! - [`config`] - Excluded namespace configuration
//! - [`telemetry`] - Logging setup
//! - [`error`] - Error types

#![deny(missing_docs)]

pub mod config;
pub mod controller;
pub mod crd;
pub mod error;
pub mod forest;
pub mod telemetry;
pub mod validator;
pub mod webhook;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Default port for the admission webhook HTTPS server
///
/// Port 9443 is used instead of 443 to avoid requiring root privileges.
pub const DEFAULT_WEBHOOK_PORT: u16 = 9443;
