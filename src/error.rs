//! Error types for the hierarchical namespace controller

use thiserror::Error;

/// Main error type for HNC operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Validation error for configuration or CRD specs
    #[error("validation error: {0}")]
    Validation(String),

    /// Rendering a manifest failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Webhook server error (TLS material, bind failures)
    #[error("server error: {0}")]
    Server(String),
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a server error with the given message
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }
}
