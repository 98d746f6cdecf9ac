//! Admission verdicts and denial reasons

use std::fmt;

/// Machine-readable category of a denial
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DenialReason {
    /// The child or parent is a reserved namespace outside the hierarchy
    ExcludedNamespace,
    /// The child name is already taken by a namespace not created by this edge
    NameCollision,
    /// The edge would close a loop in the hierarchy
    Cycle,
    /// The edge being deleted does not exist
    NoSuchEdge,
    /// The child has dependents and does not allow cascading deletion
    CascadingDeleteForbidden,
    /// The admission request did not name both endpoints
    InvalidRequest,
    /// The forest was found in a corrupted state
    InternalError,
}

impl DenialReason {
    /// Stable category string, also used as the summary in messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExcludedNamespace => "excluded namespace cannot be a child",
            Self::NameCollision => "name collision with existing namespace",
            Self::Cycle => "would create a cycle",
            Self::NoSuchEdge => "no such hierarchy edge",
            Self::CascadingDeleteForbidden => "cascading delete not permitted",
            Self::InvalidRequest => "invalid request",
            Self::InternalError => "internal error",
        }
    }

    /// Kubernetes `StatusReason` reported in the admission response
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::ExcludedNamespace | Self::CascadingDeleteForbidden => "Forbidden",
            Self::NameCollision | Self::Cycle => "Conflict",
            Self::NoSuchEdge => "NotFound",
            Self::InvalidRequest => "BadRequest",
            Self::InternalError => "InternalError",
        }
    }

    /// HTTP status code reported in the admission response
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ExcludedNamespace | Self::CascadingDeleteForbidden => 403,
            Self::NameCollision | Self::Cycle => 409,
            Self::NoSuchEdge => 404,
            Self::InvalidRequest => 400,
            Self::InternalError => 500,
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an operation was denied
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Denial {
    /// Category of the denial
    pub reason: DenialReason,
    /// Human-readable message, returned verbatim to the requester
    pub message: String,
}

/// Allow/deny outcome of an admission decision
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the operation may be persisted
    pub allowed: bool,
    /// Present exactly when `allowed` is false
    pub denial: Option<Denial>,
}

impl Verdict {
    /// An allowing verdict
    pub fn allow() -> Self {
        Self {
            allowed: true,
            denial: None,
        }
    }

    /// A denying verdict; the message is prefixed with the reason category
    pub fn deny(reason: DenialReason, detail: impl fmt::Display) -> Self {
        Self {
            allowed: false,
            denial: Some(Denial {
                reason,
                message: format!("{reason}: {detail}"),
            }),
        }
    }

    /// Denial category, if denied
    pub fn reason(&self) -> Option<DenialReason> {
        self.denial.as_ref().map(|d| d.reason)
    }

    /// Denial message, if denied
    pub fn message(&self) -> Option<&str> {
        self.denial.as_ref().map(|d| d.message.as_str())
    }
}
