use std::sync::Arc;

use crate::Address;

/// Failure to read something out of the inspected process image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("cannot access memory at address {0}")]
    InvalidAddress(Address),
    #[error("there is no member named `{member}` in `{ty}`")]
    NoSuchField { ty: String, member: String },
    #[error("no type named `{0}`")]
    NoSuchType(String),
    /// The superclass search for a nested member type ran out of base
    /// classes.
    #[error("cannot find type {ty}::{member}")]
    CannotFindMember { ty: String, member: String },
    #[error("value of type `{ty}` is not {expected}")]
    TypeMismatch { ty: String, expected: &'static str },
    /// An alias or base class chain leads back to where it started.
    #[error("type `{0}` refers to itself")]
    TypeCycle(String),
}

/// Failure to load a [`Snapshot`](crate::Snapshot).
#[derive(Debug, Clone, thiserror::Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Json(Arc<serde_json::Error>),
    #[error("duplicate object at address {0}")]
    DuplicateObject(Address),
    #[error("duplicate type `{0}`")]
    DuplicateType(String),
    #[error("`{referrer}` refers to undefined type `{name}`")]
    UndefinedType { referrer: String, name: String },
    #[error("type `{0}` refers to itself")]
    TypeCycle(String),
    #[error(transparent)]
    Host(HostError),
}

impl From<serde_json::Error> for SnapshotError {
    #[inline]
    fn from(err: serde_json::Error) -> Self {
        Self::Json(Arc::new(err))
    }
}

impl From<HostError> for SnapshotError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::TypeCycle(name) => Self::TypeCycle(name),
            err => Self::Host(err),
        }
    }
}
