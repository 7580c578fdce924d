//! Business rule failures shared by the domain crates.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Rejection raised by a domain model.
///
/// Variants carry what the HTTP layer needs to choose a status and point the
/// caller at the offending input. Store and transport failures have their own
/// error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A submitted value was rejected; `field` names the input.
    #[error("{message}")]
    InvalidField { field: &'static str, message: String },

    /// Text did not name any known `kind` (role, category, stock status).
    #[error("unknown {kind} '{value}'")]
    UnknownLabel { kind: &'static str, value: String },

    /// Text was not a valid identifier of `kind`.
    #[error("invalid {kind}: {reason}")]
    InvalidId { kind: &'static str, reason: String },

    /// The lifecycle refuses this status change.
    #[error("cannot move from {from} to {to}: {reason}")]
    IllegalTransition {
        from: &'static str,
        to: &'static str,
        reason: &'static str,
    },

    /// The record was already created.
    #[error("{0} already exists")]
    AlreadyExists(&'static str),

    /// The record does not exist yet.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The stored record moved past the version the caller loaded.
    #[error("version conflict (expected {expected}, found {actual})")]
    StaleVersion { expected: u64, actual: u64 },
}

impl DomainError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }

    pub fn unknown_label(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownLabel {
            kind,
            value: value.into(),
        }
    }

    /// Input the error points at, when it concerns a single field.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            DomainError::InvalidField { field, .. } => Some(field),
            _ => None,
        }
    }
}
