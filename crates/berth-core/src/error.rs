//! Error types and result aliases for Berth.
//!
//! This module defines the shared error types used by the entity store and
//! the validation layer. Errors are structured for programmatic handling:
//! every variant exposes a stable machine-checkable [`Error::code`] next to
//! its human-readable message.

use crate::entity::EntityKind;
use crate::validate::Issue;

/// The result type used throughout berth-core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in store and validation operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity does not exist.
    #[error("{kind} with id {id} does not exist")]
    NotFound {
        /// The kind of entity that was looked up.
        kind: EntityKind,
        /// The identifier that was looked up.
        id: u64,
    },

    /// A named model artifact could not be resolved.
    ///
    /// Deliberately covers both a missing model and a missing artifact name
    /// so the error alone does not reveal which of the two is absent.
    #[error("artifact {artifact} for model {model_id} does not exist")]
    ArtifactNotFound {
        /// The model the artifact was requested for.
        model_id: u64,
        /// The artifact name that was requested.
        artifact: String,
    },

    /// A blob key has no stored bytes behind it.
    #[error("no blob stored under key {key}")]
    BlobNotFound {
        /// The blob key that was looked up.
        key: String,
    },

    /// A name collision within the entity's uniqueness scope.
    #[error("{kind} with name {name} already exists")]
    DuplicateName {
        /// The kind of entity being created or renamed.
        kind: EntityKind,
        /// The colliding name.
        name: String,
    },

    /// One or more payload fields failed validation.
    ///
    /// Issues cover *all* violations in schema-declaration order, not just
    /// the first one encountered.
    #[error("validation failed with {} issue(s)", issues.len())]
    Validation {
        /// Every violation, ordered by field declaration.
        issues: Vec<Issue>,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates a not-found error for the given entity reference.
    #[must_use]
    pub const fn not_found(kind: EntityKind, id: u64) -> Self {
        Self::NotFound { kind, id }
    }

    /// Creates an internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a validation error from collected issues.
    #[must_use]
    pub const fn validation(issues: Vec<Issue>) -> Self {
        Self::Validation { issues }
    }

    /// Returns the stable machine-checkable error code.
    ///
    /// Codes are part of the public contract: callers dispatch on them
    /// instead of parsing messages.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } | Self::ArtifactNotFound { .. } | Self::BlobNotFound { .. } => {
                "NOT_FOUND"
            }
            Self::DuplicateName { .. } => "DUPLICATE_NAME",
            Self::Validation { .. } => "VALIDATION",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Internal { .. } => "INTERNAL",
        }
    }
}
