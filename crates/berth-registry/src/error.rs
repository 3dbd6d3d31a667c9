//! Error types for the registry service layer.

use berth_core::EntityKind;

/// The result type used throughout berth-registry.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in registry commands.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A foreign key points at an entity that does not exist.
    #[error("{kind} with id {id} does not exist")]
    ReferenceNotFound {
        /// The kind of the missing parent.
        kind: EntityKind,
        /// The id the reference pointed at.
        id: u64,
    },

    /// A delete was blocked by live dependents.
    #[error("{kind} {name} has dependent {dependent} records and can not be deleted")]
    ForeignKeyConflict {
        /// The kind of the entity being deleted.
        kind: EntityKind,
        /// The name of the entity being deleted.
        name: String,
        /// The kind of the blocking dependents.
        dependent: EntityKind,
    },

    /// The external builder failed or refused.
    #[error("build failed: {message}")]
    Build {
        /// The actuator's diagnostic.
        message: String,
    },

    /// The external runtime failed or refused.
    #[error("run failed: {message}")]
    Run {
        /// The actuator's diagnostic.
        message: String,
    },

    /// An error from berth-core.
    #[error(transparent)]
    Core(#[from] berth_core::Error),
}

impl Error {
    /// Creates a build error carrying the actuator diagnostic.
    #[must_use]
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    /// Creates a run error carrying the actuator diagnostic.
    #[must_use]
    pub fn run(message: impl Into<String>) -> Self {
        Self::Run {
            message: message.into(),
        }
    }

    /// Returns the stable machine-checkable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ReferenceNotFound { .. } => "REFERENCE_NOT_FOUND",
            Self::ForeignKeyConflict { .. } => "FOREIGN_KEY_CONFLICT",
            Self::Build { .. } => "BUILD_FAILED",
            Self::Run { .. } => "RUN_FAILED",
            Self::Core(inner) => inner.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_not_found_names_kind_and_id() {
        let err = Error::ReferenceNotFound {
            kind: EntityKind::Model,
            id: 999,
        };
        assert_eq!(err.to_string(), "Model with id 999 does not exist");
        assert_eq!(err.code(), "REFERENCE_NOT_FOUND");
    }

    #[test]
    fn conflict_names_the_blocking_relationship() {
        let err = Error::ForeignKeyConflict {
            kind: EntityKind::Project,
            name: "project_1".into(),
            dependent: EntityKind::Task,
        };
        let msg = err.to_string();
        assert!(msg.contains("project_1"));
        assert!(msg.contains("Task"));
        assert_eq!(err.code(), "FOREIGN_KEY_CONFLICT");
    }

    #[test]
    fn core_errors_keep_their_code() {
        let err = Error::from(berth_core::Error::not_found(EntityKind::Pipeline, 1));
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "Pipeline with id 1 does not exist");
    }

    #[test]
    fn build_error_carries_diagnostic() {
        let err = Error::build("no space left on device");
        assert!(err.to_string().contains("no space left on device"));
        assert_eq!(err.code(), "BUILD_FAILED");
    }
}
