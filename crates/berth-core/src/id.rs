//! Strongly-typed identifiers for Berth entities.
//!
//! All identifiers in Berth are:
//! - **Strongly typed**: Prevents mixing up different ID types at compile time
//! - **Store-assigned**: The entity store allocates the next value in a
//!   per-kind sequence on insert; callers never invent ids
//! - **Stable**: Immutable for the lifetime of the record
//!
//! # Example
//!
//! ```rust,ignore
//! use berth_core::id::{ModelId, ProjectId};
//!
//! let model = ModelId::from_raw(1);
//! let project = ProjectId::from_raw(1);
//!
//! // IDs are different types - this won't compile:
//! // let wrong: ModelId = project;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw store-assigned value.
            #[must_use]
            pub const fn from_raw(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw store-assigned value.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                s.parse::<u64>().map(Self).map_err(|e| Error::InvalidInput(
                    format!(concat!("invalid ", $label, " ID '{}': {}"), s, e),
                ))
            }
        }
    };
}

entity_id!(
    /// A unique identifier for a project.
    ///
    /// Projects are the top of the entity hierarchy; everything else hangs
    /// off a project through its tasks.
    ProjectId,
    "project"
);

entity_id!(
    /// A unique identifier for a task within a project.
    TaskId,
    "task"
);

entity_id!(
    /// A unique identifier for a trained model within a task.
    ModelId,
    "model"
);

entity_id!(
    /// A unique identifier for a target runtime environment.
    EnvironmentId,
    "environment"
);

entity_id!(
    /// A unique identifier for a built deployment image.
    ImageId,
    "image"
);

entity_id!(
    /// A unique identifier for a running instance of an image.
    InstanceId,
    "instance"
);

entity_id!(
    /// A unique identifier for a pipeline within a task.
    PipelineId,
    "pipeline"
);
