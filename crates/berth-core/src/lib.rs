//! # berth-core
//!
//! Core abstractions for the Berth artifact registry.
//!
//! This crate provides the foundational types and traits used across all
//! Berth components:
//!
//! - **Identifiers**: Strongly-typed, store-assigned ids per entity kind
//! - **Entity Records**: The seven kinds of the registry graph and their
//!   drafts, scopes, and list filters
//! - **Descriptors**: Tagged unions for buildables and environment-specific
//!   parameters
//! - **Validation**: Aggregated, field-path-ordered payload validation
//! - **Stores**: Abstract entity and blob persistence with in-memory
//!   reference backends
//! - **Error Types**: Shared error definitions with stable codes
//!
//! ## Crate Boundary
//!
//! `berth-core` is the only crate allowed to define shared primitives.
//! Graph rules, orchestration, and the service facade live in
//! `berth-registry` on top of these contracts.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod artifact;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod id;
pub mod observability;
pub mod payload;
pub mod store;
pub mod validate;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::artifact::{BlobStore, MemoryBlobStore};
    pub use crate::descriptor::{
        Buildable, EnvironmentParams, ImageParams, InstanceParams, RegistryParams,
    };
    pub use crate::entity::{
        EntityDraft, EntityFilter, EntityKind, EntityRecord, EntityRef, ImageArtifactRef,
        ImageStatus, InstanceStatus, NameScope, RunningInstanceRef,
    };
    pub use crate::error::{Error, Result};
    pub use crate::id::{
        EnvironmentId, ImageId, InstanceId, ModelId, PipelineId, ProjectId, TaskId,
    };
    pub use crate::store::{EntityStore, MemoryStore};
    pub use crate::validate::Issue;
}

// Re-export key types at crate root for ergonomics
pub use artifact::{BlobStore, MemoryBlobStore};
pub use descriptor::{Buildable, EnvironmentParams, ImageParams, InstanceParams, RegistryParams};
pub use entity::{
    Environment, EnvironmentDraft, EntityDraft, EntityFilter, EntityKind, EntityRecord, EntityRef,
    Image, ImageArtifactRef, ImageDraft, ImageStatus, Instance, InstanceDraft, InstanceStatus,
    Model, ModelDraft, NameScope, Pipeline, PipelineDraft, Project, ProjectDraft,
    RunningInstanceRef, Task, TaskDraft,
};
pub use error::{Error, Result};
pub use id::{EnvironmentId, ImageId, InstanceId, ModelId, PipelineId, ProjectId, TaskId};
pub use observability::{LogFormat, init_logging};
pub use payload::{ImagePayload, InstancePayload, PayloadMode};
pub use store::{EntityStore, MemoryStore};
pub use validate::Issue;
