//! The entity service facade.
//!
//! [`Registry`] is the single entry point the transport layer calls. It
//! composes the store, the dependency graph, the buildable resolver, the
//! orchestrator, and the lock table into one command set per entity kind:
//! create, get-by-id, list-by-parent-filter, update, and delete.
//!
//! Every command is one logical transaction: validation failures, missing
//! references, and actuator failures abort the command with a typed error
//! and leave no partial state behind.

use std::sync::Arc;

use tracing::Instrument;

use berth_core::observability::command_span;
use berth_core::{
    BlobStore, EntityDraft, EntityKind, EntityRecord, EntityRef, EntityStore, Environment, Image,
    Instance, Model, Pipeline, Project, Task,
};

use crate::actuator::Actuator;
use crate::adapters::AdapterRegistry;
use crate::artifacts::ArtifactResolver;
use crate::error::{Error, Result};
use crate::graph;
use crate::locks::EntityLocks;
use crate::orchestrator::Orchestrator;
use crate::resolver::BuildableResolver;

mod environment;
mod image;
mod instance;
mod model;
mod pipeline;
mod project;
mod task;

/// Flags for delete commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Recursively delete all dependents instead of blocking on them.
    pub cascade: bool,
    /// Delete only the persisted metadata, skipping actuator teardown.
    pub meta_only: bool,
}

/// The entity service facade.
///
/// Cheap to share behind an `Arc`; all collaborators are injected at
/// construction time, including the server adapter registry.
pub struct Registry {
    store: Arc<dyn EntityStore>,
    artifacts: ArtifactResolver,
    resolver: BuildableResolver,
    orchestrator: Orchestrator,
    locks: EntityLocks,
}

impl Registry {
    /// Wires a registry over its external collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore>,
        blobs: Arc<dyn BlobStore>,
        actuator: Arc<dyn Actuator>,
        adapters: AdapterRegistry,
    ) -> Self {
        Self {
            artifacts: ArtifactResolver::new(Arc::clone(&store), blobs),
            resolver: BuildableResolver::new(adapters),
            orchestrator: Orchestrator::new(actuator),
            locks: EntityLocks::new(),
            store,
        }
    }

    fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    /// Creates an entity with no actuator involvement.
    ///
    /// Locks the referenced parents, resolves every foreign key, then
    /// inserts; the store enforces name uniqueness atomically.
    async fn create_plain(&self, draft: EntityDraft) -> Result<EntityRecord> {
        let kind = draft.kind();
        async {
            let _guard = self.locks.command(&draft.required_refs()).await?;
            graph::check_refs(self.store(), &draft).await?;
            let record = self.store.insert(draft).await?;
            tracing::info!(kind = %kind, id = record.raw_id(), name = record.name(), "entity created");
            Ok(record)
        }
        .instrument(command_span("create", kind.as_str()))
        .await
    }

    /// Replaces an entity with no actuator involvement.
    ///
    /// The target's absence wins over unresolved references: updating a
    /// missing entity reports not-found even when the payload also points
    /// at missing parents.
    async fn update_plain(&self, kind: EntityKind, id: u64, draft: EntityDraft) -> Result<EntityRecord> {
        async {
            let mut refs = draft.required_refs();
            refs.push(EntityRef::new(kind, id));
            let _guard = self.locks.command(&refs).await?;
            self.store.fetch(kind, id).await?;
            graph::check_refs(self.store(), &draft).await?;
            let record = self.store.replace(kind, id, draft).await?;
            tracing::info!(kind = %kind, id, "entity updated");
            Ok(record)
        }
        .instrument(command_span("update", kind.as_str()))
        .await
    }

    /// Deletes an entity, honoring the cascade and meta-only flags.
    ///
    /// Without cascade, live dependents block the delete. With cascade, the
    /// full dependent subtree is collected under exclusive access and
    /// removed deepest-first; actuator teardowns all run before the first
    /// metadata row is touched, so a teardown failure aborts the command
    /// with the metadata intact.
    async fn delete_entity(&self, kind: EntityKind, id: u64, options: DeleteOptions) -> Result<()> {
        async {
            if options.cascade {
                let _guard = self.locks.subtree().await;
                let doomed = graph::collect_subtree(self.store(), kind, id).await?;
                if !options.meta_only {
                    for record in &doomed {
                        self.teardown(record).await?;
                    }
                }
                for record in &doomed {
                    self.store.remove(record.kind(), record.raw_id()).await?;
                }
                tracing::info!(kind = %kind, id, removed = doomed.len(), "cascade delete finished");
            } else {
                let _guard = self.locks.command(&[EntityRef::new(kind, id)]).await?;
                let target = self.store.fetch(kind, id).await?;
                let dependents = graph::direct_dependents(self.store(), kind, id).await?;
                if let Some(dependent) = dependents.first() {
                    return Err(Error::ForeignKeyConflict {
                        kind,
                        name: target.name().to_string(),
                        dependent: dependent.kind(),
                    });
                }
                if !options.meta_only {
                    self.teardown(&target).await?;
                }
                self.store.remove(kind, id).await?;
                tracing::info!(kind = %kind, id, "entity deleted");
            }
            Ok(())
        }
        .instrument(command_span("delete", kind.as_str()))
        .await
    }

    /// Tears down the actuator-side counterpart of a record, if it has one.
    async fn teardown(&self, record: &EntityRecord) -> Result<()> {
        match record {
            EntityRecord::Instance(instance) => {
                if let Some(runtime) = &instance.runtime {
                    self.orchestrator.stop_instance(runtime).await?;
                }
            }
            EntityRecord::Image(image) => {
                if let Some(artifact) = &image.artifact {
                    self.orchestrator.teardown_image(artifact).await?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").finish_non_exhaustive()
    }
}

fn wrong_kind() -> Error {
    Error::Core(berth_core::Error::internal("store returned wrong record kind"))
}

pub(crate) fn expect_project(record: EntityRecord) -> Result<Project> {
    record.into_project().ok_or_else(wrong_kind)
}

pub(crate) fn expect_task(record: EntityRecord) -> Result<Task> {
    record.into_task().ok_or_else(wrong_kind)
}

pub(crate) fn expect_model(record: EntityRecord) -> Result<Model> {
    record.into_model().ok_or_else(wrong_kind)
}

pub(crate) fn expect_environment(record: EntityRecord) -> Result<Environment> {
    record.into_environment().ok_or_else(wrong_kind)
}

pub(crate) fn expect_image(record: EntityRecord) -> Result<Image> {
    record.into_image().ok_or_else(wrong_kind)
}

pub(crate) fn expect_instance(record: EntityRecord) -> Result<Instance> {
    record.into_instance().ok_or_else(wrong_kind)
}

pub(crate) fn expect_pipeline(record: EntityRecord) -> Result<Pipeline> {
    record.into_pipeline().ok_or_else(wrong_kind)
}
