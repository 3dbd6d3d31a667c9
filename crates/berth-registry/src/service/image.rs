//! Image commands.
//!
//! Image creation is the build half of the declare → invoke → reconcile
//! protocol: the buildable is resolved exactly once against an existing
//! model, the builder runs (unless skipped), and the image row is only
//! persisted once an artifact exists. Any failure on the way leaves no
//! image behind.

use serde_json::Value;
use tracing::Instrument;

use berth_core::observability::command_span;
use berth_core::payload::{PayloadMode, parse_image};
use berth_core::{
    EntityDraft, EntityFilter, EntityKind, EntityRecord, EntityRef, Image, ImageDraft, ImageId,
    ImageStatus, TaskId,
};

use super::{DeleteOptions, Registry, expect_image};
use crate::actuator::BuildOptions;
use crate::error::{Error, Result};
use crate::graph;

impl Registry {
    /// Creates an image from a buildable descriptor, building it unless
    /// `options.skip_build` requests a dry registration.
    pub async fn create_image(&self, payload: &Value, options: &BuildOptions) -> Result<Image> {
        async {
            let parsed = parse_image(payload, PayloadMode::Create)?;

            let mut refs = vec![EntityRef::new(
                EntityKind::Model,
                parsed.buildable.model_id().as_u64(),
            )];
            if let Some(env) = parsed.environment_id {
                refs.push(EntityRef::new(EntityKind::Environment, env.as_u64()));
            }
            let _guard = self.locks.command(&refs).await?;

            // Declare: resolve the buildable and every other reference
            // before anything irreversible happens.
            let spec = self
                .resolver
                .resolve(self.store(), &parsed.name, &parsed.buildable)
                .await?;
            if let Some(env) = parsed.environment_id {
                if !self
                    .store
                    .exists(EntityKind::Environment, env.as_u64())
                    .await?
                {
                    return Err(Error::ReferenceNotFound {
                        kind: EntityKind::Environment,
                        id: env.as_u64(),
                    });
                }
            }
            let task_id = spec.model.task_id;

            // Reject a colliding name before invoking the builder, not after.
            let siblings = self
                .store
                .select(EntityKind::Image, &EntityFilter::TaskId(task_id.as_u64()))
                .await?;
            if siblings.iter().any(|s| s.name() == parsed.name) {
                return Err(berth_core::Error::DuplicateName {
                    kind: EntityKind::Image,
                    name: parsed.name,
                }
                .into());
            }

            // Invoke.
            let artifact = self.orchestrator.build(&spec, options).await?;
            let status = if artifact.is_some() {
                ImageStatus::Built
            } else {
                ImageStatus::Registered
            };

            // Reconcile: persist only after the builder succeeded.
            let draft = EntityDraft::Image(ImageDraft {
                name: parsed.name,
                task_id,
                buildable: parsed.buildable,
                environment_id: parsed.environment_id,
                params: parsed.params,
                artifact: artifact.clone(),
                status,
                author: parsed.author,
            });
            match self.store.insert(draft).await {
                Ok(record) => {
                    tracing::info!(id = record.raw_id(), status = %status, "image persisted");
                    expect_image(record)
                }
                Err(err) => {
                    // Lost an insert race after a successful build; the
                    // artifact must not outlive the command.
                    if let Some(artifact) = artifact {
                        if let Err(teardown) = self.orchestrator.teardown_image(&artifact).await {
                            tracing::warn!(error = %teardown, "orphaned artifact teardown failed");
                        }
                    }
                    Err(err.into())
                }
            }
        }
        .instrument(command_span("create", "Image"))
        .await
    }

    /// Fetches an image by id.
    pub async fn get_image(&self, id: ImageId) -> Result<Image> {
        expect_image(self.store.fetch(EntityKind::Image, id.as_u64()).await?)
    }

    /// Lists the images of a task in creation order.
    pub async fn list_images(&self, task_id: TaskId) -> Result<Vec<Image>> {
        self.store
            .select(EntityKind::Image, &EntityFilter::TaskId(task_id.as_u64()))
            .await?
            .into_iter()
            .map(expect_image)
            .collect()
    }

    /// Replaces an image document.
    ///
    /// The build outcome (artifact reference and status) is owned by the
    /// orchestrator and survives the replace unchanged.
    pub async fn update_image(&self, id: ImageId, payload: &Value) -> Result<Image> {
        async {
            let parsed = parse_image(payload, PayloadMode::Update)?;
            let task_id: TaskId = parsed.task_id.ok_or_else(|| {
                berth_core::Error::internal("update payload validated without task_id")
            })?;

            let mut refs = vec![
                EntityRef::new(EntityKind::Image, id.as_u64()),
                EntityRef::new(EntityKind::Model, parsed.buildable.model_id().as_u64()),
                EntityRef::new(EntityKind::Task, task_id.as_u64()),
            ];
            if let Some(env) = parsed.environment_id {
                refs.push(EntityRef::new(EntityKind::Environment, env.as_u64()));
            }
            let _guard = self.locks.command(&refs).await?;

            let existing = expect_image(self.store.fetch(EntityKind::Image, id.as_u64()).await?)?;
            let draft = EntityDraft::Image(ImageDraft {
                name: parsed.name,
                task_id,
                buildable: parsed.buildable,
                environment_id: parsed.environment_id,
                params: parsed.params,
                artifact: existing.artifact,
                status: existing.status,
                author: parsed.author,
            });
            graph::check_refs(self.store(), &draft).await?;
            let record: EntityRecord = self.store.replace(EntityKind::Image, id.as_u64(), draft).await?;
            expect_image(record)
        }
        .instrument(command_span("update", "Image"))
        .await
    }

    /// Deletes an image; blocked by live instances unless cascading.
    ///
    /// Unless `meta_only`, a built artifact is torn down on the actuator
    /// before the metadata row goes away.
    pub async fn delete_image(&self, id: ImageId, options: DeleteOptions) -> Result<()> {
        self.delete_entity(EntityKind::Image, id.as_u64(), options)
            .await
    }
}
