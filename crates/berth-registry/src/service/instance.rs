//! Instance commands.
//!
//! Instance creation mirrors the build protocol: resolve the image (and
//! environment, when given), start the workload through the actuator, and
//! persist the instance row only once the actuator reports it running. A
//! `run = false` creation registers the declared parameters without
//! touching the actuator at all.

use serde_json::Value;
use tracing::Instrument;

use berth_core::observability::command_span;
use berth_core::payload::parse_instance;
use berth_core::validate::MSG_REQUIRED;
use berth_core::{
    EntityDraft, EntityFilter, EntityKind, EntityRef, EnvironmentId, ImageId, Instance,
    InstanceDraft, InstanceId, InstanceStatus, Issue,
};

use super::{DeleteOptions, Registry, expect_environment, expect_image, expect_instance};
use crate::error::{Error, Result};

impl Registry {
    /// Creates an instance of an image, starting it unless `run` is false.
    pub async fn create_instance(&self, payload: &Value, run: bool) -> Result<Instance> {
        async {
            let parsed = parse_instance(payload)?;

            let mut refs = vec![EntityRef::new(EntityKind::Image, parsed.image_id.as_u64())];
            if let Some(env) = parsed.environment_id {
                refs.push(EntityRef::new(EntityKind::Environment, env.as_u64()));
            }
            let _guard = self.locks.command(&refs).await?;

            let image = match self.store.fetch(EntityKind::Image, parsed.image_id.as_u64()).await {
                Ok(record) => expect_image(record)?,
                Err(berth_core::Error::NotFound { .. }) => {
                    return Err(Error::ReferenceNotFound {
                        kind: EntityKind::Image,
                        id: parsed.image_id.as_u64(),
                    });
                }
                Err(other) => return Err(other.into()),
            };
            let environment = match parsed.environment_id {
                Some(env) => {
                    match self.store.fetch(EntityKind::Environment, env.as_u64()).await {
                        Ok(record) => Some(expect_environment(record)?),
                        Err(berth_core::Error::NotFound { .. }) => {
                            return Err(Error::ReferenceNotFound {
                                kind: EntityKind::Environment,
                                id: env.as_u64(),
                            });
                        }
                        Err(other) => return Err(other.into()),
                    }
                }
                None => None,
            };

            let (runtime, status) = if run {
                let artifact = image.artifact.as_ref().ok_or_else(|| {
                    Error::run(format!("Image {} has no built artifact to run", image.id))
                })?;
                let runtime = self
                    .orchestrator
                    .launch(
                        artifact,
                        environment.as_ref().and_then(|e| e.params.as_ref()),
                        parsed.params.as_ref(),
                    )
                    .await?;
                (Some(runtime), InstanceStatus::Running)
            } else {
                (None, InstanceStatus::Registered)
            };

            let draft = EntityDraft::Instance(InstanceDraft {
                name: parsed.name,
                image_id: parsed.image_id,
                environment_id: parsed.environment_id,
                params: parsed.params,
                runtime: runtime.clone(),
                status,
                author: parsed.author,
            });
            match self.store.insert(draft).await {
                Ok(record) => {
                    tracing::info!(id = record.raw_id(), status = %status, "instance persisted");
                    expect_instance(record)
                }
                Err(err) => {
                    // A started workload must not outlive a failed insert.
                    if let Some(runtime) = runtime {
                        if let Err(stop) = self.orchestrator.stop_instance(&runtime).await {
                            tracing::warn!(error = %stop, "orphaned workload stop failed");
                        }
                    }
                    Err(err.into())
                }
            }
        }
        .instrument(command_span("create", "Instance"))
        .await
    }

    /// Fetches an instance by id.
    pub async fn get_instance(&self, id: InstanceId) -> Result<Instance> {
        expect_instance(self.store.fetch(EntityKind::Instance, id.as_u64()).await?)
    }

    /// Lists instances by image and/or environment, creation order.
    ///
    /// At least one filter is required; listing every instance of the
    /// registry in one call is not supported.
    pub async fn list_instances(
        &self,
        image_id: Option<ImageId>,
        environment_id: Option<EnvironmentId>,
    ) -> Result<Vec<Instance>> {
        if image_id.is_none() && environment_id.is_none() {
            return Err(berth_core::Error::validation(vec![
                Issue::new(vec!["image_id".into()], MSG_REQUIRED),
                Issue::new(vec!["environment_id".into()], MSG_REQUIRED),
            ])
            .into());
        }
        self.store
            .select(
                EntityKind::Instance,
                &EntityFilter::Deployment {
                    image_id: image_id.map(|id| id.as_u64()),
                    environment_id: environment_id.map(|id| id.as_u64()),
                },
            )
            .await?
            .into_iter()
            .map(expect_instance)
            .collect()
    }

    /// Replaces an instance document.
    ///
    /// The run outcome (runtime handle and status) is owned by the
    /// orchestrator and survives the replace unchanged.
    pub async fn update_instance(&self, id: InstanceId, payload: &Value) -> Result<Instance> {
        async {
            let parsed = parse_instance(payload)?;

            let mut refs = vec![
                EntityRef::new(EntityKind::Instance, id.as_u64()),
                EntityRef::new(EntityKind::Image, parsed.image_id.as_u64()),
            ];
            if let Some(env) = parsed.environment_id {
                refs.push(EntityRef::new(EntityKind::Environment, env.as_u64()));
            }
            let _guard = self.locks.command(&refs).await?;

            let existing =
                expect_instance(self.store.fetch(EntityKind::Instance, id.as_u64()).await?)?;
            let draft = EntityDraft::Instance(InstanceDraft {
                name: parsed.name,
                image_id: parsed.image_id,
                environment_id: parsed.environment_id,
                params: parsed.params,
                runtime: existing.runtime,
                status: existing.status,
                author: parsed.author,
            });
            crate::graph::check_refs(self.store(), &draft).await?;
            expect_instance(
                self.store
                    .replace(EntityKind::Instance, id.as_u64(), draft)
                    .await?,
            )
        }
        .instrument(command_span("update", "Instance"))
        .await
    }

    /// Deletes an instance.
    ///
    /// Unless `meta_only`, a running workload is stopped on the actuator
    /// before the metadata row goes away.
    pub async fn delete_instance(&self, id: InstanceId, options: DeleteOptions) -> Result<()> {
        self.delete_entity(EntityKind::Instance, id.as_u64(), options)
            .await
    }
}
