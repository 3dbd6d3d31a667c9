//! Model commands, including artifact streaming.

use bytes::Bytes;
use serde_json::Value;

use berth_core::payload::parse_model;
use berth_core::{EntityDraft, EntityFilter, EntityKind, Model, ModelId, TaskId};

use super::{DeleteOptions, Registry, expect_model};
use crate::error::Result;

impl Registry {
    /// Creates a model under an existing task.
    pub async fn create_model(&self, payload: &Value) -> Result<Model> {
        let draft = parse_model(payload)?;
        expect_model(self.create_plain(EntityDraft::Model(draft)).await?)
    }

    /// Fetches a model by id.
    pub async fn get_model(&self, id: ModelId) -> Result<Model> {
        expect_model(self.store.fetch(EntityKind::Model, id.as_u64()).await?)
    }

    /// Lists the models of a task in creation order.
    pub async fn list_models(&self, task_id: TaskId) -> Result<Vec<Model>> {
        self.store
            .select(EntityKind::Model, &EntityFilter::TaskId(task_id.as_u64()))
            .await?
            .into_iter()
            .map(expect_model)
            .collect()
    }

    /// Replaces a model document.
    pub async fn update_model(&self, id: ModelId, payload: &Value) -> Result<Model> {
        let draft = parse_model(payload)?;
        expect_model(
            self.update_plain(EntityKind::Model, id.as_u64(), EntityDraft::Model(draft))
                .await?,
        )
    }

    /// Deletes a model; blocked by images built from it unless cascading.
    pub async fn delete_model(&self, id: ModelId, options: DeleteOptions) -> Result<()> {
        self.delete_entity(EntityKind::Model, id.as_u64(), options)
            .await
    }

    /// Streams the bytes of a registered model artifact.
    ///
    /// Whether the model or the artifact name is the missing piece is not
    /// recoverable from the error.
    pub async fn open_artifact(&self, model_id: ModelId, artifact: &str) -> Result<Bytes> {
        self.artifacts.open(model_id, artifact).await
    }
}
