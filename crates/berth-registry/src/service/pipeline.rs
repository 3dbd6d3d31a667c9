//! Pipeline commands.

use serde_json::Value;

use berth_core::payload::parse_pipeline;
use berth_core::{EntityDraft, EntityFilter, EntityKind, Pipeline, PipelineId, TaskId};

use super::{DeleteOptions, Registry, expect_pipeline};
use crate::error::Result;

impl Registry {
    /// Creates a pipeline under an existing task.
    pub async fn create_pipeline(&self, payload: &Value) -> Result<Pipeline> {
        let draft = parse_pipeline(payload)?;
        expect_pipeline(self.create_plain(EntityDraft::Pipeline(draft)).await?)
    }

    /// Fetches a pipeline by id.
    pub async fn get_pipeline(&self, id: PipelineId) -> Result<Pipeline> {
        expect_pipeline(self.store.fetch(EntityKind::Pipeline, id.as_u64()).await?)
    }

    /// Lists the pipelines of a task in creation order.
    pub async fn list_pipelines(&self, task_id: TaskId) -> Result<Vec<Pipeline>> {
        self.store
            .select(
                EntityKind::Pipeline,
                &EntityFilter::TaskId(task_id.as_u64()),
            )
            .await?
            .into_iter()
            .map(expect_pipeline)
            .collect()
    }

    /// Replaces a pipeline document.
    pub async fn update_pipeline(&self, id: PipelineId, payload: &Value) -> Result<Pipeline> {
        let draft = parse_pipeline(payload)?;
        expect_pipeline(
            self.update_plain(
                EntityKind::Pipeline,
                id.as_u64(),
                EntityDraft::Pipeline(draft),
            )
            .await?,
        )
    }

    /// Deletes a pipeline.
    pub async fn delete_pipeline(&self, id: PipelineId, options: DeleteOptions) -> Result<()> {
        self.delete_entity(EntityKind::Pipeline, id.as_u64(), options)
            .await
    }
}
