//! Task commands.

use serde_json::Value;

use berth_core::payload::parse_task;
use berth_core::{EntityDraft, EntityFilter, EntityKind, ProjectId, Task, TaskId};

use super::{DeleteOptions, Registry, expect_task};
use crate::error::Result;

impl Registry {
    /// Creates a task under an existing project.
    pub async fn create_task(&self, payload: &Value) -> Result<Task> {
        let draft = parse_task(payload)?;
        expect_task(self.create_plain(EntityDraft::Task(draft)).await?)
    }

    /// Fetches a task by id.
    pub async fn get_task(&self, id: TaskId) -> Result<Task> {
        expect_task(self.store.fetch(EntityKind::Task, id.as_u64()).await?)
    }

    /// Lists the tasks of a project in creation order.
    pub async fn list_tasks(&self, project_id: ProjectId) -> Result<Vec<Task>> {
        self.store
            .select(
                EntityKind::Task,
                &EntityFilter::ProjectId(project_id.as_u64()),
            )
            .await?
            .into_iter()
            .map(expect_task)
            .collect()
    }

    /// Replaces a task document.
    pub async fn update_task(&self, id: TaskId, payload: &Value) -> Result<Task> {
        let draft = parse_task(payload)?;
        expect_task(
            self.update_plain(EntityKind::Task, id.as_u64(), EntityDraft::Task(draft))
                .await?,
        )
    }

    /// Deletes a task; blocked by live models, pipelines, or images unless
    /// cascading.
    pub async fn delete_task(&self, id: TaskId, options: DeleteOptions) -> Result<()> {
        self.delete_entity(EntityKind::Task, id.as_u64(), options)
            .await
    }
}
