//! Project commands.

use serde_json::Value;

use berth_core::payload::parse_project;
use berth_core::{EntityDraft, EntityFilter, EntityKind, Project, ProjectId};

use super::{DeleteOptions, Registry, expect_project};
use crate::error::Result;

impl Registry {
    /// Creates a project.
    pub async fn create_project(&self, payload: &Value) -> Result<Project> {
        let draft = parse_project(payload)?;
        expect_project(self.create_plain(EntityDraft::Project(draft)).await?)
    }

    /// Fetches a project by id.
    pub async fn get_project(&self, id: ProjectId) -> Result<Project> {
        expect_project(self.store.fetch(EntityKind::Project, id.as_u64()).await?)
    }

    /// Lists all projects in creation order.
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.store
            .select(EntityKind::Project, &EntityFilter::All)
            .await?
            .into_iter()
            .map(expect_project)
            .collect()
    }

    /// Replaces a project document.
    pub async fn update_project(&self, id: ProjectId, payload: &Value) -> Result<Project> {
        let draft = parse_project(payload)?;
        expect_project(
            self.update_plain(EntityKind::Project, id.as_u64(), EntityDraft::Project(draft))
                .await?,
        )
    }

    /// Deletes a project; blocked by live tasks unless cascading.
    pub async fn delete_project(&self, id: ProjectId, options: DeleteOptions) -> Result<()> {
        self.delete_entity(EntityKind::Project, id.as_u64(), options)
            .await
    }
}
