//! Environment commands.

use serde_json::Value;

use berth_core::payload::parse_environment;
use berth_core::{EntityDraft, EntityFilter, EntityKind, Environment, EnvironmentId};

use super::{DeleteOptions, Registry, expect_environment};
use crate::error::Result;

impl Registry {
    /// Creates an environment.
    pub async fn create_environment(&self, payload: &Value) -> Result<Environment> {
        let draft = parse_environment(payload)?;
        expect_environment(self.create_plain(EntityDraft::Environment(draft)).await?)
    }

    /// Fetches an environment by id.
    pub async fn get_environment(&self, id: EnvironmentId) -> Result<Environment> {
        expect_environment(
            self.store
                .fetch(EntityKind::Environment, id.as_u64())
                .await?,
        )
    }

    /// Lists all environments in creation order.
    pub async fn list_environments(&self) -> Result<Vec<Environment>> {
        self.store
            .select(EntityKind::Environment, &EntityFilter::All)
            .await?
            .into_iter()
            .map(expect_environment)
            .collect()
    }

    /// Replaces an environment document.
    pub async fn update_environment(
        &self,
        id: EnvironmentId,
        payload: &Value,
    ) -> Result<Environment> {
        let draft = parse_environment(payload)?;
        expect_environment(
            self.update_plain(
                EntityKind::Environment,
                id.as_u64(),
                EntityDraft::Environment(draft),
            )
            .await?,
        )
    }

    /// Deletes an environment; blocked by images or instances pinned to it
    /// unless cascading.
    pub async fn delete_environment(
        &self,
        id: EnvironmentId,
        options: DeleteOptions,
    ) -> Result<()> {
        self.delete_entity(EntityKind::Environment, id.as_u64(), options)
            .await
    }
}
