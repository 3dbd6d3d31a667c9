//! Buildable resolution.
//!
//! A buildable descriptor is declarative: it names a model and a server
//! adapter tag. Resolution happens exactly once, when an image is created:
//! the model reference is checked against the store and the adapter tag
//! against the registry, producing a self-contained [`BuildSpec`] the
//! orchestrator can hand to the actuator without further lookups.

use berth_core::{Buildable, EntityKind, EntityStore, Issue, Model};

use crate::adapters::{AdapterRegistry, ServerAdapter};
use crate::error::{Error, Result};

/// Everything the actuator needs to build one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    /// Name of the image being built.
    pub image_name: String,
    /// Snapshot of the model being packaged, including its artifact keys.
    pub model: Model,
    /// The server adapter that will serve the model.
    pub adapter: ServerAdapter,
}

/// Resolves buildable descriptors into build specifications.
#[derive(Debug, Clone)]
pub struct BuildableResolver {
    adapters: AdapterRegistry,
}

impl BuildableResolver {
    /// Creates a resolver over an explicit adapter registry.
    #[must_use]
    pub const fn new(adapters: AdapterRegistry) -> Self {
        Self { adapters }
    }

    /// Resolves a buildable against an existing model.
    ///
    /// Fails with `ReferenceNotFound` when the model does not exist and
    /// with a validation error when the adapter tag is unknown.
    pub async fn resolve(
        &self,
        store: &dyn EntityStore,
        image_name: &str,
        buildable: &Buildable,
    ) -> Result<BuildSpec> {
        let model_id = buildable.model_id();
        let record = store
            .fetch(EntityKind::Model, model_id.as_u64())
            .await
            .map_err(|err| match err {
                berth_core::Error::NotFound { .. } => Error::ReferenceNotFound {
                    kind: EntityKind::Model,
                    id: model_id.as_u64(),
                },
                other => Error::Core(other),
            })?;
        let model = record.into_model().ok_or_else(|| {
            Error::Core(berth_core::Error::internal("store returned non-model record"))
        })?;

        let tag = buildable.server_type();
        let adapter = self.adapters.get(tag).cloned().ok_or_else(|| {
            Error::Core(berth_core::Error::validation(vec![Issue::new(
                vec!["buildable".into(), "server_type".into()],
                format!("unknown server type '{tag}'"),
            )]))
        })?;

        Ok(BuildSpec {
            image_name: image_name.to_string(),
            model,
            adapter,
        })
    }
}
