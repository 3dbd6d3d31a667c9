//! Artifact reference resolution.
//!
//! Maps a model's registered artifact names to retrievable byte streams.
//! Only two questions are answered here: does the artifact exist, and what
//! are its bytes. A missing model and a missing artifact name produce the
//! same error, so the error alone cannot be used as an existence oracle
//! for either.

use std::sync::Arc;

use bytes::Bytes;

use berth_core::{BlobStore, EntityKind, EntityStore, ModelId};

use crate::error::{Error, Result};

/// Streams registered model artifacts out of blob storage.
#[derive(Clone)]
pub struct ArtifactResolver {
    store: Arc<dyn EntityStore>,
    blobs: Arc<dyn BlobStore>,
}

impl ArtifactResolver {
    /// Creates a resolver over the entity and blob stores.
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Opens the named artifact of a model as a byte stream.
    pub async fn open(&self, model_id: ModelId, artifact: &str) -> Result<Bytes> {
        let uniform = || {
            Error::Core(berth_core::Error::ArtifactNotFound {
                model_id: model_id.as_u64(),
                artifact: artifact.to_string(),
            })
        };

        let model = match self.store.fetch(EntityKind::Model, model_id.as_u64()).await {
            Ok(record) => record.into_model().ok_or_else(uniform)?,
            Err(berth_core::Error::NotFound { .. }) => return Err(uniform()),
            Err(other) => return Err(Error::Core(other)),
        };

        let key = model.artifacts.get(artifact).ok_or_else(uniform)?;
        match self.blobs.get(key).await {
            Ok(bytes) => Ok(bytes),
            Err(berth_core::Error::BlobNotFound { .. }) => Err(uniform()),
            Err(other) => Err(Error::Core(other)),
        }
    }
}

impl std::fmt::Debug for ArtifactResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactResolver").finish_non_exhaustive()
    }
}
