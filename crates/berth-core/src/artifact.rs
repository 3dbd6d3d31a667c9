//! Blob storage for model artifact bytes.
//!
//! The registry never interprets artifact content; it only maps registered
//! artifact names to blob keys and answers "does this exist" and "stream
//! these bytes" through this interface.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{Error, Result};

/// Byte storage addressed by opaque keys.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Reads the blob behind a key.
    ///
    /// Returns `Error::BlobNotFound` when nothing is stored there.
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Writes a blob, overwriting any previous content.
    async fn put(&self, key: &str, data: Bytes) -> Result<()>;

    /// Deletes a blob. Succeeds when the key is already absent (idempotent).
    async fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory blob store for testing and embedded use.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    /// Creates a new empty blob store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Bytes> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| Error::internal("blob lock poisoned"))?;
        blobs.get(key).cloned().ok_or_else(|| Error::BlobNotFound {
            key: key.to_string(),
        })
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        self.blobs
            .write()
            .map_err(|_| Error::internal("blob lock poisoned"))?
            .insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.blobs
            .write()
            .map_err(|_| Error::internal("blob lock poisoned"))?
            .remove(key);
        Ok(())
    }
}
