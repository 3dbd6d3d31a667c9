//! An entity store wrapper that records operations for assertions.

use std::sync::Mutex;

use async_trait::async_trait;

use berth_core::{
    EntityDraft, EntityFilter, EntityKind, EntityRecord, EntityStore, MemoryStore, Result,
};

/// One recorded mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// A draft was inserted, producing the given id.
    Insert(EntityKind, u64),
    /// A record was replaced.
    Replace(EntityKind, u64),
    /// A record was removed.
    Remove(EntityKind, u64),
}

/// Memory store that records every mutation in order.
///
/// Reads are passed through untouched; mutation order is what cascade and
/// rollback tests assert on.
#[derive(Debug, Default)]
pub struct TracingMemoryStore {
    inner: MemoryStore,
    ops: Mutex<Vec<StoreOp>>,
}

impl TracingMemoryStore {
    /// Creates an empty tracing store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded mutation, in order.
    #[must_use]
    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.lock().expect("ops lock").clone()
    }

    /// The recorded removals only, in order.
    #[must_use]
    pub fn removals(&self) -> Vec<(EntityKind, u64)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                StoreOp::Remove(kind, id) => Some((kind, id)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, op: StoreOp) {
        self.ops.lock().expect("ops lock").push(op);
    }
}

#[async_trait]
impl EntityStore for TracingMemoryStore {
    async fn insert(&self, draft: EntityDraft) -> Result<EntityRecord> {
        let record = self.inner.insert(draft).await?;
        self.record(StoreOp::Insert(record.kind(), record.raw_id()));
        Ok(record)
    }

    async fn fetch(&self, kind: EntityKind, id: u64) -> Result<EntityRecord> {
        self.inner.fetch(kind, id).await
    }

    async fn select(&self, kind: EntityKind, filter: &EntityFilter) -> Result<Vec<EntityRecord>> {
        self.inner.select(kind, filter).await
    }

    async fn replace(&self, kind: EntityKind, id: u64, draft: EntityDraft) -> Result<EntityRecord> {
        let record = self.inner.replace(kind, id, draft).await?;
        self.record(StoreOp::Replace(kind, id));
        Ok(record)
    }

    async fn remove(&self, kind: EntityKind, id: u64) -> Result<()> {
        self.inner.remove(kind, id).await?;
        self.record(StoreOp::Remove(kind, id));
        Ok(())
    }

    async fn exists(&self, kind: EntityKind, id: u64) -> Result<bool> {
        self.inner.exists(kind, id).await
    }
}
