//! Entity store abstraction and the in-memory reference backend.
//!
//! The store is key-addressed persistence for each entity kind: insert,
//! get-by-id, filtered list, full-document replace, delete, and existence
//! checks. It enforces exactly one graph rule itself - name uniqueness
//! within a record's scope - because that check must be atomic with the
//! write. Foreign-key resolution and delete semantics live above the store
//! in the referential integrity layer.
//!
//! All operations on a given id are atomic with respect to concurrent
//! operations on the same id: no partial write is ever observable.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::entity::{EntityDraft, EntityFilter, EntityKind, EntityRecord};
use crate::error::{Error, Result};

/// Key-addressed persistence for entity records.
///
/// Backends must be safe to share across tasks. Listing returns records in
/// creation order; listing against a filter whose parent entity does not
/// exist is a not-found error for that parent, distinct from an empty
/// result.
#[async_trait]
pub trait EntityStore: Send + Sync + 'static {
    /// Persists a draft, assigning the next id of its kind.
    ///
    /// Returns `Error::DuplicateName` when the draft's name collides within
    /// its scope.
    async fn insert(&self, draft: EntityDraft) -> Result<EntityRecord>;

    /// Fetches one record by kind and id.
    ///
    /// Returns `Error::NotFound` when absent.
    async fn fetch(&self, kind: EntityKind, id: u64) -> Result<EntityRecord>;

    /// Lists records of a kind matching the filter, in creation order.
    async fn select(&self, kind: EntityKind, filter: &EntityFilter) -> Result<Vec<EntityRecord>>;

    /// Replaces the full document behind an id, keeping id and creation date.
    ///
    /// Returns `Error::NotFound` when absent and `Error::DuplicateName` when
    /// the replacement name collides within its (possibly new) scope.
    async fn replace(&self, kind: EntityKind, id: u64, draft: EntityDraft) -> Result<EntityRecord>;

    /// Deletes one record by kind and id.
    ///
    /// Returns `Error::NotFound` when absent.
    async fn remove(&self, kind: EntityKind, id: u64) -> Result<()>;

    /// Returns whether a record exists.
    async fn exists(&self, kind: EntityKind, id: u64) -> Result<bool>;
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<EntityKind, BTreeMap<u64, EntityRecord>>,
    sequences: HashMap<EntityKind, u64>,
}

impl Inner {
    fn table(&self, kind: EntityKind) -> Option<&BTreeMap<u64, EntityRecord>> {
        self.tables.get(&kind)
    }

    fn ref_exists(&self, kind: EntityKind, id: u64) -> bool {
        self.table(kind).is_some_and(|t| t.contains_key(&id))
    }

    /// Name-uniqueness scan within the draft's scope, skipping `exclude`.
    fn name_taken(&self, draft: &EntityDraft, exclude: Option<u64>) -> bool {
        let scope = draft.scope();
        self.table(draft.kind()).is_some_and(|table| {
            table.values().any(|record| {
                Some(record.raw_id()) != exclude
                    && record.scope() == scope
                    && record.name() == draft.name()
            })
        })
    }
}

/// In-memory entity store.
///
/// Thread-safe via `RwLock`; id sequences are per kind and never reused.
/// The backend of choice for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(_: impl std::fmt::Debug) -> Error {
    Error::internal("store lock poisoned")
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert(&self, draft: EntityDraft) -> Result<EntityRecord> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.name_taken(&draft, None) {
            return Err(Error::DuplicateName {
                kind: draft.kind(),
                name: draft.name().to_string(),
            });
        }
        let kind = draft.kind();
        let id = inner
            .sequences
            .get(&kind)
            .copied()
            .unwrap_or(0)
            .saturating_add(1);
        inner.sequences.insert(kind, id);
        let record = draft.into_record(id, Utc::now());
        inner.tables.entry(kind).or_default().insert(id, record.clone());
        drop(inner);
        Ok(record)
    }

    async fn fetch(&self, kind: EntityKind, id: u64) -> Result<EntityRecord> {
        let inner = self.inner.read().map_err(poisoned)?;
        inner
            .table(kind)
            .and_then(|t| t.get(&id))
            .cloned()
            .ok_or(Error::NotFound { kind, id })
    }

    async fn select(&self, kind: EntityKind, filter: &EntityFilter) -> Result<Vec<EntityRecord>> {
        let inner = self.inner.read().map_err(poisoned)?;
        for parent in filter.parents() {
            if !inner.ref_exists(parent.kind, parent.id) {
                return Err(Error::NotFound {
                    kind: parent.kind,
                    id: parent.id,
                });
            }
        }
        Ok(inner
            .table(kind)
            .map(|table| {
                table
                    .values()
                    .filter(|record| record.matches(filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn replace(&self, kind: EntityKind, id: u64, draft: EntityDraft) -> Result<EntityRecord> {
        if draft.kind() != kind {
            return Err(Error::InvalidInput(format!(
                "cannot replace {} with a {} draft",
                kind,
                draft.kind()
            )));
        }
        let mut inner = self.inner.write().map_err(poisoned)?;
        let creation_date = inner
            .table(kind)
            .and_then(|t| t.get(&id))
            .map(EntityRecord::creation_date)
            .ok_or(Error::NotFound { kind, id })?;
        if inner.name_taken(&draft, Some(id)) {
            return Err(Error::DuplicateName {
                kind,
                name: draft.name().to_string(),
            });
        }
        let record = draft.into_record(id, creation_date);
        inner.tables.entry(kind).or_default().insert(id, record.clone());
        drop(inner);
        Ok(record)
    }

    async fn remove(&self, kind: EntityKind, id: u64) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner
            .tables
            .get_mut(&kind)
            .and_then(|t| t.remove(&id))
            .map(|_| ())
            .ok_or(Error::NotFound { kind, id })
    }

    async fn exists(&self, kind: EntityKind, id: u64) -> Result<bool> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.ref_exists(kind, id))
    }
}
