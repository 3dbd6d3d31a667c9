//! In-process locking for registry commands.
//!
//! Two levels of exclusion:
//!
//! - **Per-entity-id**: commands that mutate relationships on the same id
//!   are serialized through an async mutex per `(kind, id)`, so a
//!   referential check and its corresponding write are always observed
//!   together.
//! - **Subtree**: a cascading delete takes the write side of a
//!   registry-wide lock while every other mutating command holds the read
//!   side, giving the cascade exclusivity over its whole dependent subtree
//!   without enumerating it up front.
//!
//! Lock acquisition for multiple ids is sorted by `(kind, id)` so two
//! commands locking overlapping sets can never deadlock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use berth_core::{EntityKind, EntityRef};

use crate::error::{Error, Result};

type IdKey = (EntityKind, u64);

/// Lock table shared by all commands of one registry.
#[derive(Debug, Default)]
pub struct EntityLocks {
    tree: Arc<RwLock<()>>,
    // The table only ever grows; entries are tiny and ids are not reused.
    ids: Mutex<HashMap<IdKey, Arc<tokio::sync::Mutex<()>>>>,
}

/// Guard held by an ordinary mutating command.
#[derive(Debug)]
pub struct CommandGuard {
    _tree: OwnedRwLockReadGuard<()>,
    _ids: Vec<OwnedMutexGuard<()>>,
}

/// Guard held by a cascading delete.
#[derive(Debug)]
pub struct SubtreeGuard {
    _tree: OwnedRwLockWriteGuard<()>,
}

impl EntityLocks {
    /// Creates a new lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the command guard for the given entity references.
    ///
    /// References are deduplicated and locked in sorted order.
    pub async fn command(&self, refs: &[EntityRef]) -> Result<CommandGuard> {
        let tree = Arc::clone(&self.tree).read_owned().await;

        let mut keys: Vec<IdKey> = refs.iter().map(|r| (r.kind, r.id)).collect();
        keys.sort_unstable();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            let cell = {
                let mut ids = self
                    .ids
                    .lock()
                    .map_err(|_| Error::Core(berth_core::Error::internal("lock table poisoned")))?;
                Arc::clone(
                    ids.entry(key)
                        .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
                )
            };
            guards.push(cell.lock_owned().await);
        }

        Ok(CommandGuard {
            _tree: tree,
            _ids: guards,
        })
    }

    /// Acquires exclusivity over the whole entity graph for a cascade.
    pub async fn subtree(&self) -> SubtreeGuard {
        SubtreeGuard {
            _tree: Arc::clone(&self.tree).write_owned().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_id_is_mutually_exclusive() {
        let locks = Arc::new(EntityLocks::new());
        let key = [EntityRef::new(EntityKind::Model, 1)];

        let guard = locks.command(&key).await.unwrap();
        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.command(&[EntityRef::new(EntityKind::Model, 1)]).await;
            })
        };
        // The contender cannot finish while the guard is held.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_ids_do_not_block() {
        let locks = EntityLocks::new();
        let _a = locks
            .command(&[EntityRef::new(EntityKind::Model, 1)])
            .await
            .unwrap();
        let _b = locks
            .command(&[EntityRef::new(EntityKind::Model, 2)])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn subtree_excludes_commands() {
        let locks = Arc::new(EntityLocks::new());
        let cascade = locks.subtree().await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.command(&[]).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(cascade);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_refs_are_collapsed() {
        let locks = EntityLocks::new();
        // Locking the same id twice in one command must not self-deadlock.
        let refs = [
            EntityRef::new(EntityKind::Task, 1),
            EntityRef::new(EntityKind::Task, 1),
        ];
        let _guard = locks.command(&refs).await.unwrap();
    }
}
