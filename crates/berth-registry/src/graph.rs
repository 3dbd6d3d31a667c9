//! The dependency graph between entity kinds.
//!
//! Parent/child relationships are enumerated in a static edge table rather
//! than discovered from the records themselves: each edge names the parent
//! kind, the child kind, and the join key that selects the children. The
//! same table drives reference resolution on create/update, the
//! blocked-delete check, and cascade collection, so the three can never
//! disagree about what depends on what.

use std::collections::HashSet;

use berth_core::{EntityDraft, EntityFilter, EntityKind, EntityRecord, EntityRef, EntityStore};

use crate::error::{Error, Result};

/// How a child kind joins to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKey {
    /// Child's `project_id` equals the parent id.
    ProjectId,
    /// Child's `task_id` equals the parent id.
    TaskId,
    /// Child's buildable descriptor references the parent model.
    BuildableModel,
    /// Child's `environment_id` equals the parent id.
    EnvironmentId,
    /// Child's `image_id` equals the parent id.
    ImageId,
}

impl JoinKey {
    /// Returns the list filter selecting children joined to `parent_id`.
    #[must_use]
    pub const fn filter(&self, parent_id: u64) -> EntityFilter {
        match self {
            Self::ProjectId => EntityFilter::ProjectId(parent_id),
            Self::TaskId => EntityFilter::TaskId(parent_id),
            Self::BuildableModel => EntityFilter::ModelRef(parent_id),
            Self::EnvironmentId => EntityFilter::EnvironmentId(parent_id),
            Self::ImageId => EntityFilter::ImageId(parent_id),
        }
    }
}

/// One parent-kind to child-kind dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyEdge {
    /// The kind being depended on.
    pub parent: EntityKind,
    /// The kind that depends on it.
    pub child: EntityKind,
    /// The join key selecting the children of one parent.
    pub join: JoinKey,
}

const fn edge(parent: EntityKind, child: EntityKind, join: JoinKey) -> DependencyEdge {
    DependencyEdge {
        parent,
        child,
        join,
    }
}

/// Every dependency edge in the entity graph.
pub const EDGES: &[DependencyEdge] = &[
    edge(EntityKind::Project, EntityKind::Task, JoinKey::ProjectId),
    edge(EntityKind::Task, EntityKind::Model, JoinKey::TaskId),
    edge(EntityKind::Task, EntityKind::Pipeline, JoinKey::TaskId),
    edge(EntityKind::Task, EntityKind::Image, JoinKey::TaskId),
    edge(EntityKind::Model, EntityKind::Image, JoinKey::BuildableModel),
    edge(
        EntityKind::Environment,
        EntityKind::Image,
        JoinKey::EnvironmentId,
    ),
    edge(
        EntityKind::Environment,
        EntityKind::Instance,
        JoinKey::EnvironmentId,
    ),
    edge(EntityKind::Image, EntityKind::Instance, JoinKey::ImageId),
];

/// Returns the `(child kind, filter)` pairs selecting direct dependents.
#[must_use]
pub fn child_filters(kind: EntityKind, id: u64) -> Vec<(EntityKind, EntityFilter)> {
    EDGES
        .iter()
        .filter(|edge| edge.parent == kind)
        .map(|edge| (edge.child, edge.join.filter(id)))
        .collect()
}

/// Resolves every foreign key of a draft against the store.
///
/// The first unresolved reference aborts with `ReferenceNotFound`; nothing
/// is written by this check.
pub async fn check_refs(store: &dyn EntityStore, draft: &EntityDraft) -> Result<()> {
    for reference in draft.required_refs() {
        if !store.exists(reference.kind, reference.id).await? {
            return Err(Error::ReferenceNotFound {
                kind: reference.kind,
                id: reference.id,
            });
        }
    }
    Ok(())
}

/// Lists the direct dependents of an entity, edge-table order.
pub async fn direct_dependents(
    store: &dyn EntityStore,
    kind: EntityKind,
    id: u64,
) -> Result<Vec<EntityRecord>> {
    let mut dependents = Vec::new();
    for (child, filter) in child_filters(kind, id) {
        dependents.extend(store.select(child, &filter).await?);
    }
    Ok(dependents)
}

/// Collects the full dependent subtree of an entity, deletion order.
///
/// Depth-first walk over [`EDGES`] from the target, emitting records in
/// post-order: every record precedes all of its ancestors, so deleting the
/// returned sequence front to back never removes a parent before its
/// dependents. The target itself is the last element. Records reachable
/// through more than one edge (an instance under both its image and its
/// environment) are emitted once.
pub async fn collect_subtree(
    store: &dyn EntityStore,
    kind: EntityKind,
    id: u64,
) -> Result<Vec<EntityRecord>> {
    enum Frame {
        Enter(EntityRef),
        Exit(EntityRecord),
    }

    let mut order = Vec::new();
    let mut visited: HashSet<(EntityKind, u64)> = HashSet::new();
    let mut stack = vec![Frame::Enter(EntityRef::new(kind, id))];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(entity) => {
                if !visited.insert((entity.kind, entity.id)) {
                    continue;
                }
                let record = store.fetch(entity.kind, entity.id).await?;
                stack.push(Frame::Exit(record));
                for (child, filter) in child_filters(entity.kind, entity.id) {
                    for dependent in store.select(child, &filter).await? {
                        stack.push(Frame::Enter(dependent.entity_ref()));
                    }
                }
            }
            Frame::Exit(record) => order.push(record),
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use berth_core::{
        Buildable, EntityDraft, ImageDraft, ImageStatus, InstanceDraft, InstanceStatus,
        MemoryStore, ModelDraft, ModelId, ProjectDraft, ProjectId, TaskDraft, TaskId,
    };

    async fn seed_tree(store: &MemoryStore) {
        store
            .insert(EntityDraft::Project(ProjectDraft {
                name: "p1".into(),
                author: None,
            }))
            .await
            .unwrap();
        store
            .insert(EntityDraft::Task(TaskDraft {
                name: "t1".into(),
                project_id: ProjectId::from_raw(1),
                author: None,
            }))
            .await
            .unwrap();
        store
            .insert(EntityDraft::Model(ModelDraft {
                name: "m1".into(),
                task_id: TaskId::from_raw(1),
                artifacts: Default::default(),
                author: None,
            }))
            .await
            .unwrap();
        store
            .insert(EntityDraft::Image(ImageDraft {
                name: "i1".into(),
                task_id: TaskId::from_raw(1),
                buildable: Buildable::Model {
                    model_id: ModelId::from_raw(1),
                    server_type: "rest".into(),
                },
                environment_id: None,
                params: None,
                artifact: None,
                status: ImageStatus::Registered,
                author: None,
            }))
            .await
            .unwrap();
        store
            .insert(EntityDraft::Instance(InstanceDraft {
                name: "run1".into(),
                image_id: berth_core::ImageId::from_raw(1),
                environment_id: None,
                params: None,
                runtime: None,
                status: InstanceStatus::Registered,
                author: None,
            }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn direct_dependents_follow_the_edge_table() {
        let store = MemoryStore::new();
        seed_tree(&store).await;

        let of_project = direct_dependents(&store, EntityKind::Project, 1).await.unwrap();
        assert_eq!(of_project.len(), 1);
        assert_eq!(of_project[0].kind(), EntityKind::Task);

        let of_model = direct_dependents(&store, EntityKind::Model, 1).await.unwrap();
        assert_eq!(of_model.len(), 1);
        assert_eq!(of_model[0].kind(), EntityKind::Image);
    }

    #[tokio::test]
    async fn subtree_is_ordered_dependents_first() {
        let store = MemoryStore::new();
        seed_tree(&store).await;

        let order = collect_subtree(&store, EntityKind::Project, 1).await.unwrap();
        let kinds: Vec<_> = order.iter().map(EntityRecord::kind).collect();
        assert_eq!(kinds.last(), Some(&EntityKind::Project));

        // No record may appear after one of its ancestors.
        let position = |kind: EntityKind| kinds.iter().position(|k| *k == kind).unwrap();
        assert!(position(EntityKind::Instance) < position(EntityKind::Image));
        assert!(position(EntityKind::Image) < position(EntityKind::Model));
        assert!(position(EntityKind::Model) < position(EntityKind::Task));
        assert!(position(EntityKind::Task) < position(EntityKind::Project));
        assert_eq!(order.len(), 5);
    }

    #[tokio::test]
    async fn subtree_visits_shared_dependents_once() {
        let store = MemoryStore::new();
        seed_tree(&store).await;
        // An environment referenced by both the image and the instance.
        store
            .insert(EntityDraft::Environment(berth_core::EnvironmentDraft {
                name: "e1".into(),
                params: None,
                author: None,
            }))
            .await
            .unwrap();
        store
            .insert(EntityDraft::Instance(InstanceDraft {
                name: "run2".into(),
                image_id: berth_core::ImageId::from_raw(1),
                environment_id: Some(berth_core::EnvironmentId::from_raw(1)),
                params: None,
                runtime: None,
                status: InstanceStatus::Registered,
                author: None,
            }))
            .await
            .unwrap();

        let order = collect_subtree(&store, EntityKind::Environment, 1).await.unwrap();
        // run2 once, then the environment.
        assert_eq!(order.len(), 2);
        assert_eq!(order[0].kind(), EntityKind::Instance);
        assert_eq!(order[1].kind(), EntityKind::Environment);
    }

    #[tokio::test]
    async fn check_refs_names_the_missing_parent() {
        let store = MemoryStore::new();
        let draft = EntityDraft::Task(TaskDraft {
            name: "t1".into(),
            project_id: ProjectId::from_raw(1),
            author: None,
        });
        let err = check_refs(&store, &draft).await.unwrap_err();
        assert_eq!(err.to_string(), "Project with id 1 does not exist");
        assert_eq!(err.code(), "REFERENCE_NOT_FOUND");
    }
}
