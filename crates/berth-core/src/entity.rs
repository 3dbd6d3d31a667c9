//! Entity records for the registry.
//!
//! Seven kinds form the entity graph: Project → Task → {Model, Pipeline,
//! Image} with Images referencing Models through their buildable
//! descriptor, Instances referencing Images, and Environments referenced by
//! both Images and Instances. Every record carries a store-assigned id, a
//! name unique within its scope, an optional author, and its creation date.
//!
//! Records are immutable documents from the store's point of view: updates
//! replace the whole record, keeping only id and creation date.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor::{Buildable, EnvironmentParams, ImageParams, InstanceParams};
use crate::id::{EnvironmentId, ImageId, InstanceId, ModelId, PipelineId, ProjectId, TaskId};

/// The seven entity kinds tracked by the registry.
///
/// The derived ordering follows the hierarchy (roots first) and gives
/// multi-lock acquisition a deterministic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Top-level grouping of work.
    Project,
    /// A unit of work within a project.
    Task,
    /// A trained model registered under a task.
    Model,
    /// A target runtime environment.
    Environment,
    /// A built (or registered) deployment image.
    Image,
    /// A running (or registered) instance of an image.
    Instance,
    /// A pipeline registered under a task.
    Pipeline,
}

impl EntityKind {
    /// All kinds, hierarchy roots first.
    pub const ALL: [Self; 7] = [
        Self::Project,
        Self::Task,
        Self::Model,
        Self::Environment,
        Self::Image,
        Self::Instance,
        Self::Pipeline,
    ];

    /// Returns the capitalized kind label used in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Task => "Task",
            Self::Model => "Model",
            Self::Environment => "Environment",
            Self::Image => "Image",
            Self::Instance => "Instance",
            Self::Pipeline => "Pipeline",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(kind, id)` reference to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// The referenced kind.
    pub kind: EntityKind,
    /// The referenced raw id.
    pub id: u64,
}

impl EntityRef {
    /// Creates a reference from kind and raw id.
    #[must_use]
    pub const fn new(kind: EntityKind, id: u64) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with id {}", self.kind, self.id)
    }
}

/// Scope within which an entity's name must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameScope {
    /// Unique across all entities of the kind.
    Global,
    /// Unique among siblings under one project.
    Project(u64),
    /// Unique among siblings under one task.
    Task(u64),
    /// Unique among instances of one image/environment pair.
    Deployment {
        /// The image the instance runs.
        image_id: u64,
        /// The environment the instance runs in, if pinned.
        environment_id: Option<u64>,
    },
}

/// Filter for list queries, keyed by a parent reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityFilter {
    /// Everything of the kind, in creation order.
    All,
    /// Children of a project.
    ProjectId(u64),
    /// Children of a task.
    TaskId(u64),
    /// Images whose buildable references the model.
    ModelRef(u64),
    /// Entities pinned to an environment.
    EnvironmentId(u64),
    /// Instances of an image.
    ImageId(u64),
    /// Instances matching an image and/or environment.
    Deployment {
        /// Image filter, if any.
        image_id: Option<u64>,
        /// Environment filter, if any.
        environment_id: Option<u64>,
    },
}

impl EntityFilter {
    /// Parent references that must exist for the filter to be answerable.
    ///
    /// Listing against a non-existent parent is a not-found error, distinct
    /// from an empty result.
    #[must_use]
    pub fn parents(&self) -> Vec<EntityRef> {
        match self {
            Self::All => Vec::new(),
            Self::ProjectId(id) => vec![EntityRef::new(EntityKind::Project, *id)],
            Self::TaskId(id) => vec![EntityRef::new(EntityKind::Task, *id)],
            Self::ModelRef(id) => vec![EntityRef::new(EntityKind::Model, *id)],
            Self::EnvironmentId(id) => vec![EntityRef::new(EntityKind::Environment, *id)],
            Self::ImageId(id) => vec![EntityRef::new(EntityKind::Image, *id)],
            Self::Deployment {
                image_id,
                environment_id,
            } => {
                let mut parents = Vec::new();
                if let Some(id) = image_id {
                    parents.push(EntityRef::new(EntityKind::Image, *id));
                }
                if let Some(id) = environment_id {
                    parents.push(EntityRef::new(EntityKind::Environment, *id));
                }
                parents
            }
        }
    }
}

/// Sub-state of an image under the build protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    /// Metadata registered without invoking the builder.
    Registered,
    /// The builder produced an artifact for this image.
    Built,
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered => write!(f, "registered"),
            Self::Built => write!(f, "built"),
        }
    }
}

/// Sub-state of an instance under the run protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    /// Metadata registered without starting the workload.
    Registered,
    /// The actuator reported the workload running.
    Running,
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered => write!(f, "registered"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Reference to a built image artifact, as reported by the actuator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageArtifactRef {
    /// Addressable artifact coordinate, e.g. `registry/name:tag`.
    pub uri: String,
    /// Content digest, when the builder reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Reference to a running workload, as reported by the actuator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningInstanceRef {
    /// Runtime handle, e.g. a container id.
    pub runtime_id: String,
}

/// A project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Store-assigned id.
    pub id: ProjectId,
    /// Globally unique name.
    pub name: String,
    /// Free-text author, if supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Set once at creation.
    pub creation_date: DateTime<Utc>,
}

/// A task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned id.
    pub id: TaskId,
    /// Name unique within the project.
    pub name: String,
    /// Owning project.
    pub project_id: ProjectId,
    /// Free-text author, if supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Set once at creation.
    pub creation_date: DateTime<Utc>,
}

/// A model record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Store-assigned id.
    pub id: ModelId,
    /// Name unique within the task.
    pub name: String,
    /// Owning task.
    pub task_id: TaskId,
    /// Registered artifacts: artifact name to blob key.
    #[serde(default)]
    pub artifacts: BTreeMap<String, String>,
    /// Free-text author, if supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Set once at creation.
    pub creation_date: DateTime<Utc>,
}

/// An environment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Store-assigned id.
    pub id: EnvironmentId,
    /// Globally unique name.
    pub name: String,
    /// Host descriptor, when the environment is concrete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<EnvironmentParams>,
    /// Free-text author, if supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Set once at creation.
    pub creation_date: DateTime<Utc>,
}

/// An image record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Store-assigned id.
    pub id: ImageId,
    /// Name unique within the task.
    pub name: String,
    /// Owning task, derived from the buildable's model at creation.
    pub task_id: TaskId,
    /// What the image was (or will be) built from.
    pub buildable: Buildable,
    /// Environment the image targets, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<EnvironmentId>,
    /// Environment-specific image descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<ImageParams>,
    /// Built artifact reference, absent for dry registrations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ImageArtifactRef>,
    /// Reconciled build sub-state.
    pub status: ImageStatus,
    /// Free-text author, if supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Set once at creation.
    pub creation_date: DateTime<Utc>,
}

/// An instance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Store-assigned id.
    pub id: InstanceId,
    /// Name unique within the image/environment pair.
    pub name: String,
    /// The image this instance runs.
    pub image_id: ImageId,
    /// Environment the instance runs in, if pinned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<EnvironmentId>,
    /// Environment-specific run descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<InstanceParams>,
    /// Runtime handle, absent for dry registrations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RunningInstanceRef>,
    /// Reconciled run sub-state.
    pub status: InstanceStatus,
    /// Free-text author, if supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Set once at creation.
    pub creation_date: DateTime<Utc>,
}

/// A pipeline record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Store-assigned id.
    pub id: PipelineId,
    /// Name unique within the task.
    pub name: String,
    /// Owning task.
    pub task_id: TaskId,
    /// Free-text author, if supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Set once at creation.
    pub creation_date: DateTime<Utc>,
}

/// Payload for creating or replacing a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    /// Globally unique name.
    pub name: String,
    /// Free-text author.
    pub author: Option<String>,
}

/// Payload for creating or replacing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Name unique within the project.
    pub name: String,
    /// Owning project.
    pub project_id: ProjectId,
    /// Free-text author.
    pub author: Option<String>,
}

/// Payload for creating or replacing a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDraft {
    /// Name unique within the task.
    pub name: String,
    /// Owning task.
    pub task_id: TaskId,
    /// Registered artifacts: artifact name to blob key.
    pub artifacts: BTreeMap<String, String>,
    /// Free-text author.
    pub author: Option<String>,
}

/// Payload for creating or replacing an environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentDraft {
    /// Globally unique name.
    pub name: String,
    /// Host descriptor.
    pub params: Option<EnvironmentParams>,
    /// Free-text author.
    pub author: Option<String>,
}

/// Payload for creating or replacing an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDraft {
    /// Name unique within the task.
    pub name: String,
    /// Owning task.
    pub task_id: TaskId,
    /// What the image is built from.
    pub buildable: Buildable,
    /// Environment the image targets.
    pub environment_id: Option<EnvironmentId>,
    /// Environment-specific image descriptor.
    pub params: Option<ImageParams>,
    /// Built artifact reference.
    pub artifact: Option<ImageArtifactRef>,
    /// Build sub-state.
    pub status: ImageStatus,
    /// Free-text author.
    pub author: Option<String>,
}

/// Payload for creating or replacing an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDraft {
    /// Name unique within the image/environment pair.
    pub name: String,
    /// The image this instance runs.
    pub image_id: ImageId,
    /// Environment the instance runs in.
    pub environment_id: Option<EnvironmentId>,
    /// Environment-specific run descriptor.
    pub params: Option<InstanceParams>,
    /// Runtime handle.
    pub runtime: Option<RunningInstanceRef>,
    /// Run sub-state.
    pub status: InstanceStatus,
    /// Free-text author.
    pub author: Option<String>,
}

/// Payload for creating or replacing a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDraft {
    /// Name unique within the task.
    pub name: String,
    /// Owning task.
    pub task_id: TaskId,
    /// Free-text author.
    pub author: Option<String>,
}

/// A draft of any kind, ready for the store to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityDraft {
    /// A project draft.
    Project(ProjectDraft),
    /// A task draft.
    Task(TaskDraft),
    /// A model draft.
    Model(ModelDraft),
    /// An environment draft.
    Environment(EnvironmentDraft),
    /// An image draft.
    Image(ImageDraft),
    /// An instance draft.
    Instance(InstanceDraft),
    /// A pipeline draft.
    Pipeline(PipelineDraft),
}

impl EntityDraft {
    /// Returns the kind this draft persists as.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Project(_) => EntityKind::Project,
            Self::Task(_) => EntityKind::Task,
            Self::Model(_) => EntityKind::Model,
            Self::Environment(_) => EntityKind::Environment,
            Self::Image(_) => EntityKind::Image,
            Self::Instance(_) => EntityKind::Instance,
            Self::Pipeline(_) => EntityKind::Pipeline,
        }
    }

    /// Returns the draft's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Project(d) => &d.name,
            Self::Task(d) => &d.name,
            Self::Model(d) => &d.name,
            Self::Environment(d) => &d.name,
            Self::Image(d) => &d.name,
            Self::Instance(d) => &d.name,
            Self::Pipeline(d) => &d.name,
        }
    }

    /// Returns the scope the draft's name must be unique within.
    #[must_use]
    pub fn scope(&self) -> NameScope {
        match self {
            Self::Project(_) | Self::Environment(_) => NameScope::Global,
            Self::Task(d) => NameScope::Project(d.project_id.as_u64()),
            Self::Model(d) => NameScope::Task(d.task_id.as_u64()),
            Self::Image(d) => NameScope::Task(d.task_id.as_u64()),
            Self::Pipeline(d) => NameScope::Task(d.task_id.as_u64()),
            Self::Instance(d) => NameScope::Deployment {
                image_id: d.image_id.as_u64(),
                environment_id: d.environment_id.map(|id| id.as_u64()),
            },
        }
    }

    /// Foreign keys that must resolve before the draft may be written.
    #[must_use]
    pub fn required_refs(&self) -> Vec<EntityRef> {
        match self {
            Self::Project(_) | Self::Environment(_) => Vec::new(),
            Self::Task(d) => vec![EntityRef::new(EntityKind::Project, d.project_id.as_u64())],
            Self::Model(d) => vec![EntityRef::new(EntityKind::Task, d.task_id.as_u64())],
            Self::Pipeline(d) => vec![EntityRef::new(EntityKind::Task, d.task_id.as_u64())],
            Self::Image(d) => {
                let mut refs = vec![
                    EntityRef::new(EntityKind::Model, d.buildable.model_id().as_u64()),
                    EntityRef::new(EntityKind::Task, d.task_id.as_u64()),
                ];
                if let Some(env) = d.environment_id {
                    refs.push(EntityRef::new(EntityKind::Environment, env.as_u64()));
                }
                refs
            }
            Self::Instance(d) => {
                let mut refs = vec![EntityRef::new(EntityKind::Image, d.image_id.as_u64())];
                if let Some(env) = d.environment_id {
                    refs.push(EntityRef::new(EntityKind::Environment, env.as_u64()));
                }
                refs
            }
        }
    }

    /// Materializes the draft into a persisted record.
    #[must_use]
    pub fn into_record(self, id: u64, creation_date: DateTime<Utc>) -> EntityRecord {
        match self {
            Self::Project(d) => EntityRecord::Project(Project {
                id: ProjectId::from_raw(id),
                name: d.name,
                author: d.author,
                creation_date,
            }),
            Self::Task(d) => EntityRecord::Task(Task {
                id: TaskId::from_raw(id),
                name: d.name,
                project_id: d.project_id,
                author: d.author,
                creation_date,
            }),
            Self::Model(d) => EntityRecord::Model(Model {
                id: ModelId::from_raw(id),
                name: d.name,
                task_id: d.task_id,
                artifacts: d.artifacts,
                author: d.author,
                creation_date,
            }),
            Self::Environment(d) => EntityRecord::Environment(Environment {
                id: EnvironmentId::from_raw(id),
                name: d.name,
                params: d.params,
                author: d.author,
                creation_date,
            }),
            Self::Image(d) => EntityRecord::Image(Image {
                id: ImageId::from_raw(id),
                name: d.name,
                task_id: d.task_id,
                buildable: d.buildable,
                environment_id: d.environment_id,
                params: d.params,
                artifact: d.artifact,
                status: d.status,
                author: d.author,
                creation_date,
            }),
            Self::Instance(d) => EntityRecord::Instance(Instance {
                id: InstanceId::from_raw(id),
                name: d.name,
                image_id: d.image_id,
                environment_id: d.environment_id,
                params: d.params,
                runtime: d.runtime,
                status: d.status,
                author: d.author,
                creation_date,
            }),
            Self::Pipeline(d) => EntityRecord::Pipeline(Pipeline {
                id: PipelineId::from_raw(id),
                name: d.name,
                task_id: d.task_id,
                author: d.author,
                creation_date,
            }),
        }
    }
}

/// A persisted record of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityRecord {
    /// A project record.
    Project(Project),
    /// A task record.
    Task(Task),
    /// A model record.
    Model(Model),
    /// An environment record.
    Environment(Environment),
    /// An image record.
    Image(Image),
    /// An instance record.
    Instance(Instance),
    /// A pipeline record.
    Pipeline(Pipeline),
}

impl EntityRecord {
    /// Returns the record's kind.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Project(_) => EntityKind::Project,
            Self::Task(_) => EntityKind::Task,
            Self::Model(_) => EntityKind::Model,
            Self::Environment(_) => EntityKind::Environment,
            Self::Image(_) => EntityKind::Image,
            Self::Instance(_) => EntityKind::Instance,
            Self::Pipeline(_) => EntityKind::Pipeline,
        }
    }

    /// Returns the raw store-assigned id.
    #[must_use]
    pub const fn raw_id(&self) -> u64 {
        match self {
            Self::Project(r) => r.id.as_u64(),
            Self::Task(r) => r.id.as_u64(),
            Self::Model(r) => r.id.as_u64(),
            Self::Environment(r) => r.id.as_u64(),
            Self::Image(r) => r.id.as_u64(),
            Self::Instance(r) => r.id.as_u64(),
            Self::Pipeline(r) => r.id.as_u64(),
        }
    }

    /// Returns a `(kind, id)` reference to this record.
    #[must_use]
    pub const fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.kind(), self.raw_id())
    }

    /// Returns the record's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Project(r) => &r.name,
            Self::Task(r) => &r.name,
            Self::Model(r) => &r.name,
            Self::Environment(r) => &r.name,
            Self::Image(r) => &r.name,
            Self::Instance(r) => &r.name,
            Self::Pipeline(r) => &r.name,
        }
    }

    /// Returns the record's creation date.
    #[must_use]
    pub const fn creation_date(&self) -> DateTime<Utc> {
        match self {
            Self::Project(r) => r.creation_date,
            Self::Task(r) => r.creation_date,
            Self::Model(r) => r.creation_date,
            Self::Environment(r) => r.creation_date,
            Self::Image(r) => r.creation_date,
            Self::Instance(r) => r.creation_date,
            Self::Pipeline(r) => r.creation_date,
        }
    }

    /// Returns the scope the record's name is unique within.
    #[must_use]
    pub fn scope(&self) -> NameScope {
        match self {
            Self::Project(_) | Self::Environment(_) => NameScope::Global,
            Self::Task(r) => NameScope::Project(r.project_id.as_u64()),
            Self::Model(r) => NameScope::Task(r.task_id.as_u64()),
            Self::Image(r) => NameScope::Task(r.task_id.as_u64()),
            Self::Pipeline(r) => NameScope::Task(r.task_id.as_u64()),
            Self::Instance(r) => NameScope::Deployment {
                image_id: r.image_id.as_u64(),
                environment_id: r.environment_id.map(|id| id.as_u64()),
            },
        }
    }

    /// Returns true if the record matches the filter.
    #[must_use]
    pub fn matches(&self, filter: &EntityFilter) -> bool {
        match filter {
            EntityFilter::All => true,
            EntityFilter::ProjectId(id) => {
                matches!(self, Self::Task(r) if r.project_id.as_u64() == *id)
            }
            EntityFilter::TaskId(id) => match self {
                Self::Model(r) => r.task_id.as_u64() == *id,
                Self::Image(r) => r.task_id.as_u64() == *id,
                Self::Pipeline(r) => r.task_id.as_u64() == *id,
                _ => false,
            },
            EntityFilter::ModelRef(id) => {
                matches!(self, Self::Image(r) if r.buildable.model_id().as_u64() == *id)
            }
            EntityFilter::EnvironmentId(id) => match self {
                Self::Image(r) => r.environment_id.map(|env| env.as_u64()) == Some(*id),
                Self::Instance(r) => r.environment_id.map(|env| env.as_u64()) == Some(*id),
                _ => false,
            },
            EntityFilter::ImageId(id) => {
                matches!(self, Self::Instance(r) if r.image_id.as_u64() == *id)
            }
            EntityFilter::Deployment {
                image_id,
                environment_id,
            } => match self {
                Self::Instance(r) => {
                    image_id.is_none_or(|id| r.image_id.as_u64() == id)
                        && environment_id
                            .is_none_or(|id| r.environment_id.map(|env| env.as_u64()) == Some(id))
                }
                _ => false,
            },
        }
    }

    /// Unwraps a project record.
    #[must_use]
    pub fn into_project(self) -> Option<Project> {
        match self {
            Self::Project(r) => Some(r),
            _ => None,
        }
    }

    /// Unwraps a task record.
    #[must_use]
    pub fn into_task(self) -> Option<Task> {
        match self {
            Self::Task(r) => Some(r),
            _ => None,
        }
    }

    /// Unwraps a model record.
    #[must_use]
    pub fn into_model(self) -> Option<Model> {
        match self {
            Self::Model(r) => Some(r),
            _ => None,
        }
    }

    /// Unwraps an environment record.
    #[must_use]
    pub fn into_environment(self) -> Option<Environment> {
        match self {
            Self::Environment(r) => Some(r),
            _ => None,
        }
    }

    /// Unwraps an image record.
    #[must_use]
    pub fn into_image(self) -> Option<Image> {
        match self {
            Self::Image(r) => Some(r),
            _ => None,
        }
    }

    /// Unwraps an instance record.
    #[must_use]
    pub fn into_instance(self) -> Option<Instance> {
        match self {
            Self::Instance(r) => Some(r),
            _ => None,
        }
    }

    /// Unwraps a pipeline record.
    #[must_use]
    pub fn into_pipeline(self) -> Option<Pipeline> {
        match self {
            Self::Pipeline(r) => Some(r),
            _ => None,
        }
    }

    /// Serializes the record for transport callers.
    pub fn to_value(&self) -> crate::error::Result<Value> {
        serde_json::to_value(self).map_err(|e| crate::error::Error::Internal {
            message: format!("record serialization failed: {e}"),
        })
    }
}
