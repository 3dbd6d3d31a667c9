//! Typed validation of entity command payloads.
//!
//! Each entity kind has one schema used for both create and replace
//! commands. Fields are validated in declaration order: name and author
//! first, then nested descriptors, then scalar reference ids, so an
//! aggregated error lists descriptor violations before reference ones.

use serde_json::Value;

use crate::descriptor::{Buildable, EnvironmentParams, ImageParams, InstanceParams};
use crate::entity::{
    EnvironmentDraft, ModelDraft, PipelineDraft, ProjectDraft, TaskDraft,
};
use crate::error::Result;
use crate::id::{EnvironmentId, ImageId, ProjectId, TaskId};
use crate::validate::{
    FieldPath, Issues, MSG_NOT_STRING, MSG_REQUIRED, as_object, optional_object, optional_str,
    optional_u64, required_str, required_u64,
};

/// Whether a payload creates a new entity or replaces an existing one.
///
/// Replacement payloads must restate fields that creation derives
/// (an image's owning task is derived from its model on create).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    /// Payload for a create command.
    Create,
    /// Payload for a full-document update command.
    Update,
}

/// Validated image payload; the owning task is only present in update mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Image name.
    pub name: String,
    /// Free-text author.
    pub author: Option<String>,
    /// Environment-specific image descriptor.
    pub params: Option<ImageParams>,
    /// What to build the image from.
    pub buildable: Buildable,
    /// Owning task; required in update payloads.
    pub task_id: Option<TaskId>,
    /// Environment the image targets.
    pub environment_id: Option<EnvironmentId>,
}

/// Validated instance payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePayload {
    /// Instance name.
    pub name: String,
    /// Free-text author.
    pub author: Option<String>,
    /// Environment-specific run descriptor.
    pub params: Option<InstanceParams>,
    /// The image to run.
    pub image_id: ImageId,
    /// Environment to run in.
    pub environment_id: Option<EnvironmentId>,
}

/// Validates a project payload.
pub fn parse_project(value: &Value) -> Result<ProjectDraft> {
    let root = FieldPath::root();
    let mut issues = Issues::new();
    let draft = as_object(value, &root, &mut issues).and_then(|map| {
        let name = required_str(map, "name", &root, &mut issues);
        let author = optional_str(map, "author", &root, &mut issues);
        Some(ProjectDraft {
            name: name?,
            author,
        })
    });
    issues.finish(draft)
}

/// Validates a task payload.
pub fn parse_task(value: &Value) -> Result<TaskDraft> {
    let root = FieldPath::root();
    let mut issues = Issues::new();
    let draft = as_object(value, &root, &mut issues).and_then(|map| {
        let name = required_str(map, "name", &root, &mut issues);
        let author = optional_str(map, "author", &root, &mut issues);
        let project_id = required_u64(map, "project_id", &root, &mut issues);
        Some(TaskDraft {
            name: name?,
            project_id: ProjectId::from_raw(project_id?),
            author,
        })
    });
    issues.finish(draft)
}

/// Validates a model payload.
pub fn parse_model(value: &Value) -> Result<ModelDraft> {
    let root = FieldPath::root();
    let mut issues = Issues::new();
    let draft = as_object(value, &root, &mut issues).and_then(|map| {
        let name = required_str(map, "name", &root, &mut issues);
        let author = optional_str(map, "author", &root, &mut issues);
        let artifacts = parse_artifacts(map, &root, &mut issues);
        let task_id = required_u64(map, "task_id", &root, &mut issues);
        Some(ModelDraft {
            name: name?,
            task_id: TaskId::from_raw(task_id?),
            artifacts: artifacts?,
            author,
        })
    });
    issues.finish(draft)
}

fn parse_artifacts(
    map: &serde_json::Map<String, Value>,
    root: &FieldPath,
    issues: &mut Issues,
) -> Option<std::collections::BTreeMap<String, String>> {
    let field = root.child("artifacts");
    let Some(entries) = optional_object(map, "artifacts", root, issues) else {
        // Absent is an empty registry; a non-dict was already reported.
        return map
            .get("artifacts")
            .is_none_or(Value::is_null)
            .then(std::collections::BTreeMap::new);
    };
    let mut artifacts = std::collections::BTreeMap::new();
    let mut ok = true;
    for (name, key) in entries {
        match key.as_str() {
            Some(key) => {
                artifacts.insert(name.clone(), key.to_string());
            }
            None => {
                issues.push(&field.child(name), MSG_NOT_STRING);
                ok = false;
            }
        }
    }
    ok.then_some(artifacts)
}

/// Validates an environment payload.
pub fn parse_environment(value: &Value) -> Result<EnvironmentDraft> {
    let root = FieldPath::root();
    let mut issues = Issues::new();
    let draft = as_object(value, &root, &mut issues).and_then(|map| {
        let name = required_str(map, "name", &root, &mut issues);
        let author = optional_str(map, "author", &root, &mut issues);
        let params = match map.get("params") {
            None | Some(Value::Null) => Some(None),
            Some(value) => {
                EnvironmentParams::parse(value, &root.child("params"), &mut issues).map(Some)
            }
        };
        Some(EnvironmentDraft {
            name: name?,
            params: params?,
            author,
        })
    });
    issues.finish(draft)
}

/// Validates an image payload.
pub fn parse_image(value: &Value, mode: PayloadMode) -> Result<ImagePayload> {
    let root = FieldPath::root();
    let mut issues = Issues::new();
    let payload = as_object(value, &root, &mut issues).and_then(|map| {
        let name = required_str(map, "name", &root, &mut issues);
        let author = optional_str(map, "author", &root, &mut issues);
        let params = match map.get("params") {
            None | Some(Value::Null) => Some(None),
            Some(value) => ImageParams::parse(value, &root.child("params"), &mut issues).map(Some),
        };
        let buildable = match map.get("buildable") {
            None | Some(Value::Null) => {
                issues.push(&root.child("buildable"), MSG_REQUIRED);
                None
            }
            Some(value) => Buildable::parse(value, &root.child("buildable"), &mut issues),
        };
        let task_id = match mode {
            PayloadMode::Create => optional_u64(map, "task_id", &root, &mut issues),
            PayloadMode::Update => required_u64(map, "task_id", &root, &mut issues),
        };
        let environment_id = optional_u64(map, "environment_id", &root, &mut issues);
        Some(ImagePayload {
            name: name?,
            author,
            params: params?,
            buildable: buildable?,
            task_id: task_id.map(TaskId::from_raw),
            environment_id: environment_id.map(EnvironmentId::from_raw),
        })
    });
    issues.finish(payload)
}

/// Validates an instance payload.
pub fn parse_instance(value: &Value) -> Result<InstancePayload> {
    let root = FieldPath::root();
    let mut issues = Issues::new();
    let payload = as_object(value, &root, &mut issues).and_then(|map| {
        let name = required_str(map, "name", &root, &mut issues);
        let author = optional_str(map, "author", &root, &mut issues);
        let params = match map.get("params") {
            None | Some(Value::Null) => Some(None),
            Some(value) => {
                InstanceParams::parse(value, &root.child("params"), &mut issues).map(Some)
            }
        };
        let image_id = required_u64(map, "image_id", &root, &mut issues);
        let environment_id = optional_u64(map, "environment_id", &root, &mut issues);
        Some(InstancePayload {
            name: name?,
            author,
            params: params?,
            image_id: ImageId::from_raw(image_id?),
            environment_id: environment_id.map(EnvironmentId::from_raw),
        })
    });
    issues.finish(payload)
}

/// Validates a pipeline payload.
pub fn parse_pipeline(value: &Value) -> Result<PipelineDraft> {
    let root = FieldPath::root();
    let mut issues = Issues::new();
    let draft = as_object(value, &root, &mut issues).and_then(|map| {
        let name = required_str(map, "name", &root, &mut issues);
        let author = optional_str(map, "author", &root, &mut issues);
        let task_id = required_u64(map, "task_id", &root, &mut issues);
        Some(PipelineDraft {
            name: name?,
            task_id: TaskId::from_raw(task_id?),
            author,
        })
    });
    issues.finish(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn issues_of(err: Error) -> Vec<crate::validate::Issue> {
        match err {
            Error::Validation { issues } => issues,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn project_requires_name() {
        let err = parse_project(&json!({"not_name": "project_1"})).unwrap_err();
        let issues = issues_of(err);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].loc, ["name"]);
        assert_eq!(issues[0].message, MSG_REQUIRED);
    }

    #[test]
    fn task_rejects_bad_name_and_project_id_together() {
        let err = parse_task(&json!({"name": 1, "project_id": "not_id"})).unwrap_err();
        let issues = issues_of(err);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].loc, ["name"]);
        assert_eq!(issues[1].loc, ["project_id"]);
    }

    #[test]
    fn image_update_orders_descriptor_issues_before_reference_issues() {
        // Malformed params (missing discriminators), buildable without a
        // tag, and two non-integer references produce five ordered issues.
        let payload = json!({
            "name": "name",
            "task_id": "asdsadsd",
            "buildable": {"server_type": "rest", "model_id": 1},
            "params": {"name": "image", "tag": "latest", "registry": {}},
            "author": "author",
            "environment_id": "asdsadad"
        });
        let err = parse_image(&payload, PayloadMode::Update).unwrap_err();
        let issues = issues_of(err);
        assert_eq!(issues[0].loc, ["params", "type"]);
        assert_eq!(issues[1].loc, ["params", "registry", "type"]);
        assert_eq!(issues[2].loc, ["buildable", "type"]);
        assert_eq!(issues[3].loc, ["task_id"]);
        assert_eq!(issues[3].message, crate::validate::MSG_NOT_INTEGER);
        assert_eq!(issues[4].loc, ["environment_id"]);
        assert_eq!(issues[4].message, crate::validate::MSG_NOT_INTEGER);
        assert_eq!(issues.len(), 5);
    }

    #[test]
    fn image_create_derives_task_later() {
        let payload = json!({
            "name": "test_image",
            "buildable": {"type": "model", "server_type": "rest", "model_id": 1}
        });
        let parsed = parse_image(&payload, PayloadMode::Create).unwrap();
        assert!(parsed.task_id.is_none());
        assert_eq!(parsed.buildable.model_id().as_u64(), 1);
    }

    #[test]
    fn instance_update_reports_missing_image_after_params() {
        let payload = json!({
            "name": "new_instance",
            "params": {
                "type": "docker_container",
                "container_id": "abcdefgh123",
                "port_mapping": "not_dict",
                "params": "rofl"
            },
            "environment_id": "asdasd",
            "author": "author"
        });
        let err = parse_instance(&payload).unwrap_err();
        let issues = issues_of(err);
        assert_eq!(issues[0].loc, ["params", "name"]);
        assert_eq!(issues[1].loc, ["params", "port_mapping"]);
        assert_eq!(issues[2].loc, ["params", "params"]);
        assert_eq!(issues[3].loc, ["image_id"]);
        assert_eq!(issues[3].message, MSG_REQUIRED);
        assert_eq!(issues[4].loc, ["environment_id"]);
        assert_eq!(issues.len(), 5);
    }

    #[test]
    fn pipeline_update_requires_task_id() {
        let err = parse_pipeline(&json!({"name": "new_name", "author": "a"})).unwrap_err();
        let issues = issues_of(err);
        assert_eq!(issues[0].loc, ["task_id"]);
    }

    #[test]
    fn model_artifacts_map_to_blob_keys() {
        let payload = json!({
            "name": "test_model",
            "task_id": 1,
            "artifacts": {"model.bin": "blobs/models/1/model.bin"}
        });
        let draft = parse_model(&payload).unwrap();
        assert_eq!(
            draft.artifacts.get("model.bin").map(String::as_str),
            Some("blobs/models/1/model.bin")
        );
    }
}
