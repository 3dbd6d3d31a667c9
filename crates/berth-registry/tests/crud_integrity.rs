//! CRUD and referential-integrity behavior of the facade.

use serde_json::json;

use berth_core::{EnvironmentId, InstanceId, PipelineId, ProjectId, TaskId};
use berth_registry::DeleteOptions;
use berth_test_utils::{TestRegistry, project_payload, task_payload};

#[tokio::test]
async fn project_create_and_roundtrip() {
    let harness = TestRegistry::new();
    let created = harness
        .registry
        .create_project(&json!({"name": "project_1", "author": "ebaklya"}))
        .await
        .unwrap();
    assert_eq!(created.id.as_u64(), 1);
    assert_eq!(created.name, "project_1");
    assert_eq!(created.author.as_deref(), Some("ebaklya"));

    let fetched = harness.registry.get_project(created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn projects_list_in_creation_order() {
    let harness = TestRegistry::new();
    harness.seed_project("project_1").await;
    harness.seed_project("project_2").await;

    let projects = harness.registry.list_projects().await.unwrap();
    let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["project_1", "project_2"]);
}

#[tokio::test]
async fn duplicate_project_name_is_rejected_and_first_kept() {
    let harness = TestRegistry::new();
    harness.seed_project("project_1").await;

    let err = harness
        .registry
        .create_project(&project_payload("project_1"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_NAME");
    assert_eq!(err.to_string(), "Project with name project_1 already exists");

    let kept = harness.registry.get_project(ProjectId::from_raw(1)).await.unwrap();
    assert_eq!(kept.name, "project_1");
    assert_eq!(harness.registry.list_projects().await.unwrap().len(), 1);
}

#[tokio::test]
async fn task_with_missing_project_is_not_persisted() {
    let harness = TestRegistry::new();
    let err = harness
        .registry
        .create_task(&task_payload("task_1", 1))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "REFERENCE_NOT_FOUND");
    assert_eq!(err.to_string(), "Project with id 1 does not exist");

    // Nothing was written: once the project exists, its task list is empty.
    harness.seed_project("project_1").await;
    let tasks = harness.registry.list_tasks(ProjectId::from_raw(1)).await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn listing_tasks_of_missing_project_is_not_found() {
    let harness = TestRegistry::new();
    let err = harness
        .registry
        .list_tasks(ProjectId::from_raw(1))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
    assert_eq!(err.to_string(), "Project with id 1 does not exist");
}

#[tokio::test]
async fn duplicate_task_name_is_scoped_to_its_project() {
    let harness = TestRegistry::new();
    harness.seed_project("p1").await;
    harness.seed_project("p2").await;
    harness.seed_task("task_1", 1).await;

    // Same name under another project is fine.
    harness.seed_task("task_1", 2).await;

    let err = harness
        .registry
        .create_task(&task_payload("task_1", 1))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_NAME");
}

#[tokio::test]
async fn update_replaces_the_document() {
    let harness = TestRegistry::new();
    harness.seed_project("project_1").await;

    harness
        .registry
        .update_project(ProjectId::from_raw(1), &project_payload("project_new"))
        .await
        .unwrap();

    let fetched = harness.registry.get_project(ProjectId::from_raw(1)).await.unwrap();
    assert_eq!(fetched.name, "project_new");
}

#[tokio::test]
async fn update_missing_entities_is_not_found_for_every_kind() {
    let harness = TestRegistry::new();
    harness.seed_project("p1").await;
    harness.seed_task("t1", 1).await;

    let err = harness
        .registry
        .update_project(ProjectId::from_raw(9), &project_payload("x"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Project with id 9 does not exist");

    let err = harness
        .registry
        .update_task(TaskId::from_raw(9), &task_payload("x", 1))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Task with id 9 does not exist");

    let err = harness
        .registry
        .update_pipeline(PipelineId::from_raw(9), &json!({"name": "x", "task_id": 1}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Pipeline with id 9 does not exist");

    let err = harness
        .registry
        .update_instance(InstanceId::from_raw(9), &json!({"name": "x", "image_id": 1}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Instance with id 9 does not exist");

    // No record of any kind appeared along the way.
    assert!(harness.store.ops().iter().all(|op| !matches!(
        op,
        berth_test_utils::StoreOp::Replace(..)
    )));
}

#[tokio::test]
async fn update_pointing_at_missing_parent_is_a_reference_error() {
    let harness = TestRegistry::new();
    harness.seed_project("p1").await;
    harness.seed_task("task_1", 1).await;

    let err = harness
        .registry
        .update_task(TaskId::from_raw(1), &task_payload("new_task", 2))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "REFERENCE_NOT_FOUND");
    assert_eq!(err.to_string(), "Project with id 2 does not exist");

    // The task is untouched.
    let task = harness.registry.get_task(TaskId::from_raw(1)).await.unwrap();
    assert_eq!(task.name, "task_1");
}

#[tokio::test]
async fn update_into_colliding_name_is_rejected() {
    let harness = TestRegistry::new();
    harness.seed_project("p1").await;
    harness.seed_task("task_1", 1).await;
    harness.seed_task("task_2", 1).await;

    let err = harness
        .registry
        .update_task(TaskId::from_raw(2), &task_payload("task_1", 1))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_NAME");
}

#[tokio::test]
async fn model_roundtrip_preserves_supplied_fields() {
    let harness = TestRegistry::new();
    harness.seed_project("p1").await;
    harness.seed_task("t1", 1).await;

    let payload = json!({
        "name": "test_model",
        "task_id": 1,
        "author": "ebaklya",
        "artifacts": {"model.bin": "models/1/model.bin"},
    });
    let created = harness.registry.create_model(&payload).await.unwrap();
    let fetched = harness.registry.get_model(created.id).await.unwrap();

    assert_eq!(fetched.name, "test_model");
    assert_eq!(fetched.task_id.as_u64(), 1);
    assert_eq!(fetched.author.as_deref(), Some("ebaklya"));
    assert_eq!(
        fetched.artifacts.get("model.bin").map(String::as_str),
        Some("models/1/model.bin")
    );
    assert_eq!(fetched.id.as_u64(), 1);
}

#[tokio::test]
async fn environment_roundtrip_and_global_uniqueness() {
    let harness = TestRegistry::new();
    let env = harness.seed_environment("test_env").await;
    assert!(env.params.is_some());

    let err = harness
        .registry
        .create_environment(&berth_test_utils::environment_payload(
            "test_env",
            "localhost:1234",
        ))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_NAME");

    let envs = harness.registry.list_environments().await.unwrap();
    assert_eq!(envs.len(), 1);
}

#[tokio::test]
async fn delete_missing_entity_is_not_found() {
    let harness = TestRegistry::new();
    let err = harness
        .registry
        .delete_environment(EnvironmentId::from_raw(15), DeleteOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Environment with id 15 does not exist");
}

#[tokio::test]
async fn deleted_entities_stop_resolving() {
    let harness = TestRegistry::new();
    harness.seed_project("p1").await;
    harness
        .registry
        .delete_project(ProjectId::from_raw(1), DeleteOptions::default())
        .await
        .unwrap();

    let err = harness
        .registry
        .get_project(ProjectId::from_raw(1))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn pipelines_scope_to_their_task() {
    let harness = TestRegistry::new();
    harness.seed_project("p1").await;
    harness.seed_task("t1", 1).await;

    let pipeline = harness
        .registry
        .create_pipeline(&json!({"name": "test_model.predict", "task_id": 1}))
        .await
        .unwrap();
    assert_eq!(pipeline.task_id.as_u64(), 1);

    let listed = harness
        .registry
        .list_pipelines(TaskId::from_raw(1))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "test_model.predict");

    // An existing but empty task lists no pipelines, which is distinct
    // from listing against a missing task.
    harness.seed_task("t2", 1).await;
    let empty = harness
        .registry
        .list_pipelines(TaskId::from_raw(2))
        .await
        .unwrap();
    assert!(empty.is_empty());

    let err = harness
        .registry
        .list_pipelines(TaskId::from_raw(9))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Task with id 9 does not exist");
}
