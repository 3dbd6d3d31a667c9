//! Build and run orchestration through the facade.

use bytes::Bytes;
use serde_json::json;

use berth_core::{EntityKind, EntityStore, ImageStatus, InstanceStatus, ModelId, TaskId};
use berth_registry::BuildOptions;
use berth_test_utils::{TestRegistry, image_payload, instance_payload};

const FORCE: BuildOptions = BuildOptions {
    force_overwrite: true,
    skip_build: false,
};

const DRY: BuildOptions = BuildOptions {
    force_overwrite: false,
    skip_build: true,
};

#[tokio::test]
async fn image_build_persists_a_built_image() {
    let harness = TestRegistry::new();
    let (_, _, model) = harness.seed_chain().await;

    let image = harness
        .registry
        .create_image(&image_payload("test_image", model.id.as_u64()), &FORCE)
        .await
        .unwrap();

    assert_eq!(image.status, ImageStatus::Built);
    assert_eq!(image.task_id.as_u64(), 1, "task derived from the model");
    let artifact = image.artifact.expect("built image carries an artifact");
    assert_eq!(artifact.uri, "berth.local/test_image:build-1");
    assert_eq!(harness.actuator.builds(), ["test_image"]);
}

#[tokio::test]
async fn image_with_missing_model_is_rejected_without_building() {
    let harness = TestRegistry::new();
    harness.seed_chain().await;

    let err = harness
        .registry
        .create_image(&image_payload("test_image", 999), &FORCE)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "REFERENCE_NOT_FOUND");
    assert_eq!(err.to_string(), "Model with id 999 does not exist");

    assert_eq!(harness.actuator.build_count(), 0);
    let images = harness.registry.list_images(TaskId::from_raw(1)).await.unwrap();
    assert!(images.is_empty(), "image count unchanged");
}

#[tokio::test]
async fn build_failure_persists_nothing_and_carries_the_diagnostic() {
    let harness = TestRegistry::new();
    let (_, _, model) = harness.seed_chain().await;
    harness.actuator.refuse_builds("no space left on device");

    let err = harness
        .registry
        .create_image(&image_payload("test_image", model.id.as_u64()), &FORCE)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "BUILD_FAILED");
    assert!(err.to_string().contains("no space left on device"));

    let images = harness.registry.list_images(TaskId::from_raw(1)).await.unwrap();
    assert!(images.is_empty());
}

#[tokio::test]
async fn skip_build_registers_without_invoking_the_builder() {
    let harness = TestRegistry::new();
    let (_, _, model) = harness.seed_chain().await;

    let image = harness
        .registry
        .create_image(&image_payload("dry_image", model.id.as_u64()), &DRY)
        .await
        .unwrap();

    assert_eq!(image.status, ImageStatus::Registered);
    assert!(image.artifact.is_none());
    assert_eq!(harness.actuator.build_count(), 0);
}

#[tokio::test]
async fn duplicate_image_name_is_rejected_before_the_builder_runs() {
    let harness = TestRegistry::new();
    let (_, _, model) = harness.seed_chain().await;
    harness.seed_built_image("test_image", model.id.as_u64()).await;

    let err = harness
        .registry
        .create_image(&image_payload("test_image", model.id.as_u64()), &FORCE)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_NAME");

    // Exactly one build: the seeded one.
    assert_eq!(harness.actuator.build_count(), 1);
}

#[tokio::test]
async fn unknown_server_type_fails_resolution() {
    let harness = TestRegistry::new();
    let (_, _, model) = harness.seed_chain().await;

    let err = harness
        .registry
        .create_image(
            &json!({
                "name": "test_image",
                "buildable": {
                    "type": "model",
                    "model_id": model.id.as_u64(),
                    "server_type": "telnet",
                },
            }),
            &FORCE,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION");
    assert_eq!(harness.actuator.build_count(), 0);
}

#[tokio::test]
async fn run_persists_a_running_instance() {
    let harness = TestRegistry::new();
    let (_, _, model) = harness.seed_chain().await;
    let image = harness.seed_built_image("test_image", model.id.as_u64()).await;

    let instance = harness
        .registry
        .create_instance(&instance_payload("run_1", image.id.as_u64()), true)
        .await
        .unwrap();

    assert_eq!(instance.status, InstanceStatus::Running);
    assert_eq!(
        instance.runtime.expect("running instance has a handle").runtime_id,
        "container-1"
    );
    assert_eq!(harness.actuator.run_count(), 1);
}

#[tokio::test]
async fn dry_registration_keeps_declared_params_and_skips_the_actuator() {
    let harness = TestRegistry::new();
    let (_, _, model) = harness.seed_chain().await;
    let image = harness.seed_built_image("test_image", model.id.as_u64()).await;

    let payload = json!({
        "name": "new_instance",
        "image_id": image.id.as_u64(),
        "params": {
            "type": "docker_container",
            "name": "container",
            "port_mapping": {"1488": 1488},
        },
    });
    let instance = harness
        .registry
        .create_instance(&payload, false)
        .await
        .unwrap();

    assert_eq!(instance.status, InstanceStatus::Registered);
    assert!(instance.runtime.is_none());
    assert_eq!(harness.actuator.run_count(), 0);

    // A later fetch returns the declared params unchanged.
    let fetched = harness.registry.get_instance(instance.id).await.unwrap();
    assert_eq!(fetched.params, instance.params);
    assert_eq!(fetched.name, "new_instance");
}

#[tokio::test]
async fn run_failure_persists_nothing() {
    let harness = TestRegistry::new();
    let (_, _, model) = harness.seed_chain().await;
    let image = harness.seed_built_image("test_image", model.id.as_u64()).await;
    harness.actuator.refuse_runs("port already allocated");

    let err = harness
        .registry
        .create_instance(&instance_payload("run_1", image.id.as_u64()), true)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "RUN_FAILED");
    assert!(err.to_string().contains("port already allocated"));

    assert!(!harness.store.exists(EntityKind::Instance, 1).await.unwrap());
}

#[tokio::test]
async fn running_an_unbuilt_image_is_a_run_error() {
    let harness = TestRegistry::new();
    let (_, _, model) = harness.seed_chain().await;
    let image = harness
        .registry
        .create_image(&image_payload("dry_image", model.id.as_u64()), &DRY)
        .await
        .unwrap();

    let err = harness
        .registry
        .create_instance(&instance_payload("run_1", image.id.as_u64()), true)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "RUN_FAILED");
    assert_eq!(harness.actuator.run_count(), 0);
}

#[tokio::test]
async fn instance_against_missing_image_is_a_reference_error() {
    let harness = TestRegistry::new();
    harness.seed_chain().await;

    let err = harness
        .registry
        .create_instance(&instance_payload("run_1", 42), false)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "REFERENCE_NOT_FOUND");
    assert_eq!(err.to_string(), "Image with id 42 does not exist");
}

#[tokio::test]
async fn run_passes_environment_params_through() {
    let harness = TestRegistry::new();
    let (_, _, model) = harness.seed_chain().await;
    let image = harness.seed_built_image("test_image", model.id.as_u64()).await;
    harness.seed_environment("test_env").await;

    let instance = harness
        .registry
        .create_instance(
            &json!({
                "name": "run_1",
                "image_id": image.id.as_u64(),
                "environment_id": 1,
            }),
            true,
        )
        .await
        .unwrap();

    assert_eq!(instance.environment_id.map(|id| id.as_u64()), Some(1));
    assert_eq!(harness.actuator.runs(), [image.artifact.unwrap().uri]);
}

#[tokio::test]
async fn artifact_streaming_roundtrips_bytes() {
    let harness = TestRegistry::new();
    harness.seed_project("p1").await;
    harness.seed_task("t1", 1).await;
    harness
        .seed_model_with_artifact("test_model", 1, "model.bin", "weights")
        .await;

    let bytes = harness
        .registry
        .open_artifact(ModelId::from_raw(1), "model.bin")
        .await
        .unwrap();
    assert_eq!(bytes, Bytes::from("weights"));
}

#[tokio::test]
async fn artifact_errors_do_not_reveal_which_half_is_missing() {
    let harness = TestRegistry::new();
    harness.seed_project("p1").await;
    harness.seed_task("t1", 1).await;
    harness
        .seed_model_with_artifact("test_model", 1, "model.bin", "weights")
        .await;

    let missing_model = harness
        .registry
        .open_artifact(ModelId::from_raw(100), "model.bin")
        .await
        .unwrap_err();
    let missing_artifact = harness
        .registry
        .open_artifact(ModelId::from_raw(1), "rofl.mao")
        .await
        .unwrap_err();

    assert_eq!(missing_model.code(), "NOT_FOUND");
    assert_eq!(missing_artifact.code(), "NOT_FOUND");
}
