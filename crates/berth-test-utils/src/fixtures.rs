//! Pre-built fixtures for registry tests.
//!
//! Provides a fully wired registry over instrumented fakes plus payload
//! factories matching the shapes transport callers send.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::{Value, json};

use berth_core::{
    BlobStore, Environment, Image, MemoryBlobStore, Model, Project, Task,
};
use berth_registry::actuator::BuildOptions;
use berth_registry::adapters::{AdapterRegistry, ServerAdapter};
use berth_registry::service::Registry;

use crate::actuator::RecordingActuator;
use crate::store::TracingMemoryStore;

/// The adapter tag registered in every test registry.
pub const TEST_ADAPTER: &str = "rest";

/// A wired registry plus handles to its instrumented collaborators.
pub struct TestRegistry {
    /// The facade under test.
    pub registry: Registry,
    /// The tracing store behind the facade.
    pub store: Arc<TracingMemoryStore>,
    /// The blob store behind the artifact resolver.
    pub blobs: Arc<MemoryBlobStore>,
    /// The recording actuator behind the orchestrator.
    pub actuator: Arc<RecordingActuator>,
}

impl TestRegistry {
    /// Wires a registry over fresh fakes, with the `rest` adapter
    /// registered.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(TracingMemoryStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let actuator = Arc::new(RecordingActuator::new());
        let mut adapters = AdapterRegistry::new();
        adapters.register(ServerAdapter::new(TEST_ADAPTER, 9000));
        let registry = Registry::new(
            Arc::clone(&store) as Arc<dyn berth_core::EntityStore>,
            Arc::clone(&blobs) as Arc<dyn BlobStore>,
            Arc::clone(&actuator) as Arc<dyn berth_registry::Actuator>,
            adapters,
        );
        Self {
            registry,
            store,
            blobs,
            actuator,
        }
    }

    /// Creates a project.
    pub async fn seed_project(&self, name: &str) -> Project {
        self.registry
            .create_project(&project_payload(name))
            .await
            .expect("seed project")
    }

    /// Creates a task under a project.
    pub async fn seed_task(&self, name: &str, project_id: u64) -> Task {
        self.registry
            .create_task(&task_payload(name, project_id))
            .await
            .expect("seed task")
    }

    /// Creates a model under a task.
    pub async fn seed_model(&self, name: &str, task_id: u64) -> Model {
        self.registry
            .create_model(&model_payload(name, task_id))
            .await
            .expect("seed model")
    }

    /// Creates a model whose artifact bytes are already in blob storage.
    pub async fn seed_model_with_artifact(
        &self,
        name: &str,
        task_id: u64,
        artifact: &str,
        content: &str,
    ) -> Model {
        let key = format!("models/{task_id}/{artifact}");
        self.blobs
            .put(&key, Bytes::from(content.to_string()))
            .await
            .expect("seed blob");
        let mut artifacts = serde_json::Map::new();
        artifacts.insert(artifact.to_string(), Value::String(key));
        self.registry
            .create_model(&json!({
                "name": name,
                "task_id": task_id,
                "artifacts": artifacts,
            }))
            .await
            .expect("seed model with artifact")
    }

    /// Creates an environment with docker-host params.
    pub async fn seed_environment(&self, name: &str) -> Environment {
        self.registry
            .create_environment(&environment_payload(name, "localhost:2375"))
            .await
            .expect("seed environment")
    }

    /// Creates a built image for a model.
    pub async fn seed_built_image(&self, name: &str, model_id: u64) -> Image {
        self.registry
            .create_image(
                &image_payload(name, model_id),
                &BuildOptions {
                    force_overwrite: true,
                    skip_build: false,
                },
            )
            .await
            .expect("seed built image")
    }

    /// Creates the usual project → task → model chain.
    pub async fn seed_chain(&self) -> (Project, Task, Model) {
        let project = self.seed_project("project_1").await;
        let task = self.seed_task("task_1", project.id.as_u64()).await;
        let model = self.seed_model("test_model", task.id.as_u64()).await;
        (project, task, model)
    }
}

impl Default for TestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Payload for a project create/update.
#[must_use]
pub fn project_payload(name: &str) -> Value {
    json!({"name": name})
}

/// Payload for a task create/update.
#[must_use]
pub fn task_payload(name: &str, project_id: u64) -> Value {
    json!({"name": name, "project_id": project_id})
}

/// Payload for a model create/update.
#[must_use]
pub fn model_payload(name: &str, task_id: u64) -> Value {
    json!({"name": name, "task_id": task_id})
}

/// Payload for an environment create/update.
#[must_use]
pub fn environment_payload(name: &str, host: &str) -> Value {
    json!({
        "name": name,
        "params": {"type": "docker_host", "host": host},
    })
}

/// Payload for an image create.
#[must_use]
pub fn image_payload(name: &str, model_id: u64) -> Value {
    json!({
        "name": name,
        "buildable": {
            "type": "model",
            "model_id": model_id,
            "server_type": TEST_ADAPTER,
        },
    })
}

/// Payload for an instance create.
#[must_use]
pub fn instance_payload(name: &str, image_id: u64) -> Value {
    json!({"name": name, "image_id": image_id})
}
