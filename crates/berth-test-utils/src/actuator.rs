//! A recording, failure-injectable actuator.

use std::sync::Mutex;

use async_trait::async_trait;

use berth_core::{EnvironmentParams, ImageArtifactRef, InstanceParams, RunningInstanceRef};
use berth_registry::actuator::{Actuator, ActuatorError, BuildOptions};
use berth_registry::resolver::BuildSpec;

#[derive(Debug, Default)]
struct State {
    build_seq: u64,
    run_seq: u64,
    builds: Vec<String>,
    runs: Vec<String>,
    torn_down: Vec<String>,
    stopped: Vec<String>,
    build_failure: Option<String>,
    run_failure: Option<String>,
    teardown_failure: Option<String>,
}

/// Actuator fake that records every call and can be told to fail.
///
/// Successful builds produce deterministic artifact URIs
/// (`berth.local/<image>:build-<n>`) and runs produce deterministic
/// container ids (`container-<n>`), so tests can assert on exact values.
#[derive(Debug, Default)]
pub struct RecordingActuator {
    state: Mutex<State>,
}

impl RecordingActuator {
    /// Creates a new actuator with no scripted failures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent build fail with the given diagnostic.
    pub fn refuse_builds(&self, diagnostic: &str) {
        self.state.lock().expect("actuator lock").build_failure = Some(diagnostic.to_string());
    }

    /// Makes every subsequent run fail with the given diagnostic.
    pub fn refuse_runs(&self, diagnostic: &str) {
        self.state.lock().expect("actuator lock").run_failure = Some(diagnostic.to_string());
    }

    /// Makes every subsequent teardown or stop fail with the diagnostic.
    pub fn refuse_teardowns(&self, diagnostic: &str) {
        self.state.lock().expect("actuator lock").teardown_failure = Some(diagnostic.to_string());
    }

    /// Image names the builder was invoked for, in order.
    #[must_use]
    pub fn builds(&self) -> Vec<String> {
        self.state.lock().expect("actuator lock").builds.clone()
    }

    /// Artifact URIs the runtime was invoked for, in order.
    #[must_use]
    pub fn runs(&self) -> Vec<String> {
        self.state.lock().expect("actuator lock").runs.clone()
    }

    /// Artifact URIs torn down, in order.
    #[must_use]
    pub fn torn_down(&self) -> Vec<String> {
        self.state.lock().expect("actuator lock").torn_down.clone()
    }

    /// Runtime ids stopped, in order.
    #[must_use]
    pub fn stopped(&self) -> Vec<String> {
        self.state.lock().expect("actuator lock").stopped.clone()
    }

    /// Number of build invocations so far.
    #[must_use]
    pub fn build_count(&self) -> usize {
        self.state.lock().expect("actuator lock").builds.len()
    }

    /// Number of run invocations so far.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.state.lock().expect("actuator lock").runs.len()
    }
}

#[async_trait]
impl Actuator for RecordingActuator {
    async fn build(
        &self,
        spec: &BuildSpec,
        _options: &BuildOptions,
    ) -> Result<ImageArtifactRef, ActuatorError> {
        let mut state = self.state.lock().expect("actuator lock");
        state.builds.push(spec.image_name.clone());
        if let Some(diagnostic) = &state.build_failure {
            return Err(ActuatorError::new(diagnostic.clone()));
        }
        state.build_seq += 1;
        Ok(ImageArtifactRef {
            uri: format!("berth.local/{}:build-{}", spec.image_name, state.build_seq),
            digest: None,
        })
    }

    async fn run(
        &self,
        artifact: &ImageArtifactRef,
        _environment: Option<&EnvironmentParams>,
        _params: Option<&InstanceParams>,
    ) -> Result<RunningInstanceRef, ActuatorError> {
        let mut state = self.state.lock().expect("actuator lock");
        state.runs.push(artifact.uri.clone());
        if let Some(diagnostic) = &state.run_failure {
            return Err(ActuatorError::new(diagnostic.clone()));
        }
        state.run_seq += 1;
        Ok(RunningInstanceRef {
            runtime_id: format!("container-{}", state.run_seq),
        })
    }

    async fn teardown_image(&self, artifact: &ImageArtifactRef) -> Result<(), ActuatorError> {
        let mut state = self.state.lock().expect("actuator lock");
        if let Some(diagnostic) = &state.teardown_failure {
            return Err(ActuatorError::new(diagnostic.clone()));
        }
        state.torn_down.push(artifact.uri.clone());
        Ok(())
    }

    async fn stop_instance(&self, runtime: &RunningInstanceRef) -> Result<(), ActuatorError> {
        let mut state = self.state.lock().expect("actuator lock");
        if let Some(diagnostic) = &state.teardown_failure {
            return Err(ActuatorError::new(diagnostic.clone()));
        }
        state.stopped.push(runtime.runtime_id.clone());
        Ok(())
    }
}
