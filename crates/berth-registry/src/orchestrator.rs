//! Build/run orchestration.
//!
//! Both operations follow the same declare → invoke → reconcile protocol:
//! the caller validates and resolves first (declare), the orchestrator
//! invokes the external actuator (invoke), and only a successful outcome
//! is persisted by the caller (reconcile). A failure maps to a typed
//! `Build`/`Run` error carrying the actuator's diagnostic, and nothing is
//! persisted.
//!
//! The orchestrator itself holds no state; it exists so actuator failures
//! are translated in exactly one place.

use std::sync::Arc;

use tracing::Instrument;

use berth_core::observability::actuator_span;
use berth_core::{EnvironmentParams, ImageArtifactRef, InstanceParams, RunningInstanceRef};

use crate::actuator::{Actuator, BuildOptions};
use crate::error::{Error, Result};
use crate::resolver::BuildSpec;

/// Drives the external actuator and translates its outcomes.
#[derive(Clone)]
pub struct Orchestrator {
    actuator: Arc<dyn Actuator>,
}

impl Orchestrator {
    /// Creates an orchestrator over the given actuator.
    #[must_use]
    pub fn new(actuator: Arc<dyn Actuator>) -> Self {
        Self { actuator }
    }

    /// Builds an image artifact, or skips the build entirely.
    ///
    /// Returns `None` for a dry registration (`skip_build`), `Some` with
    /// the artifact reference when the builder succeeded.
    pub async fn build(
        &self,
        spec: &BuildSpec,
        options: &BuildOptions,
    ) -> Result<Option<ImageArtifactRef>> {
        if options.skip_build {
            tracing::debug!(image = %spec.image_name, "registering image without build");
            return Ok(None);
        }
        let outcome = self
            .actuator
            .build(spec, options)
            .instrument(actuator_span("build", &spec.image_name))
            .await;
        match outcome {
            Ok(artifact) => {
                tracing::info!(image = %spec.image_name, uri = %artifact.uri, "image built");
                Ok(Some(artifact))
            }
            Err(err) => {
                tracing::warn!(image = %spec.image_name, error = %err, "build failed");
                Err(Error::build(err.message))
            }
        }
    }

    /// Starts a workload from a built artifact.
    pub async fn launch(
        &self,
        artifact: &ImageArtifactRef,
        environment: Option<&EnvironmentParams>,
        params: Option<&InstanceParams>,
    ) -> Result<RunningInstanceRef> {
        let outcome = self
            .actuator
            .run(artifact, environment, params)
            .instrument(actuator_span("run", &artifact.uri))
            .await;
        match outcome {
            Ok(runtime) => {
                tracing::info!(uri = %artifact.uri, runtime = %runtime.runtime_id, "instance running");
                Ok(runtime)
            }
            Err(err) => {
                tracing::warn!(uri = %artifact.uri, error = %err, "run failed");
                Err(Error::run(err.message))
            }
        }
    }

    /// Removes a built artifact from the actuator.
    pub async fn teardown_image(&self, artifact: &ImageArtifactRef) -> Result<()> {
        self.actuator
            .teardown_image(artifact)
            .instrument(actuator_span("teardown_image", &artifact.uri))
            .await
            .map_err(|err| Error::build(err.message))
    }

    /// Stops a running workload on the actuator.
    pub async fn stop_instance(&self, runtime: &RunningInstanceRef) -> Result<()> {
        self.actuator
            .stop_instance(runtime)
            .instrument(actuator_span("stop_instance", &runtime.runtime_id))
            .await
            .map_err(|err| Error::run(err.message))
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator").finish_non_exhaustive()
    }
}
