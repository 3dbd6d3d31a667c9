//! The external build/run actuator contract.
//!
//! The actuator is the container builder and runtime (Docker or an
//! equivalent) that turns build specifications into image artifacts and
//! image artifacts into running workloads. The registry only declares
//! intent, invokes one of these capabilities, and reconciles the outcome
//! into persisted metadata; retry policy, timeouts, and cancellation all
//! belong to the actuator itself.

use async_trait::async_trait;

use berth_core::{EnvironmentParams, ImageArtifactRef, InstanceParams, RunningInstanceRef};

use crate::resolver::BuildSpec;

/// Failure reported by the actuator, carrying its diagnostic verbatim.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ActuatorError {
    /// The actuator's diagnostic.
    pub message: String,
}

impl ActuatorError {
    /// Creates an actuator error with the given diagnostic.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Options for a build invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Overwrite an existing artifact with the same coordinate.
    pub force_overwrite: bool,
    /// Register the image without invoking the builder (dry registration).
    pub skip_build: bool,
}

/// External build/run capabilities.
#[async_trait]
pub trait Actuator: Send + Sync + 'static {
    /// Builds an image artifact out of a build specification.
    async fn build(
        &self,
        spec: &BuildSpec,
        options: &BuildOptions,
    ) -> std::result::Result<ImageArtifactRef, ActuatorError>;

    /// Starts a workload from a built artifact.
    async fn run(
        &self,
        artifact: &ImageArtifactRef,
        environment: Option<&EnvironmentParams>,
        params: Option<&InstanceParams>,
    ) -> std::result::Result<RunningInstanceRef, ActuatorError>;

    /// Removes a built artifact.
    async fn teardown_image(
        &self,
        artifact: &ImageArtifactRef,
    ) -> std::result::Result<(), ActuatorError>;

    /// Stops a running workload.
    async fn stop_instance(
        &self,
        runtime: &RunningInstanceRef,
    ) -> std::result::Result<(), ActuatorError>;
}
