//! # berth-test-utils
//!
//! Shared test support for Berth crates: a recording, failure-injectable
//! actuator, a mutation-tracing entity store, and pre-wired registry
//! fixtures with payload factories.
//!
//! Not published; test code only.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod actuator;
pub mod fixtures;
pub mod store;

pub use actuator::RecordingActuator;
pub use fixtures::{
    TEST_ADAPTER, TestRegistry, environment_payload, image_payload, instance_payload,
    model_payload, project_payload, task_payload,
};
pub use store::{StoreOp, TracingMemoryStore};
