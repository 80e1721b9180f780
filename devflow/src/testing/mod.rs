//! Testing utilities for devflow pipelines.
//!
//! This module provides:
//! - Deterministic fakes for every port
//! - Stub stages for exercising the runner
//! - Assertions over runs and written files

mod assertions;
mod fakes;
mod mocks;

pub use assertions::{assert_artifacts_written, assert_milestone, assert_stage_order};
pub use fakes::{
    fake_ports, Fakes, InMemoryFileStore, RecordingModel, RecordingVersionControl,
    ScriptedInteraction, ScriptedOracle, ScriptedShell,
};
pub use mocks::{BlockingStage, FailingStage, RecordingStage};
