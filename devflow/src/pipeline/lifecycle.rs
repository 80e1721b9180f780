//! Assembly of the six-stage development lifecycle.

use super::{Pipeline, PipelineBuilder};
use crate::config::DevflowConfig;
use crate::errors::PipelineValidationError;
use crate::events::LoggingEventSink;
use crate::ports::StagePorts;
use crate::stages::{
    DocumentationStage, ImplementationStage, ProblemAcquisitionStage, ProblemClarificationStage,
    SolutionPlanningStage, TestingStage,
};
use std::sync::Arc;

/// Name given to the lifecycle pipeline.
pub const LIFECYCLE_PIPELINE: &str = "development_lifecycle";

/// Returns a builder holding the six lifecycle stages, in order.
///
/// # Errors
///
/// Only fails if the stage chain itself is malformed.
pub fn lifecycle_builder(
    ports: &StagePorts,
    config: &DevflowConfig,
) -> Result<PipelineBuilder, PipelineValidationError> {
    let system = config.system_prompt.clone();

    PipelineBuilder::new(LIFECYCLE_PIPELINE)
        .stage(Arc::new(ProblemAcquisitionStage::new(ports.clone())))?
        .stage(Arc::new(
            ProblemClarificationStage::new(ports.clone()).with_system_prompt(system.clone()),
        ))?
        .stage(Arc::new(
            SolutionPlanningStage::new(ports.clone()).with_system_prompt(system.clone()),
        ))?
        .stage(Arc::new(
            ImplementationStage::new(ports.clone(), config.phases.clone())
                .with_source_dir(&config.source_dir)
                .with_extension(&config.code_extension)
                .with_push_offer(config.git_enabled)
                .with_system_prompt(system.clone()),
        ))?
        .stage(Arc::new(
            TestingStage::new(ports.clone())
                .with_max_iterations(config.max_test_iterations)
                .with_test_dir(&config.test_dir)
                .with_system_prompt(system.clone()),
        ))?
        .stage(Arc::new(
            DocumentationStage::new(ports.clone())
                .with_push_offer(config.git_enabled)
                .with_system_prompt(system),
        ))
}

/// Builds the lifecycle pipeline with a logging event sink.
///
/// # Errors
///
/// Only fails if the stage chain itself is malformed.
pub fn default_pipeline(
    ports: &StagePorts,
    config: &DevflowConfig,
) -> Result<Pipeline, PipelineValidationError> {
    lifecycle_builder(ports, config)?
        .with_event_sink(Arc::new(LoggingEventSink::debug()))
        .build()
}
