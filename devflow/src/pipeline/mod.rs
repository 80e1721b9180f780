//! Pipeline building and execution.
//!
//! This module provides:
//! - A builder that validates the stage chain
//! - The sequential runner and its run summary
//! - The default six-stage lifecycle assembly

mod builder;
mod lifecycle;
#[cfg(test)]
mod pipeline_tests;
mod runner;

pub use builder::PipelineBuilder;
pub use lifecycle::{default_pipeline, lifecycle_builder, LIFECYCLE_PIPELINE};
pub use runner::{Pipeline, RunSummary};
