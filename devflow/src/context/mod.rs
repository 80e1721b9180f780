//! Context management for pipeline execution.
//!
//! This module provides:
//! - The append-only shared context threaded through the stages
//! - Typed data contracts produced by each stage
//! - The run identity

mod identity;
mod records;
mod shared;

pub use identity::RunIdentity;
pub use records::{
    ClarificationData, ComponentRecord, DocFile, DocumentationData, ImplementationData,
    PlanningData, ProblemData, StageRecord, TestResultRecord, TestingData,
};
pub use shared::SharedContext;
