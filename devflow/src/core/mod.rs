//! Core domain model types for devflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - Stage identifiers, transitions and milestones
//! - Pipeline events
//! - Artifact records for written files

mod artifact;
mod event;
mod status;

pub use artifact::{content_digest, ArtifactKind, ArtifactRecord};
pub use event::PipelineEvent;
pub use status::{Milestone, StageId, Transition};
