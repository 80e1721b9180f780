//! # Devflow
//!
//! A six-stage, language-model-driven software development lifecycle.
//!
//! A run walks a single shared context through problem acquisition,
//! clarification, solution planning, implementation, testing and
//! documentation. Each stage reads what earlier stages recorded, talks to
//! the user and the language model through injected ports, writes its
//! artifacts and names its successor.
//!
//! - **Typed hand-offs**: every stage output is a typed record stored once
//! - **Injected collaborators**: interaction, model, files, shell, version
//!   control and test verdicts are all traits
//! - **Event-driven observability**: the runner emits lifecycle events to a sink
//! - **Cooperative cancellation**: an interrupted run reports its last milestone
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use devflow::prelude::*;
//! use std::sync::Arc;
//!
//! let config = DevflowConfig::default();
//! let ports = StagePorts::new(
//!     Arc::new(ConsoleInteraction::new()),
//!     Arc::new(PlaceholderModel),
//!     Arc::new(LocalFileStore::new(&config.output_dir)),
//!     Arc::new(DisabledVersionControl),
//! );
//!
//! let pipeline = default_pipeline(&ports, &config)?;
//! let mut ctx = SharedContext::new();
//! let summary = pipeline.run(&mut ctx).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod ports;
pub mod stages;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{DevflowConfig, LlmConfig, LlmProvider};
    pub use crate::context::{
        ClarificationData, ComponentRecord, DocumentationData, ImplementationData,
        PlanningData, ProblemData, RunIdentity, SharedContext, StageRecord, TestingData,
    };
    pub use crate::core::{
        ArtifactKind, ArtifactRecord, Milestone, PipelineEvent, StageId, Transition,
    };
    pub use crate::errors::{
        ContractErrorInfo, DataConflictError, DevflowError, MissingOutputError,
        PipelineValidationError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{default_pipeline, Pipeline, PipelineBuilder, RunSummary};
    pub use crate::ports::{
        ConsoleInteraction, DisabledVersionControl, FileStore, GitVersionControl, Interaction,
        LanguageModel, LocalFileStore, PlaceholderModel, ShellRunner, StagePorts, SystemShell,
        TestOracle, VersionControl,
    };
    pub use crate::stages::{Stage, StageRunner};
}
