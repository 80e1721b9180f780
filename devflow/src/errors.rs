//! Error types for the devflow pipeline.
//!
//! Every failure that can leave a stage is expressed as a [`DevflowError`].
//! Version-control failures are the one exception: they are absorbed inside
//! the version-control port and reported as a boolean.

use crate::core::{Milestone, StageId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for devflow operations.
#[derive(Debug, Error)]
pub enum DevflowError {
    /// The pipeline could not be assembled.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// A stage tried to record an output that already exists.
    #[error("{0}")]
    DataConflict(#[from] DataConflictError),

    /// A stage read an output that no earlier stage recorded.
    #[error("{0}")]
    MissingOutput(#[from] MissingOutputError),

    /// A stage nominated a successor the pipeline does not declare.
    #[error("Stage '{from}' nominated '{requested}' but the pipeline declares '{declared}' as its successor")]
    UnexpectedTransition {
        /// The stage that finished.
        from: StageId,
        /// The successor the stage asked for.
        requested: StageId,
        /// The successor declared when the pipeline was built.
        declared: StageId,
    },

    /// The interactive input provider failed.
    #[error("Interaction error: {0}")]
    Interaction(String),

    /// The language-model collaborator failed.
    #[error("Language model error: {0}")]
    LanguageModel(String),

    /// A file could not be written or read.
    #[error("File error at {}: {source}", path.display())]
    File {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The run was interrupted.
    #[error("Pipeline cancelled: {reason} (last milestone: {milestone})")]
    Cancelled {
        /// Why the run was cancelled.
        reason: String,
        /// The last milestone recorded before cancellation.
        milestone: Milestone,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error without a known path.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DevflowError {
    /// Creates a file error for the given path.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the error came from cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Metadata about a contract error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "CONTRACT-004-EMPTY").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised when pipeline validation fails.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<StageId>,
    /// Optional contract error info.
    pub error_info: Option<ContractErrorInfo>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
            error_info: None,
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<StageId>) -> Self {
        self.stages = stages;
        self
    }

    /// Sets the contract error info.
    #[must_use]
    pub fn with_error_info(mut self, info: ContractErrorInfo) -> Self {
        self.error_info = Some(info);
        self
    }

    /// Returns the contract code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.error_info.as_ref().map(|info| info.code.as_str())
    }
}

/// Error raised when a stage output slot is written twice.
#[derive(Debug, Clone, Error)]
#[error("Data conflict: output of stage '{stage}' is already recorded")]
pub struct DataConflictError {
    /// The stage whose output already exists.
    pub stage: StageId,
}

impl DataConflictError {
    /// Creates a new data conflict error.
    #[must_use]
    pub fn new(stage: StageId) -> Self {
        Self { stage }
    }
}

/// Error raised when a stage reads an output that has not been recorded.
#[derive(Debug, Clone, Error)]
#[error("Missing output: stage '{stage}' has not recorded its result yet")]
pub struct MissingOutputError {
    /// The stage expected to have produced the output.
    pub stage: StageId,
}

impl MissingOutputError {
    /// Creates a new missing output error.
    #[must_use]
    pub fn new(stage: StageId) -> Self {
        Self { stage }
    }
}

/// Provides default suggestions for pipeline contract error codes.
pub struct ContractSuggestions;

impl ContractSuggestions {
    /// Gets a suggestion for a given error code.
    #[must_use]
    pub fn get(code: &str) -> Option<&'static str> {
        match code {
            "CONTRACT-004-EMPTY" => Some("Add at least one stage to the pipeline before building."),
            "CONTRACT-004-DUPLICATE" => Some(
                "Each stage may appear once in the chain. Remove the repeated stage.",
            ),
            "CONTRACT-004-NAME" => Some("Give the pipeline a non-blank name."),
            _ => None,
        }
    }
}
