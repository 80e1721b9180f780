//! Ports - external collaborators injected into the stages.
//!
//! Each concern gets its own narrow trait so a stage only depends on what it
//! calls, and tests can substitute deterministic fakes (see
//! [`crate::testing`]). All calls are awaited one at a time and carry no
//! timeout: an unresponsive collaborator stalls the run.

mod console;
mod files;
mod model;
mod oracle;
mod shell;
mod vcs;

use crate::context::ComponentRecord;
use crate::errors::DevflowError;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub use console::ConsoleInteraction;
pub use files::LocalFileStore;
#[cfg(feature = "http")]
pub use model::OpenAiCompatibleModel;
pub use model::PlaceholderModel;
pub use oracle::AssumePassOracle;
pub use shell::{CommandOutput, SystemShell};
pub use vcs::{shell_quote, DisabledVersionControl, GitVersionControl};

/// Interactive input provider.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// Shows `text` and returns one line of free-form input.
    async fn prompt(&self, text: &str) -> Result<String, DevflowError>;

    /// Shows `text` and returns whether the user answered yes.
    async fn confirm(&self, text: &str) -> Result<bool, DevflowError>;

    /// Shows informational output that needs no answer.
    fn display(&self, text: &str);
}

/// Language-model collaborator.
///
/// Whatever the model returns is treated as final text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Completes `prompt`, optionally under a system prompt.
    async fn complete(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String, DevflowError>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "language-model"
    }
}

/// File persistence collaborator.
///
/// Paths are relative to the store's root. Writes create intermediate
/// directories and replace existing content.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Writes `content` to `path`.
    async fn write(&self, path: &Path, content: &str) -> Result<(), DevflowError>;

    /// Reads the content at `path`.
    async fn read(&self, path: &Path) -> Result<String, DevflowError>;
}

/// Shell execution collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShellRunner: Send + Sync {
    /// Runs `command` and returns its success flag and combined output.
    async fn run(&self, command: &str) -> CommandOutput;
}

/// Version-control collaborator.
///
/// Implementations never fail the run: problems are logged and reported
/// as `false`, and a missing repository is a successful skip.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Commits everything and pushes with `message`.
    async fn commit_and_push(&self, message: &str) -> bool;
}

/// Decides whether the generated tests for a component pass.
#[async_trait]
pub trait TestOracle: Send + Sync {
    /// Evaluates `test_code` for `component` in the given 1-based iteration.
    async fn evaluate(&self, component: &ComponentRecord, test_code: &str, iteration: u32) -> bool;
}

/// The collaborators handed to every stage.
#[derive(Clone)]
pub struct StagePorts {
    /// User prompts and confirmations.
    pub interaction: Arc<dyn Interaction>,
    /// Text generation.
    pub model: Arc<dyn LanguageModel>,
    /// Artifact persistence.
    pub files: Arc<dyn FileStore>,
    /// Commit and push.
    pub vcs: Arc<dyn VersionControl>,
    /// Test verdicts.
    pub oracle: Arc<dyn TestOracle>,
}

impl std::fmt::Debug for StagePorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagePorts")
            .field("model", &self.model.name())
            .finish_non_exhaustive()
    }
}

impl StagePorts {
    /// Creates a port bundle. The oracle defaults to [`AssumePassOracle`].
    #[must_use]
    pub fn new(
        interaction: Arc<dyn Interaction>,
        model: Arc<dyn LanguageModel>,
        files: Arc<dyn FileStore>,
        vcs: Arc<dyn VersionControl>,
    ) -> Self {
        Self {
            interaction,
            model,
            files,
            vcs,
            oracle: Arc::new(AssumePassOracle),
        }
    }

    /// Replaces the test oracle.
    #[must_use]
    pub fn with_oracle(mut self, oracle: Arc<dyn TestOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Replaces the version-control collaborator.
    #[must_use]
    pub fn with_vcs(mut self, vcs: Arc<dyn VersionControl>) -> Self {
        self.vcs = vcs;
        self
    }
}
