//! Stage trait and the six lifecycle stages.
//!
//! A stage runs in three steps. `prepare` reads what it needs from the
//! shared context, `execute` talks to the outside world, and `finalize`
//! records the result and names the next stage. Only `finalize` receives
//! the context mutably.

mod clarification;
mod documentation;
mod implementation;
mod planning;
mod problem;
pub mod prompts;
mod testing;

use crate::context::SharedContext;
use crate::core::{ArtifactKind, ArtifactRecord, StageId, Transition};
use crate::errors::DevflowError;
use crate::ports::FileStore;
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;
use tracing::debug;

pub use clarification::{render_requirements, ProblemClarificationStage};
pub use documentation::{installation_doc, DocumentationStage, DocumentationInput};
pub use implementation::{phase_filename, ImplementationInput, ImplementationOutput, ImplementationStage};
pub use planning::{render_plan, PlanningInput, SolutionPlanningStage};
pub use problem::ProblemAcquisitionStage;
pub use testing::{render_test_report, TestingInput, TestingOutput, TestingStage};

/// A unit of the lifecycle.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// What the stage reads from the context before executing.
    type Input: Send + Sync;
    /// What execution produces for `finalize`.
    type Output: Send;

    /// Returns the stage identifier.
    fn id(&self) -> StageId;

    /// Reads the stage input from the context.
    ///
    /// # Errors
    ///
    /// Returns [`DevflowError::MissingOutput`] when an earlier stage has not
    /// recorded what this stage needs.
    fn prepare(&self, ctx: &SharedContext) -> Result<Self::Input, DevflowError>;

    /// Does the stage's work. May block on user input or the language model.
    async fn execute(&self, input: &Self::Input) -> Result<Self::Output, DevflowError>;

    /// Records the output, writes artifacts and names the next stage.
    async fn finalize(
        &self,
        ctx: &mut SharedContext,
        input: Self::Input,
        output: Self::Output,
    ) -> Result<Transition, DevflowError>;
}

/// Object-safe view of a [`Stage`] so a pipeline can hold mixed stages.
#[async_trait]
pub trait StageRunner: Send + Sync + Debug {
    /// Returns the stage identifier.
    fn stage_id(&self) -> StageId;

    /// Runs prepare, execute and finalize in order.
    async fn run(&self, ctx: &mut SharedContext) -> Result<Transition, DevflowError>;
}

#[async_trait]
impl<S> StageRunner for S
where
    S: Stage,
{
    fn stage_id(&self) -> StageId {
        self.id()
    }

    async fn run(&self, ctx: &mut SharedContext) -> Result<Transition, DevflowError> {
        let input = self.prepare(ctx)?;
        debug!(stage = %self.id(), "Stage prepared");
        let output = self.execute(&input).await?;
        self.finalize(ctx, input, output).await
    }
}

/// Writes `content` through the file store and returns its artifact record.
pub(crate) async fn write_artifact(
    files: &dyn FileStore,
    path: &Path,
    kind: ArtifactKind,
    content: &str,
) -> Result<ArtifactRecord, DevflowError> {
    files.write(path, content).await?;
    Ok(ArtifactRecord::new(path, kind, content))
}
