//! Problem acquisition: the first stage.

use super::Stage;
use crate::context::{ProblemData, SharedContext, StageRecord};
use crate::core::{StageId, Transition};
use crate::errors::DevflowError;
use crate::ports::StagePorts;
use crate::utils::preview;
use async_trait::async_trait;
use tracing::info;

/// Asks the user for the problem, extra context and preferred technology.
#[derive(Debug, Clone)]
pub struct ProblemAcquisitionStage {
    ports: StagePorts,
}

impl ProblemAcquisitionStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(ports: StagePorts) -> Self {
        Self { ports }
    }
}

#[async_trait]
impl Stage for ProblemAcquisitionStage {
    type Input = ();
    type Output = ProblemData;

    fn id(&self) -> StageId {
        StageId::ProblemAcquisition
    }

    fn prepare(&self, _ctx: &SharedContext) -> Result<Self::Input, DevflowError> {
        Ok(())
    }

    async fn execute(&self, _input: &Self::Input) -> Result<Self::Output, DevflowError> {
        let io = &self.ports.interaction;
        io.display("Welcome to the AI Development Assistant!");
        io.display(
            "I'll help you build a complete software solution from problem to implementation.",
        );

        let problem = io
            .prompt("Please describe the problem you want to solve or the software you want to build:")
            .await?;
        let context = io
            .prompt("Any additional context, requirements, or constraints? (Optional, press Enter to skip):")
            .await?;
        let tech = io
            .prompt("Preferred technology stack or programming language? (Optional, press Enter for auto-selection):")
            .await?;

        Ok(ProblemData::new(problem, context, tech))
    }

    async fn finalize(
        &self,
        ctx: &mut SharedContext,
        _input: Self::Input,
        output: Self::Output,
    ) -> Result<Transition, DevflowError> {
        info!(problem = %preview(&output.initial_problem, 100), "Problem acquired");
        ctx.record(StageRecord::Problem(output))?;
        Ok(self.id().lifecycle_transition())
    }
}
