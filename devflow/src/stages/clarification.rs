//! Problem clarification: turns the raw problem into a requirements document.

use super::{prompts, write_artifact, Stage};
use crate::context::{ClarificationData, ProblemData, SharedContext, StageRecord};
use crate::core::{ArtifactKind, StageId, Transition};
use crate::errors::DevflowError;
use crate::ports::StagePorts;
use crate::utils::display_timestamp;
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// File the requirements document is written to.
pub const REQUIREMENTS_FILE: &str = "user_requirements.md";

/// Asks the model for clarifying questions, collects the user's answers and
/// asks the model for a requirements document.
#[derive(Debug, Clone)]
pub struct ProblemClarificationStage {
    ports: StagePorts,
    system_prompt: Option<String>,
}

impl ProblemClarificationStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(ports: StagePorts) -> Self {
        Self {
            ports,
            system_prompt: None,
        }
    }

    /// Sets the system prompt passed with every model call.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }
}

#[async_trait]
impl Stage for ProblemClarificationStage {
    type Input = ProblemData;
    type Output = ClarificationData;

    fn id(&self) -> StageId {
        StageId::ProblemClarification
    }

    fn prepare(&self, ctx: &SharedContext) -> Result<Self::Input, DevflowError> {
        Ok(ctx.problem()?.clone())
    }

    async fn execute(&self, problem: &Self::Input) -> Result<Self::Output, DevflowError> {
        let system = self.system_prompt.as_deref();
        self.ports.interaction.display("Let me clarify your requirements...");

        let questions = self
            .ports
            .model
            .complete(&prompts::clarification_questions(problem), system)
            .await?;
        self.ports
            .interaction
            .display(&format!("Clarification Questions:\n{questions}"));

        let responses = self
            .ports
            .interaction
            .prompt("Please provide detailed answers to clarify your requirements:")
            .await?;

        let requirements = self
            .ports
            .model
            .complete(
                &prompts::requirements_document(&problem.initial_problem, &responses),
                system,
            )
            .await?;

        Ok(ClarificationData {
            clarification_questions: questions,
            user_responses: responses,
            requirements_document: requirements,
            clarification_complete: true,
        })
    }

    async fn finalize(
        &self,
        ctx: &mut SharedContext,
        problem: Self::Input,
        output: Self::Output,
    ) -> Result<Transition, DevflowError> {
        let document = render_requirements(&problem, &output, &display_timestamp());
        let artifact = write_artifact(
            self.ports.files.as_ref(),
            Path::new(REQUIREMENTS_FILE),
            ArtifactKind::Requirements,
            &document,
        )
        .await?;

        ctx.add_artifacts([artifact]);
        ctx.record(StageRecord::Clarification(output))?;
        info!("Requirements clarified and documented");
        Ok(self.id().lifecycle_transition())
    }
}

/// Renders `user_requirements.md`.
#[must_use]
pub fn render_requirements(
    problem: &ProblemData,
    clarification: &ClarificationData,
    generated_on: &str,
) -> String {
    format!(
        "# User Requirements Document

## Generated on: {generated_on}

## Initial Problem
{}

## Clarification Process
{}

## User Responses
{}

## Comprehensive Requirements
{}
",
        problem.initial_problem,
        clarification.clarification_questions,
        clarification.user_responses,
        clarification.requirements_document
    )
}
