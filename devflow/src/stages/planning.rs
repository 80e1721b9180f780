//! Solution planning: architecture, plan and task breakdown.

use super::{prompts, write_artifact, Stage};
use crate::context::{PlanningData, ProblemData, SharedContext, StageRecord};
use crate::core::{ArtifactKind, StageId, Transition};
use crate::errors::DevflowError;
use crate::ports::StagePorts;
use crate::utils::display_timestamp;
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// File the plan is written to.
pub const PLAN_FILE: &str = "plan_and_tasks.md";

/// What planning reads from the context.
#[derive(Debug, Clone)]
pub struct PlanningInput {
    /// The requirements document from clarification.
    pub requirements: String,
    /// The problem as first stated.
    pub problem: ProblemData,
}

/// Makes three chained model calls: each one is fed the previous answer.
#[derive(Debug, Clone)]
pub struct SolutionPlanningStage {
    ports: StagePorts,
    system_prompt: Option<String>,
}

impl SolutionPlanningStage {
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
impl Stage for SolutionPlanningStage {
    type Input = PlanningInput;
    type Output = PlanningData;

    fn id(&self) -> StageId {
        StageId::SolutionPlanning
    }

    fn prepare(&self, ctx: &SharedContext) -> Result<Self::Input, DevflowError> {
        Ok(PlanningInput {
            requirements: ctx.clarification()?.requirements_document.clone(),
            problem: ctx.problem()?.clone(),
        })
    }

    async fn execute(&self, input: &Self::Input) -> Result<Self::Output, DevflowError> {
        let system = self.system_prompt.as_deref();
        let model = &self.ports.model;
        self.ports.interaction.display("Creating solution plan...");

        let architecture = model
            .complete(&prompts::architecture(&input.requirements), system)
            .await?;
        let plan = model
            .complete(&prompts::implementation_plan(&architecture), system)
            .await?;
        let tasks = model.complete(&prompts::task_breakdown(&plan), system).await?;

        Ok(PlanningData {
            solution_architecture: architecture,
            implementation_plan: plan,
            task_breakdown: tasks,
            planning_complete: true,
        })
    }

    async fn finalize(
        &self,
        ctx: &mut SharedContext,
        _input: Self::Input,
        output: Self::Output,
    ) -> Result<Transition, DevflowError> {
        let document = render_plan(&output, &display_timestamp());
        let artifact = write_artifact(
            self.ports.files.as_ref(),
            Path::new(PLAN_FILE),
            ArtifactKind::Plan,
            &document,
        )
        .await?;

        ctx.add_artifacts([artifact]);
        ctx.record(StageRecord::Planning(output))?;
        info!("Solution planned and tasks defined");
        Ok(self.id().lifecycle_transition())
    }
}

/// Renders `plan_and_tasks.md`.
#[must_use]
pub fn render_plan(planning: &PlanningData, generated_on: &str) -> String {
    format!(
        "# Solution Plan and Tasks

## Generated on: {generated_on}

## Solution Architecture
{}

## Implementation Plan
{}

## Task Breakdown
{}
",
        planning.solution_architecture, planning.implementation_plan, planning.task_breakdown
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ClarificationData;
    use crate::core::Milestone;
    use crate::stages::StageRunner;
    use crate::testing::{fake_ports, ScriptedInteraction};
    use std::sync::Arc;

    fn clarified_context() -> SharedContext {
        let mut ctx = SharedContext::new();
        ctx.record(StageRecord::Problem(ProblemData::new("chat app", "", "")))
            .unwrap();
        ctx.record(StageRecord::Clarification(ClarificationData {
            clarification_questions: "q".into(),
            user_responses: "r".into(),
            requirements_document: "REQS".into(),
            clarification_complete: true,
        }))
        .unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_each_call_is_fed_the_previous_answer() {
        let (ports, fakes) = fake_ports(Arc::new(ScriptedInteraction::new()));
        let stage = SolutionPlanningStage::new(ports);
        let mut ctx = clarified_context();

        stage.run(&mut ctx).await.unwrap();

        let calls = fakes.model.prompts();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].contains("Requirements: REQS"));

        let planning = ctx.planning().unwrap();
        assert!(calls[1].contains(&planning.solution_architecture));
        assert!(calls[2].contains(&planning.implementation_plan));
        assert_eq!(ctx.current_stage(), Milestone::SolutionPlanned);
        assert!(fakes.files.get(PLAN_FILE).is_some());
    }

    #[test]
    fn test_render_plan_sections_in_order() {
        let data = PlanningData {
            solution_architecture: "A".into(),
            implementation_plan: "P".into(),
            task_breakdown: "T".into(),
            planning_complete: true,
        };
        let doc = render_plan(&data, "now");

        let arch = doc.find("## Solution Architecture").unwrap();
        let plan = doc.find("## Implementation Plan").unwrap();
        let tasks = doc.find("## Task Breakdown").unwrap();
        assert!(arch < plan && plan < tasks);
    }
}
