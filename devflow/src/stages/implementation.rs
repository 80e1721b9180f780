//! Implementation: code generation phase by phase, gated on user approval.

use super::{prompts, write_artifact, Stage};
use crate::context::{ComponentRecord, ImplementationData, SharedContext, StageRecord};
use crate::core::{ArtifactKind, ArtifactRecord, StageId, Transition};
use crate::errors::DevflowError;
use crate::ports::StagePorts;
use crate::utils::{iso_timestamp, preview, snake_name};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, warn};

/// What implementation reads from the context.
#[derive(Debug, Clone)]
pub struct ImplementationInput {
    /// The implementation plan.
    pub plan: String,
    /// The task breakdown.
    pub tasks: String,
    /// The solution architecture.
    pub architecture: String,
}

/// Implementation results plus the source files written along the way.
#[derive(Debug, Clone)]
pub struct ImplementationOutput {
    /// Approved components and the per-phase log.
    pub data: ImplementationData,
    /// One record per source file written.
    pub artifacts: Vec<ArtifactRecord>,
}

/// Generates each phase, shows it to the user and keeps what they approve.
#[derive(Debug, Clone)]
pub struct ImplementationStage {
    ports: StagePorts,
    phases: Vec<String>,
    source_dir: PathBuf,
    extension: String,
    offer_push: bool,
    system_prompt: Option<String>,
}

impl ImplementationStage {
    /// Creates the stage for the given phases.
    #[must_use]
    pub fn new(ports: StagePorts, phases: Vec<String>) -> Self {
        Self {
            ports,
            phases,
            source_dir: PathBuf::from("src"),
            extension: "py".to_string(),
            offer_push: true,
            system_prompt: None,
        }
    }

    /// Sets the directory source files are written to.
    #[must_use]
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    /// Sets the extension of generated source files.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Controls whether the user is asked to push each approved phase.
    #[must_use]
    pub fn with_push_offer(mut self, offer: bool) -> Self {
        self.offer_push = offer;
        self
    }

    /// Sets the system prompt passed with every model call.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Returns the configured phases.
    #[must_use]
    pub fn phases(&self) -> &[String] {
        &self.phases
    }
}

/// Returns the file name for phase `index` (1-based).
#[must_use]
pub fn phase_filename(index: usize, phase: &str, extension: &str) -> String {
    format!("phase_{index}_{}.{extension}", snake_name(phase))
}

#[async_trait]
impl Stage for ImplementationStage {
    type Input = ImplementationInput;
    type Output = ImplementationOutput;

    fn id(&self) -> StageId {
        StageId::Implementation
    }

    fn prepare(&self, ctx: &SharedContext) -> Result<Self::Input, DevflowError> {
        let planning = ctx.planning()?;
        Ok(ImplementationInput {
            plan: planning.implementation_plan.clone(),
            tasks: planning.task_breakdown.clone(),
            architecture: planning.solution_architecture.clone(),
        })
    }

    async fn execute(&self, input: &Self::Input) -> Result<Self::Output, DevflowError> {
        let io = &self.ports.interaction;
        let system = self.system_prompt.as_deref();
        io.display("Starting implementation...");

        let mut components = Vec::new();
        let mut log = Vec::with_capacity(self.phases.len());
        let mut artifacts = Vec::new();

        for (index, phase) in self.phases.iter().enumerate() {
            let number = index + 1;
            info!(phase = %phase, number, "Implementing phase");
            io.display(&format!("Phase {number}: {phase}"));

            let code = self
                .ports
                .model
                .complete(&prompts::phase_code(phase, &input.architecture, &input.plan), system)
                .await?;
            io.display(&format!("Generated code for {phase}:\n{}...", preview(&code, 200)));

            if !io.confirm(&format!("Approve implementation for {phase}?")).await? {
                warn!(phase = %phase, "Phase rejected");
                log.push(format!("{phase} - Rejected by user"));
                io.display(&format!(
                    "Phase {phase} rejected. Please provide feedback for revision."
                ));
                continue;
            }

            let filename = phase_filename(number, phase, &self.extension);
            let path = self.source_dir.join(&filename);
            artifacts.push(
                write_artifact(self.ports.files.as_ref(), &path, ArtifactKind::Source, &code)
                    .await?,
            );

            components.push(ComponentRecord {
                phase: phase.clone(),
                filename,
                code,
                approved: true,
                timestamp: iso_timestamp(),
            });

            if self.offer_push && io.confirm("Push this phase to repository?").await? {
                self.ports.vcs.commit_and_push(&format!("Implement {phase}")).await;
            }

            log.push(format!("{phase} - Completed and approved"));
        }

        Ok(ImplementationOutput {
            data: ImplementationData {
                implemented_components: components,
                implementation_log: log,
                implementation_complete: true,
            },
            artifacts,
        })
    }

    async fn finalize(
        &self,
        ctx: &mut SharedContext,
        _input: Self::Input,
        output: Self::Output,
    ) -> Result<Transition, DevflowError> {
        let count = output.data.implemented_components.len();
        ctx.add_artifacts(output.artifacts);
        ctx.record(StageRecord::Implementation(output.data))?;
        info!(components = count, "Implementation completed");
        Ok(self.id().lifecycle_transition())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PHASES;
    use crate::context::{ClarificationData, PlanningData, ProblemData};
    use crate::stages::StageRunner;
    use crate::testing::{fake_ports, RecordingVersionControl, ScriptedInteraction};
    use std::sync::Arc;

    fn planned_context() -> SharedContext {
        let mut ctx = SharedContext::new();
        ctx.record(StageRecord::Problem(ProblemData::new("p", "", "")))
            .unwrap();
        ctx.record(StageRecord::Clarification(ClarificationData {
            clarification_questions: String::new(),
            user_responses: String::new(),
            requirements_document: "reqs".into(),
            clarification_complete: true,
        }))
        .unwrap();
        ctx.record(StageRecord::Planning(PlanningData {
            solution_architecture: "arch".into(),
            implementation_plan: "plan".into(),
            task_breakdown: "tasks".into(),
            planning_complete: true,
        }))
        .unwrap();
        ctx
    }

    fn default_phases() -> Vec<String> {
        DEFAULT_PHASES.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_phase_filename() {
        assert_eq!(
            phase_filename(2, "Core Components Implementation", "py"),
            "phase_2_core_components_implementation.py"
        );
    }

    #[tokio::test]
    async fn test_approved_phases_become_components() {
        let interaction = Arc::new(
            ScriptedInteraction::new()
                .confirm_when("Push", false)
                .confirm_when("Business Logic", false)
                .with_default_confirm(true),
        );
        let (ports, fakes) = fake_ports(interaction);
        let stage = ImplementationStage::new(ports, default_phases());
        let mut ctx = planned_context();

        stage.run(&mut ctx).await.unwrap();

        let data = ctx.implementation().unwrap();
        assert_eq!(data.implemented_components.len(), 4);
        assert_eq!(data.implementation_log.len(), 5);
        assert_eq!(data.implementation_log[2], "Business Logic Development - Rejected by user");
        assert!(!data.phase_names().contains(&"Business Logic Development"));
        assert!(fakes.files.get("src/phase_1_project_structure_setup.py").is_some());
        assert!(fakes.files.get("src/phase_3_business_logic_development.py").is_none());
        assert_eq!(ctx.artifacts().len(), 4);
        assert!(fakes.vcs.messages().is_empty());
    }

    #[tokio::test]
    async fn test_push_is_offered_per_approved_phase() {
        let interaction = Arc::new(ScriptedInteraction::new().with_default_confirm(true));
        let (ports, fakes) = fake_ports(interaction);
        let stage = ImplementationStage::new(ports, vec!["Setup".into(), "Core".into()])
            .with_extension("rs")
            .with_source_dir("code");
        let mut ctx = planned_context();

        stage.run(&mut ctx).await.unwrap();

        assert_eq!(fakes.vcs.messages(), vec!["Implement Setup", "Implement Core"]);
        assert!(fakes.files.get("code/phase_2_core.rs").is_some());
    }

    #[tokio::test]
    async fn test_push_not_offered_when_disabled() {
        let interaction = Arc::new(ScriptedInteraction::new().with_default_confirm(true));
        let (ports, fakes) = fake_ports(interaction.clone());
        let stage = ImplementationStage::new(ports, vec!["Setup".into()]).with_push_offer(false);
        let mut ctx = planned_context();

        stage.run(&mut ctx).await.unwrap();

        assert!(fakes.vcs.messages().is_empty());
        assert_eq!(interaction.confirmations().len(), 1);
    }

    #[tokio::test]
    async fn test_all_rejected_yields_no_components() {
        let interaction = Arc::new(ScriptedInteraction::new().with_default_confirm(false));
        let (ports, fakes) = fake_ports(interaction);
        let stage = ImplementationStage::new(ports, default_phases());
        let mut ctx = planned_context();

        let transition = stage.run(&mut ctx).await.unwrap();

        assert_eq!(transition, Transition::Next(StageId::Testing));
        let data = ctx.implementation().unwrap();
        assert!(data.implemented_components.is_empty());
        assert!(data.implementation_complete);
        assert!(fakes.files.is_empty());
    }

    #[tokio::test]
    async fn test_failed_push_keeps_component() {
        let interaction = Arc::new(ScriptedInteraction::new().with_default_confirm(true));
        let (ports, _) = fake_ports(interaction);
        let vcs = Arc::new(RecordingVersionControl::new().with_result(false));
        let stage = ImplementationStage::new(ports.with_vcs(vcs.clone()), vec!["Setup".into()]);
        let mut ctx = planned_context();

        stage.run(&mut ctx).await.unwrap();

        assert_eq!(vcs.messages(), vec!["Implement Setup"]);
        let data = ctx.implementation().unwrap();
        assert_eq!(data.implemented_components.len(), 1);
        assert_eq!(data.implementation_log, vec!["Setup - Completed and approved"]);
    }
}
