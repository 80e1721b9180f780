//! Documentation: the final stage.

use super::{prompts, write_artifact, Stage};
use crate::context::{DocFile, DocumentationData, SharedContext, StageRecord};
use crate::core::{ArtifactKind, StageId, Transition};
use crate::errors::DevflowError;
use crate::ports::StagePorts;
use crate::utils::{date_stamp, installation_section};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// What documentation reads from the context.
#[derive(Debug, Clone)]
pub struct DocumentationInput {
    /// The requirements document.
    pub requirements: String,
    /// The solution architecture.
    pub architecture: String,
    /// Phase names of the implemented components.
    pub components: Vec<String>,
    /// Number of test results across all iterations.
    pub test_result_count: usize,
}

/// Generates README and changelog, derives the docs directory and offers a
/// final push.
#[derive(Debug, Clone)]
pub struct DocumentationStage {
    ports: StagePorts,
    offer_push: bool,
    system_prompt: Option<String>,
}

impl DocumentationStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(ports: StagePorts) -> Self {
        Self {
            ports,
            offer_push: true,
            system_prompt: None,
        }
    }

    /// Controls whether the user is asked to push the documentation.
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

    fn summary(ctx: &SharedContext) -> String {
        let components = ctx
            .implementation()
            .map(|data| data.implemented_components.len())
            .unwrap_or_default();
        let rule = "=".repeat(60);
        format!(
            "{rule}
PROJECT COMPLETION SUMMARY
{rule}
Requirements: user_requirements.md
Planning: plan_and_tasks.md
Implementation: {components} components
Testing: test_cases_report.md
Documentation: README.md, CHANGELOG.md
{rule}"
        )
    }
}

/// Builds `docs/INSTALLATION.md` from the README's installation section.
#[must_use]
pub fn installation_doc(readme: &str) -> String {
    match installation_section(readme) {
        Some(section) => format!("# Installation Guide\n\n{section}"),
        None => "# Installation Guide\n\nDetailed installation instructions will be added here."
            .to_string(),
    }
}

#[async_trait]
impl Stage for DocumentationStage {
    type Input = DocumentationInput;
    type Output = DocumentationData;

    fn id(&self) -> StageId {
        StageId::Documentation
    }

    fn prepare(&self, ctx: &SharedContext) -> Result<Self::Input, DevflowError> {
        Ok(DocumentationInput {
            requirements: ctx.clarification()?.requirements_document.clone(),
            architecture: ctx.planning()?.solution_architecture.clone(),
            components: ctx
                .implementation()?
                .phase_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            test_result_count: ctx.testing()?.test_results.len(),
        })
    }

    async fn execute(&self, input: &Self::Input) -> Result<Self::Output, DevflowError> {
        let system = self.system_prompt.as_deref();
        self.ports.interaction.display("Generating documentation...");

        let readme = self
            .ports
            .model
            .complete(
                &prompts::readme(&input.requirements, &input.architecture, &input.components),
                system,
            )
            .await?;
        let changelog = self
            .ports
            .model
            .complete(
                &prompts::changelog(&input.components, input.test_result_count, &date_stamp()),
                system,
            )
            .await?;

        let docs_structure = vec![
            DocFile {
                path: PathBuf::from("README.md"),
                content: readme.clone(),
            },
            DocFile {
                path: PathBuf::from("CHANGELOG.md"),
                content: changelog.clone(),
            },
            DocFile {
                path: PathBuf::from("docs/ARCHITECTURE.md"),
                content: input.architecture.clone(),
            },
            DocFile {
                path: PathBuf::from("docs/INSTALLATION.md"),
                content: installation_doc(&readme),
            },
        ];

        Ok(DocumentationData {
            readme_content: readme,
            changelog_content: changelog,
            docs_structure,
            documentation_complete: true,
        })
    }

    async fn finalize(
        &self,
        ctx: &mut SharedContext,
        _input: Self::Input,
        output: Self::Output,
    ) -> Result<Transition, DevflowError> {
        let mut artifacts = Vec::with_capacity(output.docs_structure.len());
        for doc in &output.docs_structure {
            artifacts.push(
                write_artifact(
                    self.ports.files.as_ref(),
                    &doc.path,
                    ArtifactKind::Documentation,
                    &doc.content,
                )
                .await?,
            );
        }

        if self.offer_push
            && self
                .ports
                .interaction
                .confirm("Push final documentation to repository?")
                .await?
        {
            self.ports
                .vcs
                .commit_and_push("Add comprehensive documentation and changelog")
                .await;
        }

        ctx.add_artifacts(artifacts);
        ctx.record(StageRecord::Documentation(output))?;
        info!(project_id = %ctx.project_id(), "Project completed successfully");
        self.ports.interaction.display(&Self::summary(ctx));
        Ok(Transition::Complete)
    }
}
