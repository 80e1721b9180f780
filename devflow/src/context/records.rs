//! Data contracts passed from one stage to the next.
//!
//! Each record is produced by exactly one stage and is read-only once it is
//! stored in the [`SharedContext`](super::SharedContext).

use crate::core::StageId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output of the problem acquisition stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemData {
    /// The problem statement as typed by the user.
    pub initial_problem: String,
    /// Extra context or constraints (may be empty).
    pub context: String,
    /// Preferred technology stack (may be empty).
    pub preferred_tech: String,
    /// When the problem was captured (ISO 8601).
    pub timestamp: String,
}

impl ProblemData {
    /// Creates problem data stamped with the current time.
    #[must_use]
    pub fn new(
        initial_problem: impl Into<String>,
        context: impl Into<String>,
        preferred_tech: impl Into<String>,
    ) -> Self {
        Self {
            initial_problem: initial_problem.into(),
            context: context.into(),
            preferred_tech: preferred_tech.into(),
            timestamp: crate::utils::iso_timestamp(),
        }
    }
}

/// Output of the problem clarification stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationData {
    /// Questions generated by the language model.
    pub clarification_questions: String,
    /// The user's free-form answers.
    pub user_responses: String,
    /// The generated requirements document.
    pub requirements_document: String,
    /// Always true once recorded.
    pub clarification_complete: bool,
}

/// Output of the solution planning stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningData {
    /// Architecture overview.
    pub solution_architecture: String,
    /// Phased implementation plan.
    pub implementation_plan: String,
    /// Actionable task list.
    pub task_breakdown: String,
    /// Always true once recorded.
    pub planning_complete: bool,
}

/// One approved implementation phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Phase name, e.g. "Core Components Implementation".
    pub phase: String,
    /// File name under the source directory.
    pub filename: String,
    /// Generated code.
    pub code: String,
    /// Whether the user approved the phase.
    pub approved: bool,
    /// When the phase was approved (ISO 8601).
    pub timestamp: String,
}

/// Output of the implementation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationData {
    /// Approved components in phase order.
    pub implemented_components: Vec<ComponentRecord>,
    /// One line per phase describing the outcome.
    pub implementation_log: Vec<String>,
    /// Always true once recorded.
    pub implementation_complete: bool,
}

impl ImplementationData {
    /// Returns the phase names of the implemented components.
    #[must_use]
    pub fn phase_names(&self) -> Vec<&str> {
        self.implemented_components
            .iter()
            .map(|c| c.phase.as_str())
            .collect()
    }
}

/// Result of testing one component in one iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResultRecord {
    /// Phase name of the tested component.
    pub component: String,
    /// Generated test content.
    pub test_code: String,
    /// Pass/fail flag from the test oracle.
    pub passed: bool,
    /// 1-based iteration number.
    pub iteration: u32,
}

/// Output of the testing stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestingData {
    /// Results from every iteration, in execution order.
    pub test_results: Vec<TestResultRecord>,
    /// Pass state of the final iteration.
    pub all_tests_passed: bool,
    /// Number of iterations executed.
    pub iterations: u32,
    /// Rendered `test_cases_report.md`.
    pub test_report: String,
    /// Always true once recorded.
    pub testing_complete: bool,
}

/// A documentation file and its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocFile {
    /// Path relative to the output directory.
    pub path: PathBuf,
    /// File content.
    pub content: String,
}

/// Output of the documentation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationData {
    /// Generated README.
    pub readme_content: String,
    /// Generated changelog.
    pub changelog_content: String,
    /// Every documentation file, in write order.
    pub docs_structure: Vec<DocFile>,
    /// Always true once recorded.
    pub documentation_complete: bool,
}

/// A stage output, tagged by the stage that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "data", rename_all = "snake_case")]
pub enum StageRecord {
    /// From [`StageId::ProblemAcquisition`].
    Problem(ProblemData),
    /// From [`StageId::ProblemClarification`].
    Clarification(ClarificationData),
    /// From [`StageId::SolutionPlanning`].
    Planning(PlanningData),
    /// From [`StageId::Implementation`].
    Implementation(ImplementationData),
    /// From [`StageId::Testing`].
    Testing(TestingData),
    /// From [`StageId::Documentation`].
    Documentation(DocumentationData),
}

impl StageRecord {
    /// Returns the stage that produces this record.
    #[must_use]
    pub const fn stage(&self) -> StageId {
        match self {
            Self::Problem(_) => StageId::ProblemAcquisition,
            Self::Clarification(_) => StageId::ProblemClarification,
            Self::Planning(_) => StageId::SolutionPlanning,
            Self::Implementation(_) => StageId::Implementation,
            Self::Testing(_) => StageId::Testing,
            Self::Documentation(_) => StageId::Documentation,
        }
    }
}
