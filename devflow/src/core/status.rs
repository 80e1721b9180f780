//! Stage identifiers, transitions and milestones.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six lifecycle stages.
///
/// The declaration order is the lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    /// Collects the problem statement from the user.
    ProblemAcquisition,
    /// Asks clarifying questions and writes the requirements document.
    ProblemClarification,
    /// Designs the architecture and breaks it into tasks.
    SolutionPlanning,
    /// Generates code phase by phase with user approval.
    Implementation,
    /// Generates tests for every approved component.
    Testing,
    /// Generates README, changelog and supporting docs.
    Documentation,
}

impl StageId {
    /// All stages in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::ProblemAcquisition,
        Self::ProblemClarification,
        Self::SolutionPlanning,
        Self::Implementation,
        Self::Testing,
        Self::Documentation,
    ];

    /// Returns the snake_case identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ProblemAcquisition => "problem_acquisition",
            Self::ProblemClarification => "problem_clarification",
            Self::SolutionPlanning => "solution_planning",
            Self::Implementation => "implementation",
            Self::Testing => "testing",
            Self::Documentation => "documentation",
        }
    }

    /// Returns the lifecycle successor, or `None` for the last stage.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::ProblemAcquisition => Some(Self::ProblemClarification),
            Self::ProblemClarification => Some(Self::SolutionPlanning),
            Self::SolutionPlanning => Some(Self::Implementation),
            Self::Implementation => Some(Self::Testing),
            Self::Testing => Some(Self::Documentation),
            Self::Documentation => None,
        }
    }

    /// Returns the milestone reached when this stage finalizes.
    #[must_use]
    pub const fn milestone(&self) -> Milestone {
        match self {
            Self::ProblemAcquisition => Milestone::ProblemAcquired,
            Self::ProblemClarification => Milestone::RequirementsClarified,
            Self::SolutionPlanning => Milestone::SolutionPlanned,
            Self::Implementation => Milestone::ImplementationComplete,
            Self::Testing => Milestone::TestingComplete,
            Self::Documentation => Milestone::ProjectComplete,
        }
    }

    /// Returns the transition a stage makes when it follows the lifecycle.
    #[must_use]
    pub const fn lifecycle_transition(&self) -> Transition {
        match self.next() {
            Some(next) => Transition::Next(next),
            None => Transition::Complete,
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a stage asks the runner to do after finalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "stage")]
pub enum Transition {
    /// Continue with the given stage.
    Next(StageId),
    /// The run is finished.
    Complete,
}

impl Transition {
    /// Returns true if this transition ends the run.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// The `current_stage` marker kept in the shared context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    /// No stage has finished yet.
    #[default]
    Initialized,
    /// The problem statement was captured.
    ProblemAcquired,
    /// `user_requirements.md` was written.
    RequirementsClarified,
    /// `plan_and_tasks.md` was written.
    SolutionPlanned,
    /// All implementation phases were reviewed.
    ImplementationComplete,
    /// The test loop finished and its report was written.
    TestingComplete,
    /// Documentation was written; the run is done.
    ProjectComplete,
}

impl Milestone {
    /// Returns the snake_case marker.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::ProblemAcquired => "problem_acquired",
            Self::RequirementsClarified => "requirements_clarified",
            Self::SolutionPlanned => "solution_planned",
            Self::ImplementationComplete => "implementation_complete",
            Self::TestingComplete => "testing_complete",
            Self::ProjectComplete => "project_complete",
        }
    }

    /// Returns true once the final stage has finished.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::ProjectComplete)
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
