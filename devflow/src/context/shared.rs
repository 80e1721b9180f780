//! The append-only accumulator threaded through every stage.

use super::records::{
    ClarificationData, DocumentationData, ImplementationData, PlanningData, ProblemData,
    StageRecord, TestingData,
};
use super::RunIdentity;
use crate::core::{ArtifactRecord, Milestone, StageId};
use crate::errors::{DataConflictError, MissingOutputError};
use serde::Serialize;

/// Shared state for one run.
///
/// Each stage output has a single slot. Slots are filled through
/// [`SharedContext::record`] and can never be overwritten, so a stage can
/// rely on everything an earlier stage recorded staying exactly as it was.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SharedContext {
    identity: RunIdentity,
    current_stage: Milestone,
    problem_data: Option<ProblemData>,
    clarification_data: Option<ClarificationData>,
    planning_data: Option<PlanningData>,
    implementation_data: Option<ImplementationData>,
    testing_data: Option<TestingData>,
    documentation_data: Option<DocumentationData>,
    artifacts: Vec<ArtifactRecord>,
}

impl SharedContext {
    /// Creates an empty context with a fresh run identity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty context with the given identity.
    #[must_use]
    pub fn with_identity(identity: RunIdentity) -> Self {
        Self {
            identity,
            ..Self::default()
        }
    }

    /// Returns the run identity.
    #[must_use]
    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    /// Returns the project id.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.identity.project_id
    }

    /// Returns the last milestone reached.
    #[must_use]
    pub fn current_stage(&self) -> Milestone {
        self.current_stage
    }

    /// Stores a stage output and advances the milestone.
    ///
    /// # Errors
    ///
    /// Returns [`DataConflictError`] if the stage already recorded its output.
    pub fn record(&mut self, record: StageRecord) -> Result<(), DataConflictError> {
        let stage = record.stage();
        if self.has_output(stage) {
            return Err(DataConflictError::new(stage));
        }

        match record {
            StageRecord::Problem(data) => self.problem_data = Some(data),
            StageRecord::Clarification(data) => self.clarification_data = Some(data),
            StageRecord::Planning(data) => self.planning_data = Some(data),
            StageRecord::Implementation(data) => self.implementation_data = Some(data),
            StageRecord::Testing(data) => self.testing_data = Some(data),
            StageRecord::Documentation(data) => self.documentation_data = Some(data),
        }
        self.current_stage = stage.milestone();
        tracing::debug!(%stage, milestone = %self.current_stage, "Stage output recorded");
        Ok(())
    }

    /// Appends records of files written by a stage.
    pub fn add_artifacts(&mut self, artifacts: impl IntoIterator<Item = ArtifactRecord>) {
        self.artifacts.extend(artifacts);
    }

    /// Returns every file written so far, in write order.
    #[must_use]
    pub fn artifacts(&self) -> &[ArtifactRecord] {
        &self.artifacts
    }

    /// Returns true if `stage` has recorded its output.
    #[must_use]
    pub fn has_output(&self, stage: StageId) -> bool {
        match stage {
            StageId::ProblemAcquisition => self.problem_data.is_some(),
            StageId::ProblemClarification => self.clarification_data.is_some(),
            StageId::SolutionPlanning => self.planning_data.is_some(),
            StageId::Implementation => self.implementation_data.is_some(),
            StageId::Testing => self.testing_data.is_some(),
            StageId::Documentation => self.documentation_data.is_some(),
        }
    }

    /// Returns the stages that have recorded output, in lifecycle order.
    #[must_use]
    pub fn completed_stages(&self) -> Vec<StageId> {
        StageId::ALL
            .into_iter()
            .filter(|stage| self.has_output(*stage))
            .collect()
    }

    /// Returns the problem statement.
    ///
    /// # Errors
    ///
    /// Returns [`MissingOutputError`] if problem acquisition has not run.
    pub fn problem(&self) -> Result<&ProblemData, MissingOutputError> {
        self.problem_data
            .as_ref()
            .ok_or(MissingOutputError::new(StageId::ProblemAcquisition))
    }

    /// Returns the clarification output.
    pub fn clarification(&self) -> Result<&ClarificationData, MissingOutputError> {
        self.clarification_data
            .as_ref()
            .ok_or(MissingOutputError::new(StageId::ProblemClarification))
    }

    /// Returns the planning output.
    pub fn planning(&self) -> Result<&PlanningData, MissingOutputError> {
        self.planning_data
            .as_ref()
            .ok_or(MissingOutputError::new(StageId::SolutionPlanning))
    }

    /// Returns the implementation output.
    pub fn implementation(&self) -> Result<&ImplementationData, MissingOutputError> {
        self.implementation_data
            .as_ref()
            .ok_or(MissingOutputError::new(StageId::Implementation))
    }

    /// Returns the testing output.
    pub fn testing(&self) -> Result<&TestingData, MissingOutputError> {
        self.testing_data
            .as_ref()
            .ok_or(MissingOutputError::new(StageId::Testing))
    }

    /// Returns the documentation output.
    pub fn documentation(&self) -> Result<&DocumentationData, MissingOutputError> {
        self.documentation_data
            .as_ref()
            .ok_or(MissingOutputError::new(StageId::Documentation))
    }

    /// Serializes the whole context to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
