//! Pipeline builder with validation.

use super::Pipeline;
use crate::errors::{ContractErrorInfo, ContractSuggestions, PipelineValidationError};
use crate::events::{EventSink, NoOpEventSink};
use crate::stages::StageRunner;
use std::sync::Arc;

/// Builder for creating validated pipelines.
///
/// Stages run in insertion order. Each stage's declared successor is the
/// stage added after it.
#[derive(Clone)]
pub struct PipelineBuilder {
    name: String,
    stages: Vec<Arc<dyn StageRunner>>,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("stages", &self.stages)
            .finish_non_exhaustive()
    }
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Appends a stage to the chain.
    ///
    /// # Errors
    ///
    /// Returns an error if a stage with the same id is already in the chain.
    pub fn stage(mut self, runner: Arc<dyn StageRunner>) -> Result<Self, PipelineValidationError> {
        let id = runner.stage_id();
        if self.stages.iter().any(|s| s.stage_id() == id) {
            return Err(PipelineValidationError::new(format!(
                "Stage '{id}' is already part of pipeline '{}'",
                self.name
            ))
            .with_stages(vec![id])
            .with_error_info(
                contract_info("CONTRACT-004-DUPLICATE", format!("Stage '{id}' appears twice"))
                    .with_context_entry("stage", id.as_str()),
            ));
        }

        self.stages.push(runner);
        Ok(self)
    }

    /// Sets the event sink the pipeline reports to.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the builder has no stages.
    pub fn build(self) -> Result<Pipeline, PipelineValidationError> {
        if self.name.trim().is_empty() {
            return Err(PipelineValidationError::new("Pipeline name is blank")
                .with_error_info(
                    contract_info("CONTRACT-004-NAME", "Pipeline name cannot be blank"),
                ));
        }

        if self.stages.is_empty() {
            return Err(PipelineValidationError::new("Pipeline has no stages")
                .with_error_info(
                    contract_info("CONTRACT-004-EMPTY", "Cannot build an empty pipeline"),
                ));
        }

        Ok(Pipeline::new(self.name, self.stages, self.sink))
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

fn contract_info(code: &str, summary: impl Into<String>) -> ContractErrorInfo {
    let info = ContractErrorInfo::new(code, summary);
    match ContractSuggestions::get(code) {
        Some(hint) => info.with_fix_hint(hint),
        None => info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StageId;
    use crate::testing::RecordingStage;

    fn recording(id: StageId) -> Arc<dyn StageRunner> {
        Arc::new(RecordingStage::new(id))
    }

    #[test]
    fn test_builder_creation() {
        let builder = PipelineBuilder::new("test");
        assert_eq!(builder.name(), "test");
        assert_eq!(builder.stage_count(), 0);
    }

    #[test]
    fn test_builder_add_stage() {
        let builder = PipelineBuilder::new("test")
            .stage(recording(StageId::ProblemAcquisition))
            .unwrap()
            .stage(recording(StageId::ProblemClarification))
            .unwrap();

        assert_eq!(builder.stage_count(), 2);
    }

    #[test]
    fn test_builder_rejects_duplicate_stage() {
        let err = PipelineBuilder::new("test")
            .stage(recording(StageId::Testing))
            .unwrap()
            .stage(recording(StageId::Testing))
            .unwrap_err();

        assert_eq!(err.code(), Some("CONTRACT-004-DUPLICATE"));
        assert_eq!(err.stages, vec![StageId::Testing]);
    }

    #[test]
    fn test_builder_empty_fails() {
        let err = PipelineBuilder::new("test").build().unwrap_err();
        assert_eq!(err.code(), Some("CONTRACT-004-EMPTY"));
    }

    #[test]
    fn test_builder_blank_name_fails() {
        let err = PipelineBuilder::new("  ")
            .stage(recording(StageId::Testing))
            .unwrap()
            .build()
            .unwrap_err();
        assert_eq!(err.code(), Some("CONTRACT-004-NAME"));
    }

    #[test]
    fn test_build_preserves_order() {
        let pipeline = PipelineBuilder::new("test")
            .stage(recording(StageId::Implementation))
            .unwrap()
            .stage(recording(StageId::ProblemAcquisition))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            pipeline.stage_ids(),
            vec![StageId::Implementation, StageId::ProblemAcquisition]
        );
        assert_eq!(
            pipeline.declared_successor(StageId::Implementation),
            Some(StageId::ProblemAcquisition)
        );
        assert_eq!(pipeline.declared_successor(StageId::ProblemAcquisition), None);
    }
}
