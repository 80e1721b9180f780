//! Pipeline event type for lifecycle observability.

use super::StageId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An event emitted by the pipeline runner.
///
/// Events are consumed by event sinks for logging or, in tests,
/// for asserting execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// The event type (e.g., "stage.started", "stage.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// When the event occurred (ISO 8601).
    pub timestamp: String,

    /// The event payload data.
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl PipelineEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: crate::utils::iso_timestamp(),
            data: HashMap::new(),
        }
    }

    /// Adds a data field to the event.
    #[must_use]
    pub fn add_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Returns the stage this event refers to, if any.
    #[must_use]
    pub fn stage(&self) -> Option<StageId> {
        self.data
            .get("stage")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Creates a "pipeline.started" event.
    #[must_use]
    pub fn pipeline_started(pipeline: &str, project_id: &str) -> Self {
        Self::new("pipeline.started")
            .add_data("pipeline", serde_json::json!(pipeline))
            .add_data("project_id", serde_json::json!(project_id))
    }

    /// Creates a "stage.started" event.
    #[must_use]
    pub fn stage_started(stage: StageId) -> Self {
        Self::new("stage.started").add_data("stage", serde_json::json!(stage))
    }

    /// Creates a "stage.completed" event.
    #[must_use]
    pub fn stage_completed(stage: StageId, duration_ms: f64) -> Self {
        Self::new("stage.completed")
            .add_data("stage", serde_json::json!(stage))
            .add_data("milestone", serde_json::json!(stage.milestone()))
            .add_data("duration_ms", serde_json::json!(duration_ms))
    }

    /// Creates a "stage.failed" event.
    #[must_use]
    pub fn stage_failed(stage: StageId, error: &str) -> Self {
        Self::new("stage.failed")
            .add_data("stage", serde_json::json!(stage))
            .add_data("error", serde_json::json!(error))
    }

    /// Creates a "pipeline.completed" event.
    #[must_use]
    pub fn pipeline_completed(stages_run: usize, duration_ms: f64) -> Self {
        Self::new("pipeline.completed")
            .add_data("stages_run", serde_json::json!(stages_run))
            .add_data("duration_ms", serde_json::json!(duration_ms))
    }

    /// Creates a "pipeline.failed" event.
    #[must_use]
    pub fn pipeline_failed(stage: StageId, error: &str) -> Self {
        Self::new("pipeline.failed")
            .add_data("stage", serde_json::json!(stage))
            .add_data("error", serde_json::json!(error))
    }

    /// Creates a "pipeline.cancelled" event.
    #[must_use]
    pub fn pipeline_cancelled(reason: &str) -> Self {
        Self::new("pipeline.cancelled").add_data("reason", serde_json::json!(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_started_carries_stage() {
        let event = PipelineEvent::stage_started(StageId::Implementation);
        assert_eq!(event.event_type, "stage.started");
        assert_eq!(event.stage(), Some(StageId::Implementation));
    }

    #[test]
    fn test_stage_completed_carries_milestone() {
        let event = PipelineEvent::stage_completed(StageId::Testing, 12.5);
        assert_eq!(
            event.data.get("milestone"),
            Some(&serde_json::json!("testing_complete"))
        );
    }

    #[test]
    fn test_pipeline_event_has_no_stage() {
        let event = PipelineEvent::pipeline_completed(6, 1.0);
        assert!(event.stage().is_none());
    }

    #[test]
    fn test_event_serialization_uses_type_key() {
        let event = PipelineEvent::pipeline_cancelled("interrupted");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "pipeline.cancelled");
    }
}
