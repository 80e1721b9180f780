//! Run identity for tracking a pipeline execution.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one run of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    /// Human-readable project id (`project_YYYYmmdd_HHMMSS`).
    pub project_id: String,
    /// The unique ID for this run.
    pub run_id: Uuid,
    /// When the run started (ISO 8601).
    pub start_time: String,
}

impl RunIdentity {
    /// Creates a new identity stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            project_id: crate::utils::project_id_at(chrono::Local::now()),
            run_id: Uuid::new_v4(),
            start_time: crate::utils::iso_timestamp(),
        }
    }

    /// Creates an identity with a specific project id.
    #[must_use]
    pub fn with_project_id(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::new()
        }
    }
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_identity_new() {
        let identity = RunIdentity::new();
        assert!(identity.project_id.starts_with("project_"));
        assert_eq!(identity.project_id.len(), "project_20240101_000000".len());
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(RunIdentity::new().run_id, RunIdentity::new().run_id);
    }

    #[test]
    fn test_with_project_id() {
        let identity = RunIdentity::with_project_id("demo");
        assert_eq!(identity.project_id, "demo");
    }
}
