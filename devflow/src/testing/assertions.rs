//! Assertions over pipeline runs.

use super::InMemoryFileStore;
use crate::context::SharedContext;
use crate::core::{Milestone, StageId};
use crate::events::CollectingEventSink;

/// Asserts that `stage.completed` events arrived in exactly `expected` order.
pub fn assert_stage_order(sink: &CollectingEventSink, expected: &[StageId]) {
    let completed: Vec<StageId> = sink
        .events_of_type("stage.completed")
        .iter()
        .filter_map(|e| e.stage())
        .collect();
    assert_eq!(
        completed, expected,
        "Expected stages {expected:?} to complete in order, got {completed:?}"
    );
}

/// Asserts that every path in `paths` was written to `store`.
pub fn assert_artifacts_written(store: &InMemoryFileStore, paths: &[&str]) {
    let missing: Vec<&str> = paths
        .iter()
        .copied()
        .filter(|p| store.get(p).is_none())
        .collect();
    assert!(
        missing.is_empty(),
        "Expected files {missing:?} to be written. Written: {:?}",
        store.paths()
    );
}

/// Asserts the context's current milestone.
pub fn assert_milestone(ctx: &SharedContext, expected: Milestone) {
    assert_eq!(
        ctx.current_stage(),
        expected,
        "Expected milestone {expected}, got {}",
        ctx.current_stage()
    );
}
