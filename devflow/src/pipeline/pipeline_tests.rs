//! Runner tests using stub stages.

use super::PipelineBuilder;
use crate::cancellation::CancellationToken;
use crate::context::SharedContext;
use crate::core::{Milestone, StageId, Transition};
use crate::errors::DevflowError;
use crate::events::CollectingEventSink;
use crate::stages::StageRunner;
use crate::testing::{assert_stage_order, BlockingStage, FailingStage, RecordingStage};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn journaled(ids: &[StageId]) -> (Vec<Arc<dyn StageRunner>>, Arc<Mutex<Vec<StageId>>>) {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let stages = ids
        .iter()
        .map(|id| {
            Arc::new(RecordingStage::new(*id).with_journal(journal.clone())) as Arc<dyn StageRunner>
        })
        .collect();
    (stages, journal)
}

fn build(stages: Vec<Arc<dyn StageRunner>>, sink: Arc<CollectingEventSink>) -> super::Pipeline {
    stages
        .into_iter()
        .try_fold(PipelineBuilder::new("test"), PipelineBuilder::stage)
        .unwrap()
        .with_event_sink(sink)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_runs_full_chain_in_order() {
    let (stages, journal) = journaled(&StageId::ALL);
    let sink = Arc::new(CollectingEventSink::new());
    let pipeline = build(stages, sink.clone());
    let mut ctx = SharedContext::new();

    let summary = pipeline.run(&mut ctx).await.unwrap();

    assert_eq!(*journal.lock(), StageId::ALL.to_vec());
    assert_eq!(summary.stages_run, StageId::ALL.to_vec());
    assert_eq!(summary.pipeline, "test");
    assert_eq!(summary.project_id, ctx.project_id());
    assert_stage_order(&sink, &StageId::ALL);

    let types = sink.event_types();
    assert_eq!(types.first().map(String::as_str), Some("pipeline.started"));
    assert_eq!(types.last().map(String::as_str), Some("pipeline.completed"));
}

#[tokio::test]
async fn test_complete_stops_early() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let first: Arc<dyn StageRunner> = Arc::new(
        RecordingStage::new(StageId::ProblemAcquisition)
            .with_transition(Transition::Complete)
            .with_journal(journal.clone()),
    );
    let second: Arc<dyn StageRunner> =
        Arc::new(RecordingStage::new(StageId::ProblemClarification).with_journal(journal.clone()));
    let pipeline = build(vec![first, second], Arc::new(CollectingEventSink::new()));

    let summary = pipeline.run(&mut SharedContext::new()).await.unwrap();

    assert_eq!(summary.stages_run, vec![StageId::ProblemAcquisition]);
    assert_eq!(*journal.lock(), vec![StageId::ProblemAcquisition]);
}

#[tokio::test]
async fn test_next_from_last_declared_stage_ends_run() {
    let (stages, journal) = journaled(&[StageId::ProblemAcquisition, StageId::ProblemClarification]);
    let pipeline = build(stages, Arc::new(CollectingEventSink::new()));

    let summary = pipeline.run(&mut SharedContext::new()).await.unwrap();

    assert_eq!(summary.stages_run.len(), 2);
    assert_eq!(journal.lock().len(), 2);
}

#[tokio::test]
async fn test_unexpected_transition_is_an_error() {
    let skipper: Arc<dyn StageRunner> = Arc::new(
        RecordingStage::new(StageId::ProblemAcquisition)
            .with_transition(Transition::Next(StageId::Testing)),
    );
    let next: Arc<dyn StageRunner> = Arc::new(RecordingStage::new(StageId::ProblemClarification));
    let sink = Arc::new(CollectingEventSink::new());
    let pipeline = build(vec![skipper, next], sink.clone());

    let err = pipeline.run(&mut SharedContext::new()).await.unwrap_err();

    assert_eq!(
        sink.event_types().last().map(String::as_str),
        Some("pipeline.failed")
    );
    let failed = sink.events_of_type("pipeline.failed");
    assert_eq!(failed[0].stage(), Some(StageId::ProblemAcquisition));
    assert!(sink.events_of_type("pipeline.completed").is_empty());

    match err {
        DevflowError::UnexpectedTransition {
            from,
            requested,
            declared,
        } => {
            assert_eq!(from, StageId::ProblemAcquisition);
            assert_eq!(requested, StageId::Testing);
            assert_eq!(declared, StageId::ProblemClarification);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_stage_failure_propagates_and_stops() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let failing: Arc<dyn StageRunner> =
        Arc::new(FailingStage::new(StageId::ProblemAcquisition, "model offline"));
    let after: Arc<dyn StageRunner> =
        Arc::new(RecordingStage::new(StageId::ProblemClarification).with_journal(journal.clone()));
    let sink = Arc::new(CollectingEventSink::new());
    let pipeline = build(vec![failing, after], sink.clone());

    let err = pipeline.run(&mut SharedContext::new()).await.unwrap_err();

    assert!(matches!(err, DevflowError::LanguageModel(ref m) if m == "model offline"));
    assert!(journal.lock().is_empty());
    assert_eq!(sink.events_of_type("stage.failed").len(), 1);
    assert_eq!(sink.events_of_type("pipeline.failed").len(), 1);
    assert!(sink.events_of_type("pipeline.completed").is_empty());
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let (stages, journal) = journaled(&[StageId::ProblemAcquisition]);
    let sink = Arc::new(CollectingEventSink::new());
    let pipeline = build(stages, sink.clone());
    let token = CancellationToken::new();
    token.cancel("shutdown");

    let err = pipeline
        .run_with_cancellation(&mut SharedContext::new(), &token)
        .await
        .unwrap_err();

    match err {
        DevflowError::Cancelled { reason, milestone } => {
            assert_eq!(reason, "shutdown");
            assert_eq!(milestone, Milestone::Initialized);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(journal.lock().is_empty());
    assert_eq!(sink.events_of_type("pipeline.cancelled").len(), 1);
}

#[tokio::test]
async fn test_cancel_interrupts_blocked_stage() {
    let blocking: Arc<dyn StageRunner> = Arc::new(BlockingStage::new(StageId::ProblemAcquisition));
    let sink = Arc::new(CollectingEventSink::new());
    let pipeline = build(vec![blocking], sink.clone());
    let token = Arc::new(CancellationToken::new());

    let canceller = {
        let token = Arc::clone(&token);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel("interrupted by user");
        })
    };

    let mut ctx = SharedContext::new();
    let result = tokio::time::timeout(
        Duration::from_secs(2),
        pipeline.run_with_cancellation(&mut ctx, &token),
    )
    .await
    .expect("run returns after cancellation");
    canceller.await.unwrap();

    assert!(result.unwrap_err().is_cancelled());
    assert_eq!(ctx.current_stage(), Milestone::Initialized);
    let cancelled = sink.events_of_type("pipeline.cancelled");
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].data["reason"], "interrupted by user");
}
