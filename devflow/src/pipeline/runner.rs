//! Sequential pipeline runner.

use crate::cancellation::CancellationToken;
use crate::context::SharedContext;
use crate::core::{ArtifactRecord, Milestone, PipelineEvent, StageId, Transition};
use crate::errors::DevflowError;
use crate::events::EventSink;
use crate::observability::SpanTimer;
use crate::stages::StageRunner;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// The pipeline name.
    pub pipeline: String,
    /// The project id of the run.
    pub project_id: String,
    /// Stages that finished, in execution order.
    pub stages_run: Vec<StageId>,
    /// The milestone recorded when the run ended.
    pub final_milestone: Milestone,
    /// Every file written during the run.
    pub artifacts: Vec<ArtifactRecord>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: f64,
}

/// A validated chain of stages. Built by
/// [`PipelineBuilder`](super::PipelineBuilder).
#[derive(Clone)]
pub struct Pipeline {
    name: String,
    stages: Vec<Arc<dyn StageRunner>>,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stage_ids())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub(super) fn new(
        name: String,
        stages: Vec<Arc<dyn StageRunner>>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self { name, stages, sink }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stage ids in chain order.
    #[must_use]
    pub fn stage_ids(&self) -> Vec<StageId> {
        self.stages.iter().map(|s| s.stage_id()).collect()
    }

    /// Returns the stage declared to follow `stage`, if any.
    #[must_use]
    pub fn declared_successor(&self, stage: StageId) -> Option<StageId> {
        let position = self.position(stage)?;
        self.stages.get(position + 1).map(|s| s.stage_id())
    }

    fn position(&self, stage: StageId) -> Option<usize> {
        self.stages.iter().position(|s| s.stage_id() == stage)
    }

    /// Runs the chain to completion without external cancellation.
    ///
    /// # Errors
    ///
    /// See [`run_with_cancellation`](Self::run_with_cancellation).
    pub async fn run(&self, ctx: &mut SharedContext) -> Result<RunSummary, DevflowError> {
        self.run_with_cancellation(ctx, &CancellationToken::new())
            .await
    }

    /// Runs the chain, starting at its first stage.
    ///
    /// Cancellation is checked before each stage and while a stage waits on
    /// a collaborator. A cancelled stage leaves the context as it was.
    ///
    /// # Errors
    ///
    /// Returns the first stage error unchanged,
    /// [`DevflowError::UnexpectedTransition`] when a stage nominates a
    /// successor other than the declared one, or
    /// [`DevflowError::Cancelled`] with the last recorded milestone.
    pub async fn run_with_cancellation(
        &self,
        ctx: &mut SharedContext,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, DevflowError> {
        let timer = SpanTimer::start(&self.name);
        let mut stages_run = Vec::with_capacity(self.stages.len());
        info!(pipeline = %self.name, project_id = %ctx.project_id(), "Pipeline started");
        self.sink
            .emit(PipelineEvent::pipeline_started(&self.name, ctx.project_id()))
            .await;

        let mut index = 0;
        loop {
            let Some(stage) = self.stages.get(index) else {
                break;
            };
            let id = stage.stage_id();

            if cancel.is_cancelled() {
                return Err(self.cancelled(ctx, cancel));
            }

            self.sink.emit(PipelineEvent::stage_started(id)).await;
            info!(stage = %id, "Stage started");
            let stage_timer = SpanTimer::start(id.as_str());

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                result = stage.run(ctx) => Some(result),
            };

            let transition = match outcome {
                None => return Err(self.cancelled(ctx, cancel)),
                Some(Err(err)) => {
                    let message = err.to_string();
                    error!(stage = %id, error = %message, "Stage failed");
                    self.sink.emit(PipelineEvent::stage_failed(id, &message)).await;
                    self.sink.emit(PipelineEvent::pipeline_failed(id, &message)).await;
                    return Err(err);
                }
                Some(Ok(transition)) => transition,
            };

            let duration_ms = stage_timer.finish();
            stages_run.push(id);
            info!(stage = %id, milestone = %ctx.current_stage(), duration_ms, "Stage completed");
            self.sink
                .emit(PipelineEvent::stage_completed(id, duration_ms))
                .await;

            match self.resolve(id, index, transition) {
                Ok(Some(next)) => index = next,
                Ok(None) => break,
                Err(err) => {
                    let message = err.to_string();
                    error!(stage = %id, error = %message, "Pipeline failed");
                    self.sink.emit(PipelineEvent::pipeline_failed(id, &message)).await;
                    return Err(err);
                }
            }
        }

        let duration_ms = timer.finish();
        info!(
            pipeline = %self.name,
            stages = stages_run.len(),
            milestone = %ctx.current_stage(),
            duration_ms,
            "Pipeline completed"
        );
        self.sink
            .emit(PipelineEvent::pipeline_completed(stages_run.len(), duration_ms))
            .await;

        Ok(RunSummary {
            pipeline: self.name.clone(),
            project_id: ctx.project_id().to_string(),
            stages_run,
            final_milestone: ctx.current_stage(),
            artifacts: ctx.artifacts().to_vec(),
            duration_ms,
        })
    }

    /// Maps a stage's transition onto the index of the next stage.
    fn resolve(
        &self,
        from: StageId,
        index: usize,
        transition: Transition,
    ) -> Result<Option<usize>, DevflowError> {
        let declared = self.stages.get(index + 1).map(|s| s.stage_id());
        match (transition, declared) {
            (Transition::Complete, _) => Ok(None),
            (Transition::Next(requested), None) => {
                debug!(stage = %from, requested = %requested, "No successor declared, run ends");
                Ok(None)
            }
            (Transition::Next(requested), Some(declared)) if requested == declared => {
                Ok(Some(index + 1))
            }
            (Transition::Next(requested), Some(declared)) => {
                Err(DevflowError::UnexpectedTransition {
                    from,
                    requested,
                    declared,
                })
            }
        }
    }

    fn cancelled(&self, ctx: &SharedContext, cancel: &CancellationToken) -> DevflowError {
        let reason = cancel.reason().unwrap_or_else(|| "cancelled".to_string());
        warn!(reason = %reason, milestone = %ctx.current_stage(), "Pipeline cancelled");
        self.sink.try_emit(PipelineEvent::pipeline_cancelled(&reason));
        DevflowError::Cancelled {
            reason,
            milestone: ctx.current_stage(),
        }
    }
}
