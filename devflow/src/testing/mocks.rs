//! Stub stages for exercising the runner.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::context::SharedContext;
use crate::core::{StageId, Transition};
use crate::errors::DevflowError;
use crate::stages::Stage;

/// A stage that records its execution and returns a configurable transition.
///
/// By default it follows the lifecycle order.
#[derive(Debug)]
pub struct RecordingStage {
    id: StageId,
    transition: Transition,
    journal: Option<Arc<Mutex<Vec<StageId>>>>,
    call_count: AtomicUsize,
}

impl RecordingStage {
    /// Creates a recording stage for `id`.
    #[must_use]
    pub fn new(id: StageId) -> Self {
        Self {
            id,
            transition: id.lifecycle_transition(),
            journal: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Sets the transition returned from finalize.
    #[must_use]
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    /// Appends this stage's id to `journal` every time it runs.
    #[must_use]
    pub fn with_journal(mut self, journal: Arc<Mutex<Vec<StageId>>>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Returns the number of times the stage ran.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Stage for RecordingStage {
    type Input = ();
    type Output = ();

    fn id(&self) -> StageId {
        self.id
    }

    fn prepare(&self, _ctx: &SharedContext) -> Result<Self::Input, DevflowError> {
        Ok(())
    }

    async fn execute(&self, _input: &Self::Input) -> Result<Self::Output, DevflowError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(journal) = &self.journal {
            journal.lock().push(self.id);
        }
        Ok(())
    }

    async fn finalize(
        &self,
        _ctx: &mut SharedContext,
        _input: Self::Input,
        _output: Self::Output,
    ) -> Result<Transition, DevflowError> {
        Ok(self.transition)
    }
}

/// A stage whose execution always fails with a language-model error.
#[derive(Debug)]
pub struct FailingStage {
    id: StageId,
    message: String,
}

impl FailingStage {
    /// Creates a failing stage.
    #[must_use]
    pub fn new(id: StageId, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
        }
    }
}

#[async_trait]
impl Stage for FailingStage {
    type Input = ();
    type Output = ();

    fn id(&self) -> StageId {
        self.id
    }

    fn prepare(&self, _ctx: &SharedContext) -> Result<Self::Input, DevflowError> {
        Ok(())
    }

    async fn execute(&self, _input: &Self::Input) -> Result<Self::Output, DevflowError> {
        Err(DevflowError::LanguageModel(self.message.clone()))
    }

    async fn finalize(
        &self,
        _ctx: &mut SharedContext,
        _input: Self::Input,
        _output: Self::Output,
    ) -> Result<Transition, DevflowError> {
        Ok(self.id.lifecycle_transition())
    }
}

/// A stage that waits forever, like a prompt nobody answers.
#[derive(Debug)]
pub struct BlockingStage {
    id: StageId,
}

impl BlockingStage {
    /// Creates a blocking stage.
    #[must_use]
    pub fn new(id: StageId) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Stage for BlockingStage {
    type Input = ();
    type Output = ();

    fn id(&self) -> StageId {
        self.id
    }

    fn prepare(&self, _ctx: &SharedContext) -> Result<Self::Input, DevflowError> {
        Ok(())
    }

    async fn execute(&self, _input: &Self::Input) -> Result<Self::Output, DevflowError> {
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn finalize(
        &self,
        _ctx: &mut SharedContext,
        _input: Self::Input,
        _output: Self::Output,
    ) -> Result<Transition, DevflowError> {
        Ok(self.id.lifecycle_transition())
    }
}
