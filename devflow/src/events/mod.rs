//! Event sinks for pipeline observability.
//!
//! The runner emits a [`PipelineEvent`](crate::core::PipelineEvent) at every
//! lifecycle step. Sinks decide what to do with them: drop them, mirror them
//! into `tracing`, or keep them for assertions.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
