// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline and worker lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Pipeline preparation, start and completion
//! * Worker thread start, completion and failure
//! * Cascade stops and shutdown timeouts
//! * Lifecycle hook failures

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Pipeline row sets allocated and every transform initialised.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_hopwood::observability::messages::engine::PipelinePrepared;
///
/// let msg = PipelinePrepared {
///     pipeline: "orders",
///     transform_count: 3,
///     worker_count: 6,
///     rowset_count: 8,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct PipelinePrepared<'a> {
    pub pipeline: &'a str,
    pub transform_count: usize,
    pub worker_count: usize,
    pub rowset_count: usize,
}

impl Display for PipelinePrepared<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Prepared pipeline '{}': {} transforms, {} workers, {} row sets",
            self.pipeline, self.transform_count, self.worker_count, self.rowset_count
        )
    }
}

impl StructuredLog for PipelinePrepared<'_> {
    fn log(&self) {
        tracing::info!(
            pipeline = self.pipeline,
            transform_count = self.transform_count,
            worker_count = self.worker_count,
            rowset_count = self.rowset_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_prepared",
            span_name = name,
            pipeline = self.pipeline,
            transform_count = self.transform_count,
            worker_count = self.worker_count,
        )
    }
}

/// Worker threads spawned.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PipelineStarted<'a> {
    pub pipeline: &'a str,
    pub worker_count: usize,
}

impl Display for PipelineStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Started pipeline '{}' with {} worker threads",
            self.pipeline, self.worker_count
        )
    }
}

impl StructuredLog for PipelineStarted<'_> {
    fn log(&self) {
        tracing::info!(
            pipeline = self.pipeline,
            worker_count = self.worker_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline",
            span_name = name,
            pipeline = self.pipeline,
            worker_count = self.worker_count,
        )
    }
}

/// Every worker reached a terminal state.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_hopwood::observability::messages::engine::PipelineCompleted;
/// use std::time::Duration;
///
/// let msg = PipelineCompleted {
///     pipeline: "orders",
///     status: "FinishedWithErrors",
///     diverted_rows: 2,
///     duration: Duration::from_millis(250),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct PipelineCompleted<'a> {
    pub pipeline: &'a str,
    pub status: &'a str,
    pub diverted_rows: u64,
    pub duration: Duration,
}

impl Display for PipelineCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline '{}' completed with status {} ({} diverted rows) in {:?}",
            self.pipeline, self.status, self.diverted_rows, self.duration
        )
    }
}

impl StructuredLog for PipelineCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            pipeline = self.pipeline,
            status = self.status,
            diverted_rows = self.diverted_rows,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_completed",
            span_name = name,
            pipeline = self.pipeline,
            status = self.status,
            duration = ?self.duration,
        )
    }
}

/// The run's stop signal was raised.
///
/// # Log Level
/// `warn!` - Every worker is about to wind down early
pub struct StopRequested<'a> {
    pub pipeline: &'a str,
    pub requested_by: &'a str,
}

impl Display for StopRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stop requested for pipeline '{}' by {}",
            self.pipeline, self.requested_by
        )
    }
}

impl StructuredLog for StopRequested<'_> {
    fn log(&self) {
        tracing::warn!(
            pipeline = self.pipeline,
            requested_by = self.requested_by,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "stop_requested",
            span_name = name,
            pipeline = self.pipeline,
            requested_by = self.requested_by,
        )
    }
}

/// A worker thread entered its processing loop.
///
/// The span produced by this message wraps the whole life of the worker, so
/// every event a transform emits carries its pipeline, transform and copy.
///
/// # Log Level
/// `debug!` - Emitted once per copy
pub struct WorkerStarted<'a> {
    pub pipeline: &'a str,
    pub transform_id: &'a str,
    pub copy_nr: usize,
}

impl Display for WorkerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' copy {} started",
            self.transform_id, self.copy_nr
        )
    }
}

impl StructuredLog for WorkerStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            pipeline = self.pipeline,
            transform = self.transform_id,
            copy = self.copy_nr,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "transform",
            span_name = name,
            pipeline = self.pipeline,
            transform = self.transform_id,
            copy = self.copy_nr,
        )
    }
}

/// A worker reached a terminal state.
///
/// # Log Level
/// `debug!` - Emitted once per copy
pub struct WorkerFinished<'a> {
    pub transform_id: &'a str,
    pub copy_nr: usize,
    pub status: &'a str,
    pub lines_read: u64,
    pub lines_written: u64,
    pub errors: u64,
}

impl Display for WorkerFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' copy {} finished with status {}: read={}, written={}, errors={}",
            self.transform_id,
            self.copy_nr,
            self.status,
            self.lines_read,
            self.lines_written,
            self.errors
        )
    }
}

impl StructuredLog for WorkerFinished<'_> {
    fn log(&self) {
        tracing::debug!(
            transform = self.transform_id,
            copy = self.copy_nr,
            status = self.status,
            lines_read = self.lines_read,
            lines_written = self.lines_written,
            errors = self.errors,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "worker_finished",
            span_name = name,
            transform = self.transform_id,
            copy = self.copy_nr,
            status = self.status,
        )
    }
}

/// A worker hit a fatal error and is cancelling the run.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_hopwood::observability::messages::engine::WorkerFailed;
///
/// let msg = WorkerFailed {
///     transform_id: "parse",
///     copy_nr: 1,
///     error: "row set parse.1 -> sink is closed",
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct WorkerFailed<'a> {
    pub transform_id: &'a str,
    pub copy_nr: usize,
    pub error: &'a str,
}

impl Display for WorkerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' copy {} failed: {}",
            self.transform_id, self.copy_nr, self.error
        )
    }
}

impl StructuredLog for WorkerFailed<'_> {
    fn log(&self) {
        tracing::error!(
            transform = self.transform_id,
            copy = self.copy_nr,
            error = self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "worker_failed",
            span_name = name,
            transform = self.transform_id,
            copy = self.copy_nr,
            error = self.error,
        )
    }
}

/// A worker did not report within the shutdown timeout and was abandoned.
///
/// # Log Level
/// `warn!` - The thread is left running detached
pub struct WorkerShutdownTimedOut<'a> {
    pub transform_id: &'a str,
    pub copy_nr: usize,
    pub timeout: Duration,
}

impl Display for WorkerShutdownTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' copy {} did not stop within {:?}, marking it stopped",
            self.transform_id, self.copy_nr, self.timeout
        )
    }
}

impl StructuredLog for WorkerShutdownTimedOut<'_> {
    fn log(&self) {
        tracing::warn!(
            transform = self.transform_id,
            copy = self.copy_nr,
            timeout_ms = self.timeout.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "worker_shutdown_timeout",
            span_name = name,
            transform = self.transform_id,
            copy = self.copy_nr,
            timeout = ?self.timeout,
        )
    }
}

/// `init` returned an error; the run is aborted before any thread starts.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct TransformInitFailed<'a> {
    pub transform_id: &'a str,
    pub copy_nr: usize,
    pub error: &'a str,
}

impl Display for TransformInitFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transform '{}' copy {} failed to initialize: {}",
            self.transform_id, self.copy_nr, self.error
        )
    }
}

impl StructuredLog for TransformInitFailed<'_> {
    fn log(&self) {
        tracing::error!(
            transform = self.transform_id,
            copy = self.copy_nr,
            error = self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "transform_init_failed",
            span_name = name,
            transform = self.transform_id,
            copy = self.copy_nr,
        )
    }
}

/// A lifecycle hook returned an error.
///
/// # Log Level
/// `error!` - Before start this aborts the run; afterwards it is only reported
pub struct HookFailed<'a> {
    pub pipeline: &'a str,
    pub hook: &'a str,
    pub error: &'a str,
}

impl Display for HookFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Lifecycle hook {} failed for pipeline '{}': {}",
            self.hook, self.pipeline, self.error
        )
    }
}

impl StructuredLog for HookFailed<'_> {
    fn log(&self) {
        tracing::error!(
            pipeline = self.pipeline,
            hook = self.hook,
            error = self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "hook_failed",
            span_name = name,
            pipeline = self.pipeline,
            hook = self.hook,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_finished_display() {
        let msg = WorkerFinished {
            transform_id: "double",
            copy_nr: 2,
            status: "Done",
            lines_read: 10,
            lines_written: 10,
            errors: 0,
        };
        assert_eq!(
            msg.to_string(),
            "Worker 'double' copy 2 finished with status Done: read=10, written=10, errors=0"
        );
    }

    #[test]
    fn test_shutdown_timeout_display() {
        let msg = WorkerShutdownTimedOut {
            transform_id: "slow",
            copy_nr: 0,
            timeout: Duration::from_millis(100),
        };
        assert_eq!(
            msg.to_string(),
            "Worker 'slow' copy 0 did not stop within 100ms, marking it stopped"
        );
    }
}
