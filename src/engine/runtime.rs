// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::engine::status::{ExecutionStatus, TransformSummary};
use crate::engine::TransformContext;
use crate::errors::TransformError;
use crate::observability::messages::engine::{WorkerFailed, WorkerFinished, WorkerStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::{RowListener, Transform};
use std::sync::Arc;

/// How the processing loop ended.
enum Outcome {
    Done,
    Stopped,
    Errored(String),
}

/// Drives one (transform, copy) pair on its own thread.
///
/// State machine: `Init -> Running -> {Done | Stopped | Errored}`. Whatever
/// the outcome, every output and error row set is marked done and the
/// transform is disposed before [`run`](Self::run) returns.
pub struct TransformRuntime {
    transform: Box<dyn Transform>,
    ctx: TransformContext,
    status: ExecutionStatus,
}

impl TransformRuntime {
    pub(crate) fn new(transform: Box<dyn Transform>, ctx: TransformContext) -> Self {
        Self {
            transform,
            ctx,
            status: ExecutionStatus::Init,
        }
    }

    pub fn transform_id(&self) -> &str {
        self.ctx.transform_id()
    }

    pub fn copy_nr(&self) -> usize {
        self.ctx.copy_nr()
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub(crate) fn init(&mut self) -> Result<(), TransformError> {
        let transform = &mut self.transform;
        let ctx = &mut self.ctx;
        match panic::catch_unwind(AssertUnwindSafe(|| transform.init(ctx))) {
            Ok(result) => result,
            Err(payload) => Err(TransformError::Fatal(panic_message(payload.as_ref()))),
        }
    }

    pub(crate) fn add_listener(&mut self, listener: Arc<dyn RowListener>) {
        self.ctx.add_listener(listener);
    }

    /// Dispose without running, for runs aborted before start.
    pub(crate) fn abandon(mut self) {
        self.ctx.close_outputs();
        self.dispose();
    }

    /// Run the processing loop to completion.
    pub fn run(mut self) -> TransformSummary {
        let started = WorkerStarted {
            pipeline: self.ctx.pipeline_name(),
            transform_id: self.ctx.transform_id(),
            copy_nr: self.ctx.copy_nr(),
        };
        let span = started.span("worker");
        let _guard = span.enter();
        started.log();

        self.status = ExecutionStatus::Running;
        let outcome = self.process_rows();

        let error = match outcome {
            Outcome::Done => {
                self.status = ExecutionStatus::Done;
                None
            }
            Outcome::Stopped => {
                self.status = ExecutionStatus::Stopped;
                None
            }
            Outcome::Errored(message) => {
                self.status = ExecutionStatus::Errored;
                WorkerFailed {
                    transform_id: self.ctx.transform_id(),
                    copy_nr: self.ctx.copy_nr(),
                    error: &message,
                }
                .log();
                self.ctx.stop_all();
                Some(message)
            }
        };

        self.ctx.close_outputs();
        self.dispose();

        let counters = *self.ctx.counters();
        WorkerFinished {
            transform_id: self.ctx.transform_id(),
            copy_nr: self.ctx.copy_nr(),
            status: &self.status.to_string(),
            lines_read: counters.lines_read,
            lines_written: counters.lines_written,
            errors: counters.errors,
        }
        .log();

        TransformSummary {
            transform_id: self.ctx.transform_id().to_string(),
            copy_nr: self.ctx.copy_nr(),
            status: self.status,
            counters,
            error,
        }
    }

    fn process_rows(&mut self) -> Outcome {
        loop {
            if self.ctx.is_stopped() {
                return Outcome::Stopped;
            }

            // a row error only diverts a row read by this very call
            self.ctx.clear_current_row();
            let transform = &mut self.transform;
            let ctx = &mut self.ctx;
            let result = panic::catch_unwind(AssertUnwindSafe(|| transform.process_row(ctx)));

            match result {
                Ok(Ok(true)) => continue,
                Ok(Ok(false)) if self.ctx.is_stopped() => return Outcome::Stopped,
                Ok(Ok(false)) => return Outcome::Done,
                Ok(Err(e)) if e.is_stop() => return Outcome::Stopped,
                Ok(Err(TransformError::Row {
                    message,
                    field_name,
                    error_code,
                })) if self.ctx.has_error_handling() => {
                    match self.ctx.divert_current_row(
                        &message,
                        field_name.as_deref(),
                        error_code.as_deref(),
                    ) {
                        Ok(()) => continue,
                        Err(e) if e.is_stop() => return Outcome::Stopped,
                        Err(e) => return Outcome::Errored(format!("{}: {}", message, e)),
                    }
                }
                Ok(Err(e)) => return Outcome::Errored(e.to_string()),
                Err(payload) => {
                    return Outcome::Errored(format!(
                        "transform panicked: {}",
                        panic_message(payload.as_ref())
                    ))
                }
            }
        }
    }

    fn dispose(&mut self) {
        let transform = &mut self.transform;
        let ctx = &mut self.ctx;
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| transform.dispose(ctx))) {
            tracing::warn!(
                transform = self.ctx.transform_id(),
                copy = self.ctx.copy_nr(),
                "dispose panicked: {}",
                panic_message(payload.as_ref())
            );
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
