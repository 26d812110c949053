// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{DataMovement, TransformConfig};
use crate::engine::status::TransformCounters;
use crate::engine::ErrorRouter;
use crate::errors::TransformError;
use crate::observability::messages::engine::StopRequested;
use crate::observability::messages::transform::RowDiverted;
use crate::observability::messages::StructuredLog;
use crate::row::{Row, RowMeta};
use crate::rowset::{RowSet, RowSetPoll, StopSignal};
use crate::traits::RowListener;

/// State shared by every worker of one run.
///
/// Workers hold this through an `Arc`; they never see the orchestrator.
#[derive(Debug)]
pub struct RunContext {
    pipeline_name: String,
    stop: StopSignal,
    variables: HashMap<String, String>,
    poll_interval: Duration,
}

impl RunContext {
    pub fn new(
        pipeline_name: impl Into<String>,
        variables: HashMap<String, String>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            stop: StopSignal::new(),
            variables,
            poll_interval,
        }
    }

    /// Share an existing stop signal instead of the fresh one.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn pipeline_name(&self) -> &str {
        &self.pipeline_name
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_requested()
    }

    /// Raise the stop signal. Returns whether this call was the one that raised it.
    pub fn request_stop(&self, requested_by: &str) -> bool {
        let first = self.stop.request();
        if first {
            StopRequested {
                pipeline: &self.pipeline_name,
                requested_by,
            }
            .log();
        }
        first
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

/// One output hop of a worker.
#[derive(Debug, Clone)]
pub(crate) struct OutputHop {
    pub target: String,
    pub rowset: Arc<RowSet>,
}

/// The row sets one worker reads from and writes to.
#[derive(Debug, Default)]
pub(crate) struct CopyWiring {
    pub inputs: Vec<Arc<RowSet>>,
    pub outputs: Vec<OutputHop>,
    pub error_rowset: Option<Arc<RowSet>>,
    // shared by every copy of the transform
    pub error_count: Option<Arc<AtomicU64>>,
}

/// Everything a transform copy can do to the outside world.
///
/// Owned by the worker thread, so none of the methods need locking beyond
/// what the row sets do internally.
pub struct TransformContext {
    run: Arc<RunContext>,
    config: Arc<TransformConfig>,
    copy_nr: usize,
    inputs: Vec<Arc<RowSet>>,
    next_input: usize,
    outputs: Vec<OutputHop>,
    next_output: usize,
    error_router: Option<ErrorRouter>,
    input_meta: Option<Arc<RowMeta>>,
    // only kept when rows can be diverted
    current_row: Option<Row>,
    listeners: Vec<Arc<dyn RowListener>>,
    counters: TransformCounters,
}

impl TransformContext {
    pub(crate) fn new(
        run: Arc<RunContext>,
        config: Arc<TransformConfig>,
        copy_nr: usize,
        wiring: CopyWiring,
    ) -> Self {
        let error_router = match (&config.error_handling, wiring.error_rowset) {
            (Some(handling), Some(rowset)) => {
                let router = ErrorRouter::new(config.id.clone(), handling.clone(), rowset);
                Some(match wiring.error_count {
                    Some(count) => router.with_shared_count(count),
                    None => router,
                })
            }
            _ => None,
        };

        Self {
            run,
            config,
            copy_nr,
            inputs: wiring.inputs,
            next_input: 0,
            outputs: wiring.outputs,
            next_output: 0,
            error_router,
            input_meta: None,
            current_row: None,
            listeners: Vec::new(),
            counters: TransformCounters::default(),
        }
    }

    pub fn transform_id(&self) -> &str {
        &self.config.id
    }

    pub fn copy_nr(&self) -> usize {
        self.copy_nr
    }

    pub fn pipeline_name(&self) -> &str {
        self.run.pipeline_name()
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn option(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.config.option(key)
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.run.variable(name)
    }

    pub fn counters(&self) -> &TransformCounters {
        &self.counters
    }

    /// Layout of the rows read from the inputs, known once a row was read.
    pub fn input_row_meta(&self) -> Option<&Arc<RowMeta>> {
        self.input_meta.as_ref()
    }

    /// IDs of the transforms this copy writes to, in hop order.
    pub fn output_targets(&self) -> Vec<&str> {
        self.outputs.iter().map(|o| o.target.as_str()).collect()
    }

    pub fn has_error_handling(&self) -> bool {
        self.error_router.is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.run.is_stopped()
    }

    /// Cancel the whole run.
    pub fn stop_all(&self) {
        self.run
            .request_stop(&format!("{}.{}", self.config.id, self.copy_nr));
    }

    /// Next row from any input, or `None` once every input is drained and
    /// done, or the run is stopped.
    ///
    /// Inputs are visited round-robin so a busy hop cannot starve the others.
    pub fn get_row(&mut self) -> Option<Row> {
        let row = self.next_row();
        if row.is_none() {
            self.current_row = None;
        }
        row
    }

    fn next_row(&mut self) -> Option<Row> {
        loop {
            if self.run.is_stopped() {
                return None;
            }

            // one non-blocking pass over every input
            let mut remaining = self.inputs.len();
            while remaining > 0 && !self.inputs.is_empty() {
                remaining -= 1;
                let index = self.next_input % self.inputs.len();
                match self.inputs[index].get_row_immediate() {
                    RowSetPoll::Row(meta, row) => {
                        self.next_input = index + 1;
                        return Some(self.accept(meta, row));
                    }
                    RowSetPoll::Done => {
                        self.inputs.remove(index);
                        self.next_input = index;
                    }
                    RowSetPoll::Empty => self.next_input = index + 1,
                }
            }

            if self.inputs.is_empty() {
                return None;
            }

            // all inputs empty: wait on one of them for a poll interval
            let index = self.next_input % self.inputs.len();
            match self.inputs[index].get_row_wait(self.run.poll_interval()) {
                RowSetPoll::Row(meta, row) => {
                    self.next_input = index + 1;
                    return Some(self.accept(meta, row));
                }
                RowSetPoll::Done => {
                    self.inputs.remove(index);
                    self.next_input = index;
                }
                RowSetPoll::Empty => self.next_input = index + 1,
            }
        }
    }

    fn accept(&mut self, meta: Arc<RowMeta>, row: Row) -> Row {
        self.counters.lines_read += 1;
        for listener in &self.listeners {
            listener.row_read(&meta, &row);
        }
        if self.error_router.is_some() {
            self.current_row = Some(row.clone());
        }
        self.input_meta = Some(meta);
        row
    }

    /// Write a row to the outputs according to the transform's data movement.
    ///
    /// A transform without output hops only counts the row.
    pub fn put_row(&mut self, meta: &Arc<RowMeta>, row: Row) -> Result<(), TransformError> {
        check_layout(meta, &row)?;
        let written = self.for_listeners(&row);

        if !self.outputs.is_empty() {
            match self.config.data_movement {
                DataMovement::Copy => {
                    let (last, rest) = self
                        .outputs
                        .split_last()
                        .ok_or_else(|| TransformError::fatal("no outputs"))?;
                    for output in rest {
                        output.rowset.put_row(Arc::clone(meta), row.clone())?;
                    }
                    last.rowset.put_row(Arc::clone(meta), row)?;
                }
                DataMovement::Distribute => {
                    let index = self.next_output % self.outputs.len();
                    self.next_output = index + 1;
                    self.outputs[index].rowset.put_row(Arc::clone(meta), row)?;
                }
            }
        }

        if let Some(row) = written {
            for listener in &self.listeners {
                listener.row_written(meta, &row);
            }
        }
        self.counters.lines_written += 1;
        Ok(())
    }

    /// Write a row to the output hop leading to `target` only.
    pub fn put_row_to(
        &mut self,
        target: &str,
        meta: &Arc<RowMeta>,
        row: Row,
    ) -> Result<(), TransformError> {
        check_layout(meta, &row)?;
        let output = self
            .outputs
            .iter()
            .find(|o| o.target == target)
            .ok_or_else(|| TransformError::UnknownTarget(target.to_string()))?;

        let written = self.for_listeners(&row);
        output.rowset.put_row(Arc::clone(meta), row)?;
        if let Some(row) = written {
            for listener in &self.listeners {
                listener.row_written(meta, &row);
            }
        }
        self.counters.lines_written += 1;
        Ok(())
    }

    /// Send a row to the error stream with its diagnostics.
    ///
    /// Without error handling configured the failure comes back as a
    /// [`TransformError::Row`], which the runtime treats as fatal.
    pub fn put_error(
        &mut self,
        meta: &Arc<RowMeta>,
        row: Row,
        nr_errors: u64,
        description: &str,
        field_names: Option<&str>,
        error_codes: Option<&str>,
    ) -> Result<(), TransformError> {
        let Some(router) = self.error_router.as_mut() else {
            return Err(TransformError::Row {
                message: description.to_string(),
                field_name: field_names.map(str::to_string),
                error_code: error_codes.map(str::to_string),
            });
        };

        let (error_meta, error_row) =
            router.divert(meta, row, nr_errors, description, field_names, error_codes)?;
        let written = (!self.listeners.is_empty()).then(|| error_row.clone());
        router.send(Arc::clone(&error_meta), error_row)?;
        if let Some(error_row) = written {
            for listener in &self.listeners {
                listener.error_row_written(&error_meta, &error_row);
            }
        }

        self.counters.errors += nr_errors.max(1);
        self.counters.lines_rejected += 1;
        RowDiverted {
            transform_id: &self.config.id,
            target: router.target(),
            error_count: router.error_count(),
            description,
        }
        .log();
        Ok(())
    }

    /// Divert the row most recently read after `process_row` failed on it.
    pub(crate) fn divert_current_row(
        &mut self,
        message: &str,
        field_name: Option<&str>,
        error_code: Option<&str>,
    ) -> Result<(), TransformError> {
        let (Some(meta), Some(row)) = (self.input_meta.clone(), self.current_row.take()) else {
            return Err(TransformError::fatal(message));
        };
        self.put_error(&meta, row, 1, message, field_name, error_code)
    }

    /// Forget the row read by the previous `process_row` call.
    pub(crate) fn clear_current_row(&mut self) {
        self.current_row = None;
    }

    // copy kept for the listeners, which are told only once the row set took the row
    fn for_listeners(&self, row: &Row) -> Option<Row> {
        (!self.listeners.is_empty()).then(|| row.clone())
    }

    pub(crate) fn add_listener(&mut self, listener: Arc<dyn RowListener>) {
        self.listeners.push(listener);
    }

    /// Mark every output and the error stream done.
    pub(crate) fn close_outputs(&self) {
        for output in &self.outputs {
            output.rowset.set_done();
        }
        if let Some(router) = &self.error_router {
            router.close();
        }
    }
}

fn check_layout(meta: &RowMeta, row: &Row) -> Result<(), TransformError> {
    if row.len() != meta.size() {
        return Err(TransformError::RowLayoutMismatch {
            row_len: row.len(),
            meta_len: meta.size(),
        });
    }
    Ok(())
}
