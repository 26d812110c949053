// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Lifecycle state of one (transform, copy) worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Init,
    Running,
    /// Upstream finished and every row was handled.
    Done,
    /// The run was cancelled before the worker finished on its own.
    Stopped,
    /// The worker hit a fatal error and cancelled the run.
    Errored,
}

impl Display for ExecutionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExecutionStatus::Init => "Init",
            ExecutionStatus::Running => "Running",
            ExecutionStatus::Done => "Done",
            ExecutionStatus::Stopped => "Stopped",
            ExecutionStatus::Errored => "Errored",
        };
        f.write_str(name)
    }
}

/// Aggregate state of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Running,
    /// Every worker is done and no row was diverted.
    Finished,
    /// Every worker is done but some rows went to error streams.
    FinishedWithErrors,
    /// The run was cancelled by a fatal error, `stop_all` or an external stop.
    Stopped,
}

impl Display for PipelineStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStatus::Running => "Running",
            PipelineStatus::Finished => "Finished",
            PipelineStatus::FinishedWithErrors => "FinishedWithErrors",
            PipelineStatus::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// Row counters of one worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformCounters {
    pub lines_read: u64,
    pub lines_written: u64,
    /// Rows that went to the error stream instead of the outputs.
    pub lines_rejected: u64,
    pub errors: u64,
}

/// Final report of one (transform, copy) worker.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSummary {
    pub transform_id: String,
    pub copy_nr: usize,
    pub status: ExecutionStatus,
    pub counters: TransformCounters,
    /// Message of the fatal error, for `Errored` workers.
    pub error: Option<String>,
}

impl TransformSummary {
    /// Report for a worker that never reported back.
    pub(crate) fn abandoned(transform_id: &str, copy_nr: usize) -> Self {
        Self {
            transform_id: transform_id.to_string(),
            copy_nr,
            status: ExecutionStatus::Stopped,
            counters: TransformCounters::default(),
            error: None,
        }
    }
}

/// Outcome of [`PipelineOrchestrator::wait`](crate::engine::PipelineOrchestrator::wait).
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub pipeline_name: String,
    pub status: PipelineStatus,
    /// One entry per (transform, copy), in declaration then copy order.
    pub transforms: Vec<TransformSummary>,
    pub duration: Duration,
}

impl PipelineResult {
    pub(crate) fn aggregate(
        pipeline_name: String,
        transforms: Vec<TransformSummary>,
        stop_requested: bool,
        duration: Duration,
    ) -> Self {
        let cancelled = stop_requested
            || transforms
                .iter()
                .any(|t| t.status != ExecutionStatus::Done);
        let diverted: u64 = transforms.iter().map(|t| t.counters.errors).sum();

        let status = if cancelled {
            PipelineStatus::Stopped
        } else if diverted > 0 {
            PipelineStatus::FinishedWithErrors
        } else {
            PipelineStatus::Finished
        };

        Self {
            pipeline_name,
            status,
            transforms,
            duration,
        }
    }

    pub fn summary(&self, transform_id: &str, copy_nr: usize) -> Option<&TransformSummary> {
        self.transforms
            .iter()
            .find(|t| t.transform_id == transform_id && t.copy_nr == copy_nr)
    }

    /// Counters of every copy of a transform, added up.
    pub fn totals(&self, transform_id: &str) -> TransformCounters {
        self.transforms
            .iter()
            .filter(|t| t.transform_id == transform_id)
            .fold(TransformCounters::default(), |acc, t| TransformCounters {
                lines_read: acc.lines_read + t.counters.lines_read,
                lines_written: acc.lines_written + t.counters.lines_written,
                lines_rejected: acc.lines_rejected + t.counters.lines_rejected,
                errors: acc.errors + t.counters.errors,
            })
    }

    pub fn diverted_rows(&self) -> u64 {
        self.transforms.iter().map(|t| t.counters.errors).sum()
    }

    /// Messages of every worker that failed.
    pub fn errors(&self) -> Vec<(&str, usize, &str)> {
        self.transforms
            .iter()
            .filter_map(|t| {
                t.error
                    .as_deref()
                    .map(|e| (t.transform_id.as_str(), t.copy_nr, e))
            })
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.status == PipelineStatus::Finished
    }
}
