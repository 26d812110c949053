// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::{TransformError, TransformMapError, ValidationError};

/// Errors that abort a pipeline run before or while it starts.
///
/// Failures that happen once workers are running never surface here; they
/// are reported through the run's [`PipelineResult`](crate::engine::PipelineResult).
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("pipeline graph is invalid: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    InvalidGraph(Vec<ValidationError>),

    #[error(transparent)]
    TransformResolution(#[from] TransformMapError),

    #[error("transform '{transform_id}' copy {copy_nr} failed to initialize: {source}")]
    TransformInitFailed {
        transform_id: String,
        copy_nr: usize,
        #[source]
        source: TransformError,
    },

    #[error("lifecycle hook {hook} aborted the run: {message}")]
    HookFailed { hook: String, message: String },

    #[error("transform '{0}' is not an injection point")]
    NotAnInjectionPoint(String),

    #[error("transform '{0}' does not exist")]
    TransformNotFound(String),

    #[error("pipeline run was already prepared or started")]
    AlreadyStarted,

    #[error("pipeline run has not been prepared")]
    NotPrepared,

    #[error("pipeline run has not been started")]
    NotStarted,

    #[error("failed to spawn worker thread for '{transform_id}' copy {copy_nr}: {source}")]
    SpawnFailed {
        transform_id: String,
        copy_nr: usize,
        #[source]
        source: std::io::Error,
    },
}
