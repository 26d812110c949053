// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors crossing the transform plugin boundary.

use thiserror::Error;

/// Failures of a [`RowSet`](crate::rowset::RowSet) operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowSetError {
    /// The row set was marked done, no further rows are accepted.
    #[error("row set {0} is closed")]
    Closed(String),

    /// The run was cancelled while the producer was waiting for capacity.
    #[error("run stopped while writing to row set {0}")]
    Stopped(String),
}

/// Failures of an [`ErrorRouter`](crate::engine::ErrorRouter) diversion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("maximum number of diverted errors ({max_errors}) exceeded: {error_count} errors")]
    ErrorCeilingExceeded { max_errors: u64, error_count: u64 },

    #[error(transparent)]
    RowSet(#[from] RowSetError),
}

/// Error returned by a transform plugin.
///
/// Only [`TransformError::Row`] is eligible for error diversion; every other
/// variant is fatal for the worker that raised it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Processing of the current input row failed.
    #[error("{message}")]
    Row {
        message: String,
        field_name: Option<String>,
        error_code: Option<String>,
    },

    /// The transform cannot continue at all.
    #[error("{0}")]
    Fatal(String),

    /// A row did not match the layout it was written with.
    #[error("row with {row_len} values does not match layout of {meta_len} fields")]
    RowLayoutMismatch { row_len: usize, meta_len: usize },

    /// A targeted write named a transform that isn't an output of this one.
    #[error("'{0}' is not an output of this transform")]
    UnknownTarget(String),

    #[error(transparent)]
    RowSet(#[from] RowSetError),

    #[error(transparent)]
    Route(#[from] RouteError),
}

impl TransformError {
    /// A diverting row error with only a message.
    pub fn row(message: impl Into<String>) -> Self {
        TransformError::Row {
            message: message.into(),
            field_name: None,
            error_code: None,
        }
    }

    /// A diverting row error naming the failing field and an error code.
    pub fn row_field(
        message: impl Into<String>,
        field_name: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        TransformError::Row {
            message: message.into(),
            field_name: Some(field_name.into()),
            error_code: Some(error_code.into()),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        TransformError::Fatal(message.into())
    }

    /// Whether this error is the run being cancelled rather than a failure.
    pub fn is_stop(&self) -> bool {
        matches!(
            self,
            TransformError::RowSet(RowSetError::Stopped(_))
                | TransformError::Route(RouteError::RowSet(RowSetError::Stopped(_)))
        )
    }
}
