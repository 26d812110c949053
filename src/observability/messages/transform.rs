// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for events raised while a transform processes rows.
//!
//! This module contains message types for logging events related to:
//! * Rows diverted to an error stream
//! * Error ceilings being exceeded
//! * Rows written to the log by the `write_to_log` transform

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::{Level, Span};

/// A failing row was sent to the transform's error stream.
///
/// # Log Level
/// `debug!` - One event per diverted row
///
/// # Example
/// ```
/// use the_hopwood::observability::messages::transform::RowDiverted;
///
/// let msg = RowDiverted {
///     transform_id: "parse",
///     target: "rejects",
///     error_count: 3,
///     description: "value 'x' of field 'amount' is not an integer",
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct RowDiverted<'a> {
    pub transform_id: &'a str,
    pub target: &'a str,
    pub error_count: u64,
    pub description: &'a str,
}

impl Display for RowDiverted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Diverted row #{} from '{}' to '{}': {}",
            self.error_count, self.transform_id, self.target, self.description
        )
    }
}

impl StructuredLog for RowDiverted<'_> {
    fn log(&self) {
        tracing::debug!(
            transform = self.transform_id,
            target = self.target,
            error_count = self.error_count,
            description = self.description,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "row_diverted",
            span_name = name,
            transform = self.transform_id,
            target = self.target,
        )
    }
}

/// Diverting one more row would exceed `max_errors`.
///
/// # Log Level
/// `error!` - The worker escalates to a fatal error
pub struct ErrorCeilingReached<'a> {
    pub transform_id: &'a str,
    pub max_errors: u64,
}

impl Display for ErrorCeilingReached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transform '{}' exceeded its maximum of {} diverted errors",
            self.transform_id, self.max_errors
        )
    }
}

impl StructuredLog for ErrorCeilingReached<'_> {
    fn log(&self) {
        tracing::error!(
            transform = self.transform_id,
            max_errors = self.max_errors,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "error_ceiling",
            span_name = name,
            transform = self.transform_id,
            max_errors = self.max_errors,
        )
    }
}

/// A row rendered by the `write_to_log` transform.
///
/// The level is chosen by the transform's configuration, so `log()` dispatches
/// on it instead of using a fixed macro.
pub struct RowLogged<'a> {
    pub transform_id: &'a str,
    pub level: Level,
    pub row_number: u64,
    pub row: &'a str,
}

impl Display for RowLogged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "[{}] row {}: {}", self.transform_id, self.row_number, self.row)
    }
}

impl StructuredLog for RowLogged<'_> {
    fn log(&self) {
        match self.level {
            Level::ERROR => tracing::error!(transform = self.transform_id, row_number = self.row_number, "{}", self),
            Level::WARN => tracing::warn!(transform = self.transform_id, row_number = self.row_number, "{}", self),
            Level::INFO => tracing::info!(transform = self.transform_id, row_number = self.row_number, "{}", self),
            Level::DEBUG => tracing::debug!(transform = self.transform_id, row_number = self.row_number, "{}", self),
            _ => tracing::trace!(transform = self.transform_id, row_number = self.row_number, "{}", self),
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "row_logged",
            span_name = name,
            transform = self.transform_id,
            row_number = self.row_number,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_diverted_display() {
        let msg = RowDiverted {
            transform_id: "parse",
            target: "rejects",
            error_count: 1,
            description: "bad value",
        };
        assert_eq!(msg.to_string(), "Diverted row #1 from 'parse' to 'rejects': bad value");
    }

    #[test]
    fn test_row_logged_display() {
        let msg = RowLogged {
            transform_id: "log",
            level: Level::INFO,
            row_number: 7,
            row: "[1, abc]",
        };
        assert_eq!(msg.to_string(), "[log] row 7: [1, abc]");
    }
}
