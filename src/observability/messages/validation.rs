// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration validation errors.
//!
//! This module contains message types for logging events related to:
//! * Hop graph validation
//! * Cyclic hop detection
//! * Unresolved hop and error target references
//! * Duplicate transform ID detection

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Cyclic hop detected in configuration.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_hopwood::observability::messages::validation::CyclicHopDetected;
///
/// let cycle = vec!["a", "b", "c", "a"];
/// let msg = CyclicHopDetected {
///     cycle: &cycle,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct CyclicHopDetected<'a> {
    pub cycle: &'a [&'a str],
}

impl Display for CyclicHopDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic hop detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CyclicHopDetected<'_> {
    fn log(&self) {
        tracing::error!(
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
        )
    }
}

/// A hop or error target references a transform that does not exist.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnresolvedReferenceDetected<'a> {
    pub referenced_by: &'a str,
    pub missing: &'a str,
}

impl Display for UnresolvedReferenceDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transform '{}' references unknown transform '{}'",
            self.referenced_by, self.missing
        )
    }
}

impl StructuredLog for UnresolvedReferenceDetected<'_> {
    fn log(&self) {
        tracing::error!(
            referenced_by = self.referenced_by,
            missing = self.missing,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            referenced_by = self.referenced_by,
            missing = self.missing,
        )
    }
}

/// The same transform ID is declared more than once.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DuplicateTransformIdDetected<'a> {
    pub transform_id: &'a str,
}

impl Display for DuplicateTransformIdDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Duplicate transform ID detected: '{}'", self.transform_id)
    }
}

impl StructuredLog for DuplicateTransformIdDetected<'_> {
    fn log(&self) {
        tracing::error!(transform_id = self.transform_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            transform_id = self.transform_id,
        )
    }
}

/// Validation finished with errors; the pipeline will not be built.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct PipelineValidationFailed<'a> {
    pub pipeline: &'a str,
    pub error_count: usize,
}

impl Display for PipelineValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline '{}' failed validation with {} error(s)",
            self.pipeline, self.error_count
        )
    }
}

impl StructuredLog for PipelineValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            pipeline = self.pipeline,
            error_count = self.error_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            pipeline = self.pipeline,
            error_count = self.error_count,
        )
    }
}
