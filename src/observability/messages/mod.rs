// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit the same event with structured fields at the
//! level that suits it.
//!
//! # Organization
//!
//! * `engine` - Pipeline preparation, worker threads, shutdown
//! * `transform` - Row diversion and per-row diagnostics
//! * `validation` - Configuration validation errors
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_hopwood::observability::messages::engine::PipelineStarted;
//! use the_hopwood::observability::messages::StructuredLog;
//!
//! let msg = PipelineStarted {
//!     pipeline: "orders",
//!     worker_count: 5,
//! };
//!
//! msg.log();
//! let _span = msg.span("start").entered();
//! ```

use tracing::Span;

pub mod engine;
pub mod transform;
pub mod validation;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: std::fmt::Display {
    /// Emit the message as a tracing event.
    fn log(&self);

    /// A span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
