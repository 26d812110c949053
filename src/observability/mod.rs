// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging throughout The Hopwood. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep field names identical between log lines of the same event
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - Pipeline and worker lifecycle events
//! * `messages::transform` - Per-row events raised inside a running transform
//! * `messages::validation` - Configuration validation errors
//!
//! # Usage
//!
//! ```rust
//! use the_hopwood::observability::messages::engine::WorkerFailed;
//! use the_hopwood::observability::messages::StructuredLog;
//!
//! let msg = WorkerFailed {
//!     transform_id: "parse",
//!     copy_nr: 0,
//!     error: "value 'abc' of field 'amount' is not an integer",
//! };
//!
//! msg.log();
//! ```

pub mod messages;
