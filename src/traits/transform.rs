// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::TransformContext;
use crate::errors::TransformError;

/// A step of the pipeline, driven row by row by its own worker thread.
///
/// Each copy of a transform gets its own instance and its own
/// [`TransformContext`]. `init` runs on the orchestrator's thread before any
/// worker starts; `process_row` and `dispose` run on the worker thread.
pub trait Transform: Send {
    fn name(&self) -> &str;

    /// Prepare resources. An error aborts the run before any row flows.
    fn init(&mut self, _ctx: &mut TransformContext) -> Result<(), TransformError> {
        Ok(())
    }

    /// Handle one unit of work, usually one input row.
    ///
    /// Return `Ok(false)` once there is nothing left to do. A
    /// [`TransformError::Row`] is diverted when the transform has error
    /// handling configured; every other error stops the run.
    fn process_row(&mut self, ctx: &mut TransformContext) -> Result<bool, TransformError>;

    /// Release resources. Called exactly once on every exit path.
    fn dispose(&mut self, _ctx: &mut TransformContext) {}
}
