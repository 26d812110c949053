// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::TransformContext;
use crate::errors::TransformError;
use crate::traits::Transform;

use super::next_row;

/// Dummy transform - passes every row through unchanged
pub struct DummyTransform;

impl DummyTransform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for DummyTransform {
    fn name(&self) -> &str {
        "dummy"
    }

    fn process_row(&mut self, ctx: &mut TransformContext) -> Result<bool, TransformError> {
        let Some((meta, row)) = next_row(ctx) else {
            return Ok(false);
        };
        ctx.put_row(&meta, row)?;
        Ok(true)
    }
}
