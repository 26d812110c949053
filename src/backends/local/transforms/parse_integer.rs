// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::TransformConfig;
use crate::engine::TransformContext;
use crate::errors::TransformError;
use crate::row::{Value, ValueType};
use crate::traits::Transform;

use super::{next_row, parse_options, FieldLayout};

pub const PARSE_INTEGER_INVALID: &str = "PARSE001";

/// Configuration for the Parse Integer transform
#[derive(Debug, Clone, Deserialize)]
pub struct ParseIntegerConfig {
    pub field: String,
}

/// Parse Integer transform - converts a string field into an integer
pub struct ParseIntegerTransform {
    layout: FieldLayout,
}

impl ParseIntegerTransform {
    pub fn new(config: ParseIntegerConfig) -> Self {
        Self {
            layout: FieldLayout::new(config.field),
        }
    }

    pub fn from_config(config: &TransformConfig) -> Result<Self, String> {
        Ok(Self::new(parse_options(config)?))
    }

    fn parse(&self, value: Value) -> Result<Value, TransformError> {
        let field = self.layout.field();
        match value {
            Value::Null | Value::Integer(_) => Ok(value),
            Value::String(ref s) => s.trim().parse::<i64>().map(Value::Integer).map_err(|_| {
                TransformError::row_field(
                    format!("value '{}' of field '{}' is not an integer", s, field),
                    field,
                    PARSE_INTEGER_INVALID,
                )
            }),
            other => Err(TransformError::row_field(
                format!("value '{}' of field '{}' is not a string", other, field),
                field,
                PARSE_INTEGER_INVALID,
            )),
        }
    }
}

impl Transform for ParseIntegerTransform {
    fn name(&self) -> &str {
        "parse_integer"
    }

    fn process_row(&mut self, ctx: &mut TransformContext) -> Result<bool, TransformError> {
        let Some((meta, mut row)) = next_row(ctx) else {
            return Ok(false);
        };

        let (index, output_meta) = self.layout.resolve(&meta, |_| ValueType::Integer)?;
        let value = row.get(index).cloned().unwrap_or(Value::Null);
        row.set(index, self.parse(value)?);

        ctx.put_row(&output_meta, row)?;
        Ok(true)
    }
}
