// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::TransformConfig;
use crate::engine::TransformContext;
use crate::errors::TransformError;
use crate::row::{Value, ValueType};
use crate::traits::Transform;

use super::{next_row, parse_options, FieldLayout};

pub const MULTIPLY_NOT_NUMERIC: &str = "MULTIPLY001";
pub const MULTIPLY_OVERFLOW: &str = "MULTIPLY002";

/// Configuration for the Multiply transform
#[derive(Debug, Clone, Deserialize)]
pub struct MultiplyConfig {
    pub field: String,
    pub factor: f64,
}

/// Multiply transform - multiplies a numeric field by a constant factor
///
/// Integer fields stay integers when the factor is a whole number; otherwise
/// the field becomes a number. Nulls pass through. Anything else is a row
/// error with code `MULTIPLY001`.
pub struct MultiplyTransform {
    factor: f64,
    layout: FieldLayout,
}

impl MultiplyTransform {
    pub fn new(config: MultiplyConfig) -> Result<Self, String> {
        if !config.factor.is_finite() {
            return Err(format!("factor {} is not a finite number", config.factor));
        }
        Ok(Self {
            factor: config.factor,
            layout: FieldLayout::new(config.field),
        })
    }

    pub fn from_config(config: &TransformConfig) -> Result<Self, String> {
        Self::new(parse_options(config)?)
    }

    fn integral_factor(&self) -> Option<i64> {
        (self.factor.fract() == 0.0 && self.factor.abs() < i64::MAX as f64).then_some(self.factor as i64)
    }

    fn multiply(&self, value: &Value, output_type: ValueType) -> Result<Value, TransformError> {
        let field = self.layout.field();
        match (value, output_type, self.integral_factor()) {
            (Value::Null, _, _) => Ok(Value::Null),
            (Value::Integer(i), ValueType::Integer, Some(factor)) => {
                i.checked_mul(factor).map(Value::Integer).ok_or_else(|| {
                    TransformError::row_field(
                        format!("{} * {} overflows field '{}'", i, factor, field),
                        field,
                        MULTIPLY_OVERFLOW,
                    )
                })
            }
            _ => value
                .as_number()
                .map(|n| Value::Number(n * self.factor))
                .ok_or_else(|| {
                    TransformError::row_field(
                        format!("value '{}' of field '{}' is not numeric", value, field),
                        field,
                        MULTIPLY_NOT_NUMERIC,
                    )
                }),
        }
    }
}

impl Transform for MultiplyTransform {
    fn name(&self) -> &str {
        "multiply"
    }

    fn process_row(&mut self, ctx: &mut TransformContext) -> Result<bool, TransformError> {
        let Some((meta, mut row)) = next_row(ctx) else {
            return Ok(false);
        };

        let keeps_integers = self.integral_factor().is_some();
        let (index, output_meta) = self.layout.resolve(&meta, |input| match input {
            ValueType::Integer if keeps_integers => ValueType::Integer,
            _ => ValueType::Number,
        })?;
        let output_type = output_meta
            .field(index)
            .map(|f| f.value_type)
            .unwrap_or(ValueType::Number);

        let value = row.get(index).cloned().unwrap_or(Value::Null);
        row.set(index, self.multiply(&value, output_type)?);

        ctx.put_row(&output_meta, row)?;
        Ok(true)
    }
}
