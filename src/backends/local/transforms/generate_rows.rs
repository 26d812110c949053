// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::sync::Arc;

use crate::config::TransformConfig;
use crate::engine::TransformContext;
use crate::errors::TransformError;
use crate::row::{Row, RowMeta, Value, ValueMeta, ValueType};
use crate::traits::Transform;

use super::parse_options;

/// Configuration for the Generate Rows transform
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRowsConfig {
    /// Name of the single output field
    pub field: String,
    /// Field type; inferred from the first value when omitted
    #[serde(rename = "type", default)]
    pub value_type: Option<ValueType>,
    pub values: Vec<serde_yaml::Value>,
    /// How many times the value list is emitted
    #[serde(default = "default_count")]
    pub count: u64,
}

fn infer_type(value: Option<&serde_yaml::Value>) -> ValueType {
    match value {
        Some(serde_yaml::Value::Bool(_)) => ValueType::Boolean,
        Some(serde_yaml::Value::Number(n)) if n.is_i64() => ValueType::Integer,
        Some(serde_yaml::Value::Number(_)) => ValueType::Number,
        _ => ValueType::String,
    }
}

fn default_count() -> u64 {
    1
}

/// Generate Rows transform - emits a fixed list of values as one-field rows
///
/// Source transform: it reads no input. Every copy emits the full list.
pub struct GenerateRowsTransform {
    meta: Arc<RowMeta>,
    values: Vec<Value>,
    total: u64,
    emitted: u64,
}

impl GenerateRowsTransform {
    pub fn new(config: GenerateRowsConfig) -> Result<Self, String> {
        let value_type = config
            .value_type
            .unwrap_or_else(|| infer_type(config.values.first()));
        let values = config
            .values
            .iter()
            .map(|v| {
                Value::from_yaml(v, value_type)
                    .ok_or_else(|| format!("value {:?} is not a valid {}", v, value_type))
            })
            .collect::<Result<Vec<Value>, String>>()?;
        let total = (values.len() as u64)
            .checked_mul(config.count)
            .ok_or_else(|| {
                format!("{} values repeated {} times is too many rows", values.len(), config.count)
            })?;

        Ok(Self {
            meta: Arc::new(RowMeta::new(vec![ValueMeta::new(
                config.field,
                value_type,
            )])),
            total,
            values,
            emitted: 0,
        })
    }

    pub fn from_config(config: &TransformConfig) -> Result<Self, String> {
        Self::new(parse_options(config)?)
    }
}

impl Transform for GenerateRowsTransform {
    fn name(&self) -> &str {
        "generate_rows"
    }

    fn process_row(&mut self, ctx: &mut TransformContext) -> Result<bool, TransformError> {
        if self.emitted >= self.total {
            return Ok(false);
        }

        let value = self.values[(self.emitted % self.values.len() as u64) as usize].clone();
        ctx.put_row(&self.meta, Row::new(vec![value]))?;
        self.emitted += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::transforms::test_support::Harness;

    fn config(values: Vec<serde_yaml::Value>, value_type: &str, count: u64) -> TransformConfig {
        TransformConfig::new("gen", "generate_rows")
            .with_option("field", "n")
            .with_option("type", value_type)
            .with_option("values", values)
            .with_option("count", count)
    }

    #[test]
    fn test_generates_values_in_order() {
        let cfg = config(vec![1.into(), 2.into(), 3.into()], "integer", 2);
        let mut transform = GenerateRowsTransform::from_config(&cfg).unwrap();
        let mut harness = Harness::new(cfg, Arc::new(RowMeta::default()), vec![], &["next"]);

        harness.run(&mut transform).unwrap();

        let out: Vec<Value> = harness
            .output(0)
            .into_iter()
            .map(|(_, r)| r.get(0).cloned().unwrap())
            .collect();
        assert_eq!(
            out,
            [1, 2, 3, 1, 2, 3].map(Value::Integer).to_vec()
        );
    }

    #[test]
    fn test_output_layout() {
        let cfg = config(vec!["x".into()], "string", 1);
        let mut transform = GenerateRowsTransform::from_config(&cfg).unwrap();
        let mut harness = Harness::new(cfg, Arc::new(RowMeta::default()), vec![], &["next"]);

        harness.run(&mut transform).unwrap();

        let (meta, row) = harness.output(0).remove(0);
        assert_eq!(meta.field_names(), vec!["n"]);
        assert!(row.conforms_to(&meta));
    }

    #[test]
    fn test_infers_type_from_first_value() {
        let test_cases: Vec<(Vec<serde_yaml::Value>, ValueType)> = vec![
            (vec![1.into(), 2.into()], ValueType::Integer),
            (vec![1.5.into()], ValueType::Number),
            (vec![true.into()], ValueType::Boolean),
            (vec!["a".into()], ValueType::String),
            (vec![], ValueType::String),
        ];

        for (values, expected) in test_cases {
            let cfg = TransformConfig::new("gen", "generate_rows")
                .with_option("field", "n")
                .with_option("values", values);
            let transform = GenerateRowsTransform::from_config(&cfg).unwrap();
            assert_eq!(transform.meta.fields()[0].value_type, expected);
        }
    }

    #[test]
    fn test_rejects_values_of_wrong_type() {
        let cfg = config(vec!["abc".into()], "integer", 1);
        assert!(GenerateRowsTransform::from_config(&cfg).is_err());
    }

    #[test]
    fn test_rejects_row_count_overflow() {
        let cfg = config(vec![1.into(), 2.into()], "integer", u64::MAX);
        let err = GenerateRowsTransform::from_config(&cfg).err().unwrap();
        assert!(err.contains("too many rows"), "{}", err);
    }

    #[test]
    fn test_requires_field() {
        let cfg = TransformConfig::new("gen", "generate_rows").with_option("values", vec![1]);
        assert!(GenerateRowsTransform::from_config(&cfg).is_err());
    }

    #[test]
    fn test_empty_values_emit_nothing() {
        let cfg = config(vec![], "integer", 5);
        let mut transform = GenerateRowsTransform::from_config(&cfg).unwrap();
        let mut harness = Harness::new(cfg, Arc::new(RowMeta::default()), vec![], &["next"]);

        harness.run(&mut transform).unwrap();
        assert!(harness.output(0).is_empty());
    }
}
