// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::cmp::Ordering;

use crate::config::TransformConfig;
use crate::engine::TransformContext;
use crate::errors::TransformError;
use crate::row::{Value, ValueType};
use crate::traits::Transform;

use super::{next_row, parse_options};

/// Comparison applied by the Filter Rows transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    IsNull,
    NotNull,
}

/// Configuration for the Filter Rows transform
#[derive(Debug, Clone, Deserialize)]
pub struct FilterRowsConfig {
    pub field: String,
    pub op: FilterOperator,
    /// Constant compared against; not used by `is_null` / `not_null`
    #[serde(default)]
    pub value: Option<serde_yaml::Value>,
    /// Output hop receiving rows matching the condition
    #[serde(default)]
    pub send_true_to: Option<String>,
    /// Output hop receiving the other rows
    #[serde(default)]
    pub send_false_to: Option<String>,
}

/// Filter Rows transform - keeps or routes rows by comparing one field to a constant
///
/// Without `send_true_to` / `send_false_to`, matching rows go to every
/// output and the rest are dropped. With either set, rows are routed to the
/// named hop and rows for an unnamed branch are dropped. Comparisons against
/// null are false.
pub struct FilterRowsTransform {
    config: FilterRowsConfig,
    constant: Option<Value>,
}

impl FilterRowsTransform {
    pub fn new(config: FilterRowsConfig) -> Result<Self, String> {
        let needs_value = !matches!(config.op, FilterOperator::IsNull | FilterOperator::NotNull);
        let constant = match (&config.value, needs_value) {
            (Some(value), true) => Some(constant_from_yaml(value)?),
            (None, true) => {
                return Err(format!(
                    "operator {:?} on field '{}' needs a value",
                    config.op, config.field
                ))
            }
            (_, false) => None,
        };

        Ok(Self { config, constant })
    }

    pub fn from_config(config: &TransformConfig) -> Result<Self, String> {
        Self::new(parse_options(config)?)
    }

    fn matches(&self, value: &Value) -> bool {
        let ordering = || self.constant.as_ref().and_then(|c| compare(value, c));
        match self.config.op {
            FilterOperator::IsNull => value.is_null(),
            FilterOperator::NotNull => !value.is_null(),
            FilterOperator::Eq => ordering() == Some(Ordering::Equal),
            FilterOperator::Ne => matches!(ordering(), Some(o) if o != Ordering::Equal),
            FilterOperator::Gt => ordering() == Some(Ordering::Greater),
            FilterOperator::Lt => ordering() == Some(Ordering::Less),
            FilterOperator::Ge => matches!(ordering(), Some(Ordering::Greater | Ordering::Equal)),
            FilterOperator::Le => matches!(ordering(), Some(Ordering::Less | Ordering::Equal)),
        }
    }

    fn is_routing(&self) -> bool {
        self.config.send_true_to.is_some() || self.config.send_false_to.is_some()
    }
}

fn constant_from_yaml(value: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Number(n) if n.is_i64() => Value::from_yaml(value, ValueType::Integer),
        Yaml::Number(_) => Value::from_yaml(value, ValueType::Number),
        Yaml::String(_) => Value::from_yaml(value, ValueType::String),
        Yaml::Bool(_) => Value::from_yaml(value, ValueType::Boolean),
        _ => None,
    }
    .ok_or_else(|| format!("unsupported filter value {:?}", value))
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        _ => left.as_number()?.partial_cmp(&right.as_number()?),
    }
}

impl Transform for FilterRowsTransform {
    fn name(&self) -> &str {
        "filter_rows"
    }

    fn init(&mut self, ctx: &mut TransformContext) -> Result<(), TransformError> {
        let targets = ctx.output_targets();
        for target in [&self.config.send_true_to, &self.config.send_false_to]
            .into_iter()
            .flatten()
        {
            if !targets.contains(&target.as_str()) {
                return Err(TransformError::fatal(format!(
                    "'{}' is not an output hop of '{}'",
                    target,
                    ctx.transform_id()
                )));
            }
        }
        Ok(())
    }

    fn process_row(&mut self, ctx: &mut TransformContext) -> Result<bool, TransformError> {
        let Some((meta, row)) = next_row(ctx) else {
            return Ok(false);
        };

        let index = meta.index_of(&self.config.field).ok_or_else(|| {
            TransformError::fatal(format!(
                "field '{}' not found in input row {}",
                self.config.field, meta
            ))
        })?;
        let matched = row.get(index).map_or(false, |v| self.matches(v));

        if !self.is_routing() {
            if matched {
                ctx.put_row(&meta, row)?;
            }
            return Ok(true);
        }

        let target = if matched {
            &self.config.send_true_to
        } else {
            &self.config.send_false_to
        };
        if let Some(target) = target {
            ctx.put_row_to(target, &meta, row)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::transforms::test_support::Harness;
    use crate::row::{Row, RowMeta, ValueMeta};
    use std::sync::Arc;

    fn meta() -> Arc<RowMeta> {
        Arc::new(RowMeta::new(vec![
            ValueMeta::new("n", ValueType::Integer),
            ValueMeta::new("s", ValueType::String),
        ]))
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::new(vec![Value::Integer(1), Value::from("a")]),
            Row::new(vec![Value::Integer(5), Value::from("b")]),
            Row::new(vec![Value::Null, Value::Null]),
            Row::new(vec![Value::Integer(10), Value::from("c")]),
        ]
    }

    fn ns(rows: Vec<(Arc<RowMeta>, Row)>) -> Vec<Value> {
        rows.into_iter().map(|(_, r)| r.get(0).cloned().unwrap()).collect()
    }

    #[test]
    fn test_operators_table_driven() {
        struct TestCase {
            op: &'static str,
            field: &'static str,
            value: Option<serde_yaml::Value>,
            expected: Vec<Value>,
        }

        let test_cases = vec![
            TestCase { op: "eq", field: "n", value: Some(5.into()), expected: vec![Value::Integer(5)] },
            TestCase { op: "ne", field: "n", value: Some(5.into()), expected: vec![Value::Integer(1), Value::Integer(10)] },
            TestCase { op: "gt", field: "n", value: Some(4.5.into()), expected: vec![Value::Integer(5), Value::Integer(10)] },
            TestCase { op: "lt", field: "n", value: Some(5.into()), expected: vec![Value::Integer(1)] },
            TestCase { op: "ge", field: "n", value: Some(5.into()), expected: vec![Value::Integer(5), Value::Integer(10)] },
            TestCase { op: "le", field: "n", value: Some(5.into()), expected: vec![Value::Integer(1), Value::Integer(5)] },
            TestCase { op: "is_null", field: "n", value: None, expected: vec![Value::Null] },
            TestCase { op: "not_null", field: "n", value: None, expected: vec![Value::Integer(1), Value::Integer(5), Value::Integer(10)] },
            TestCase { op: "gt", field: "s", value: Some("a".into()), expected: vec![Value::Integer(5), Value::Integer(10)] },
        ];

        for test_case in test_cases {
            let mut cfg = TransformConfig::new("f", "filter_rows")
                .with_option("field", test_case.field)
                .with_option("op", test_case.op);
            if let Some(value) = test_case.value {
                cfg = cfg.with_option("value", value);
            }
            let mut transform = FilterRowsTransform::from_config(&cfg).unwrap();
            let mut harness = Harness::new(cfg, meta(), rows(), &["next"]);

            harness.run(&mut transform).unwrap();
            assert_eq!(ns(harness.output(0)), test_case.expected, "operator {}", test_case.op);
        }
    }

    #[test]
    fn test_routes_to_named_targets() {
        let cfg = TransformConfig::new("f", "filter_rows")
            .with_option("field", "n")
            .with_option("op", "ge")
            .with_option("value", 5)
            .with_option("send_true_to", "big")
            .with_option("send_false_to", "small");
        let mut transform = FilterRowsTransform::from_config(&cfg).unwrap();
        let mut harness = Harness::new(cfg, meta(), rows(), &["small", "big"]);

        harness.run(&mut transform).unwrap();

        assert_eq!(ns(harness.output(1)), vec![Value::Integer(5), Value::Integer(10)]);
        assert_eq!(ns(harness.output(0)), vec![Value::Integer(1), Value::Null]);
    }

    #[test]
    fn test_unknown_target_fails_init() {
        let cfg = TransformConfig::new("f", "filter_rows")
            .with_option("field", "n")
            .with_option("op", "is_null")
            .with_option("send_true_to", "nowhere");
        let mut transform = FilterRowsTransform::from_config(&cfg).unwrap();
        let mut harness = Harness::new(cfg, meta(), rows(), &["next"]);

        assert!(matches!(harness.run(&mut transform), Err(TransformError::Fatal(_))));
    }

    #[test]
    fn test_comparison_needs_value() {
        let cfg = TransformConfig::new("f", "filter_rows")
            .with_option("field", "n")
            .with_option("op", "eq");
        assert!(FilterRowsTransform::from_config(&cfg).is_err());
    }
}
