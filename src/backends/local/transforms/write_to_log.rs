// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use tracing::Level;

use crate::config::TransformConfig;
use crate::engine::TransformContext;
use crate::errors::TransformError;
use crate::observability::messages::transform::RowLogged;
use crate::observability::messages::StructuredLog;
use crate::row::{Row, RowMeta};
use crate::traits::Transform;

use super::{next_row, parse_options};

/// Configuration for the Write To Log transform
#[derive(Debug, Clone, Deserialize)]
pub struct WriteToLogConfig {
    /// `error`, `warn`, `info`, `debug` or `trace`
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

/// Write To Log transform - logs every row and passes it through
pub struct WriteToLogTransform {
    level: Level,
    rows_logged: u64,
}

impl WriteToLogTransform {
    pub fn new(config: WriteToLogConfig) -> Result<Self, String> {
        let level = config
            .level
            .parse::<Level>()
            .map_err(|_| format!("unknown log level '{}'", config.level))?;
        Ok(Self {
            level,
            rows_logged: 0,
        })
    }

    pub fn from_config(config: &TransformConfig) -> Result<Self, String> {
        Self::new(parse_options(config)?)
    }
}

fn render(meta: &RowMeta, row: &Row) -> String {
    meta.fields()
        .iter()
        .zip(row.values())
        .map(|(field, value)| format!("{}={}", field.name, value))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Transform for WriteToLogTransform {
    fn name(&self) -> &str {
        "write_to_log"
    }

    fn process_row(&mut self, ctx: &mut TransformContext) -> Result<bool, TransformError> {
        let Some((meta, row)) = next_row(ctx) else {
            return Ok(false);
        };

        self.rows_logged += 1;
        RowLogged {
            transform_id: ctx.transform_id(),
            level: self.level,
            row_number: self.rows_logged,
            row: &render(&meta, &row),
        }
        .log();

        ctx.put_row(&meta, row)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::transforms::test_support::Harness;
    use crate::row::{Value, ValueMeta, ValueType};
    use std::sync::Arc;

    #[test]
    fn test_render() {
        let meta = RowMeta::new(vec![
            ValueMeta::new("id", ValueType::Integer),
            ValueMeta::new("name", ValueType::String),
        ]);
        let row = Row::new(vec![Value::Integer(1), Value::Null]);
        assert_eq!(render(&meta, &row), "id=1, name=<null>");
    }

    #[test]
    fn test_level_option() {
        let cfg = TransformConfig::new("log", "write_to_log").with_option("level", "debug");
        assert_eq!(WriteToLogTransform::from_config(&cfg).unwrap().level, Level::DEBUG);

        let cfg = TransformConfig::new("log", "write_to_log").with_option("level", "loud");
        assert!(WriteToLogTransform::from_config(&cfg).is_err());
    }

    #[test]
    fn test_passes_rows_through() {
        let cfg = TransformConfig::new("log", "write_to_log");
        let mut transform = WriteToLogTransform::from_config(&cfg).unwrap();
        let meta = Arc::new(RowMeta::new(vec![ValueMeta::new("v", ValueType::Integer)]));
        let rows = vec![Row::new(vec![Value::Integer(1)]), Row::new(vec![Value::Integer(2)])];
        let mut harness = Harness::new(cfg, meta, rows, &["next"]);

        harness.run(&mut transform).unwrap();
        assert_eq!(harness.output(0).len(), 2);
        assert_eq!(transform.rows_logged, 2);
    }
}
