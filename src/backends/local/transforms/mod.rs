// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod dummy;
pub mod filter_rows;
pub mod generate_rows;
pub mod multiply;
pub mod parse_integer;
pub mod write_to_log;

pub use dummy::*;
pub use filter_rows::*;
pub use generate_rows::*;
pub use multiply::*;
pub use parse_integer::*;
pub use write_to_log::*;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::TransformConfig;
use crate::engine::TransformContext;
use crate::errors::TransformError;
use crate::row::{Row, RowMeta, ValueType};

/// Deserialize a transform's `options` map into its typed configuration.
pub(crate) fn parse_options<T: DeserializeOwned>(config: &TransformConfig) -> Result<T, String> {
    let mapping: serde_yaml::Mapping = config
        .options
        .iter()
        .map(|(k, v)| (serde_yaml::Value::String(k.clone()), v.clone()))
        .collect();

    serde_yaml::from_value(serde_yaml::Value::Mapping(mapping))
        .map_err(|e| format!("invalid options for '{}': {}", config.id, e))
}

/// Read the next row together with its layout.
pub(crate) fn next_row(ctx: &mut TransformContext) -> Option<(Arc<RowMeta>, Row)> {
    let row = ctx.get_row()?;
    let meta = Arc::clone(ctx.input_row_meta()?);
    Some((meta, row))
}

/// Position of one named field and the layout rows have after it is rewritten.
///
/// Both are cached until a row with a different layout arrives.
pub(crate) struct FieldLayout {
    field: String,
    cached: Option<(Arc<RowMeta>, usize, Arc<RowMeta>)>,
}

impl FieldLayout {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            cached: None,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// `output_type` maps the field's input type to its output type.
    pub fn resolve(
        &mut self,
        meta: &Arc<RowMeta>,
        output_type: impl FnOnce(ValueType) -> ValueType,
    ) -> Result<(usize, Arc<RowMeta>), TransformError> {
        if let Some((input, index, output)) = &self.cached {
            if Arc::ptr_eq(input, meta) {
                return Ok((*index, Arc::clone(output)));
            }
        }

        let index = meta.index_of(&self.field).ok_or_else(|| {
            TransformError::fatal(format!(
                "field '{}' not found in input row {}",
                self.field, meta
            ))
        })?;
        let mut field_meta = meta
            .field(index)
            .cloned()
            .ok_or_else(|| TransformError::fatal(format!("field '{}' has no metadata", self.field)))?;

        let new_type = output_type(field_meta.value_type);
        let output = if new_type == field_meta.value_type {
            Arc::clone(meta)
        } else {
            field_meta.value_type = new_type;
            Arc::new(meta.with_replaced(index, field_meta))
        };

        self.cached = Some((Arc::clone(meta), index, Arc::clone(&output)));
        Ok((index, output))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::TransformConfig;
    use crate::engine::context::{CopyWiring, OutputHop, RunContext};
    use crate::engine::TransformContext;
    use crate::row::{Row, RowMeta};
    use crate::rowset::{RowSet, RowSetPoll};
    use crate::traits::Transform;

    /// A context reading `rows` from one finished input and writing to the
    /// given output targets, plus an error stream when error handling is set.
    pub struct Harness {
        pub ctx: TransformContext,
        pub outputs: Vec<Arc<RowSet>>,
        pub errors: Option<Arc<RowSet>>,
    }

    impl Harness {
        pub fn new(
            config: TransformConfig,
            meta: Arc<RowMeta>,
            rows: Vec<Row>,
            targets: &[&str],
        ) -> Self {
            let input = Arc::new(RowSet::new(rows.len().max(1)));
            for row in rows {
                input.put_row(Arc::clone(&meta), row).unwrap();
            }
            input.set_done();

            let outputs: Vec<Arc<RowSet>> = targets.iter().map(|_| Arc::new(RowSet::new(1000))).collect();
            let errors = config
                .error_handling
                .as_ref()
                .map(|_| Arc::new(RowSet::new(1000)));

            let wiring = CopyWiring {
                inputs: vec![input],
                outputs: targets
                    .iter()
                    .zip(&outputs)
                    .map(|(target, rowset)| OutputHop {
                        target: target.to_string(),
                        rowset: Arc::clone(rowset),
                    })
                    .collect(),
                error_rowset: errors.clone(),
                error_count: None,
            };
            let run = Arc::new(RunContext::new("test", HashMap::new(), Duration::from_millis(5)));
            let ctx = TransformContext::new(run, Arc::new(config), 0, wiring);

            Self { ctx, outputs, errors }
        }

        /// Call `process_row` until it returns false or fails.
        pub fn run(&mut self, transform: &mut dyn Transform) -> Result<(), crate::errors::TransformError> {
            transform.init(&mut self.ctx)?;
            while transform.process_row(&mut self.ctx)? {}
            Ok(())
        }

        pub fn drain(rowset: &RowSet) -> Vec<(Arc<RowMeta>, Row)> {
            let mut rows = Vec::new();
            while let RowSetPoll::Row(meta, row) = rowset.get_row_immediate() {
                rows.push((meta, row));
            }
            rows
        }

        pub fn output(&self, index: usize) -> Vec<(Arc<RowMeta>, Row)> {
            Self::drain(&self.outputs[index])
        }
    }
}
