// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use crate::errors::RowSetError;
use crate::row::{Row, RowMeta};
use crate::rowset::RowSet;

/// Pushes rows from outside the pipeline into an injection transform.
///
/// Obtained from
/// [`PipelineOrchestrator::row_producer`](crate::engine::PipelineOrchestrator::row_producer)
/// before the run starts. The producer may be moved to any thread. Dropping it
/// ends the injected stream.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use the_hopwood::config::{PipelineConfig, TransformConfig, TransformRegistry};
/// use the_hopwood::engine::PipelineOrchestrator;
/// use the_hopwood::row::{Row, RowMeta, Value, ValueMeta, ValueType};
///
/// let config = PipelineConfig {
///     name: "inject".to_string(),
///     engine: Default::default(),
///     transforms: vec![TransformConfig::new("input", "dummy").injectable()],
///     hops: vec![],
/// };
/// let registry = TransformRegistry::with_builtins();
/// let mut pipeline = PipelineOrchestrator::new(config, &registry).unwrap();
/// pipeline.prepare().unwrap();
///
/// let producer = pipeline.row_producer("input").unwrap();
/// pipeline.start().unwrap();
///
/// let meta = Arc::new(RowMeta::new(vec![ValueMeta::new("line", ValueType::String)]));
/// producer.put_row(Arc::clone(&meta), Row::new(vec![Value::from("hello")])).unwrap();
/// producer.finished();
///
/// let result = pipeline.wait().unwrap();
/// assert!(result.is_success());
/// ```
#[derive(Debug)]
pub struct RowProducer {
    transform_id: String,
    rowset: Arc<RowSet>,
}

impl RowProducer {
    pub(crate) fn new(transform_id: impl Into<String>, rowset: Arc<RowSet>) -> Self {
        Self {
            transform_id: transform_id.into(),
            rowset,
        }
    }

    pub fn transform_id(&self) -> &str {
        &self.transform_id
    }

    /// Inject a row, waiting while the transform's input is full.
    pub fn put_row(&self, meta: Arc<RowMeta>, row: Row) -> Result<(), RowSetError> {
        self.rowset.put_row(meta, row)
    }

    /// Inject a row, giving up after `timeout`. Returns whether it was accepted.
    pub fn put_row_wait(
        &self,
        meta: Arc<RowMeta>,
        row: Row,
        timeout: Duration,
    ) -> Result<bool, RowSetError> {
        Ok(self.rowset.put_row_wait(meta, row, timeout)?.is_none())
    }

    /// End the injected stream. Idempotent.
    pub fn finished(&self) {
        self.rowset.set_done();
    }
}

impl Drop for RowProducer {
    fn drop(&mut self) {
        self.finished();
    }
}
