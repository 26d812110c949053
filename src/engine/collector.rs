// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use parking_lot::Mutex;

use crate::row::{Row, RowMeta, Value};
use crate::traits::RowListener;

/// A [`RowListener`] keeping every row it sees in memory.
///
/// Mostly useful in tests and for printing the output of terminal transforms.
#[derive(Debug, Default)]
pub struct RowCollector {
    read: Mutex<Vec<(Arc<RowMeta>, Row)>>,
    written: Mutex<Vec<(Arc<RowMeta>, Row)>>,
    errors: Mutex<Vec<(Arc<RowMeta>, Row)>>,
}

impl RowCollector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn read_rows(&self) -> Vec<(Arc<RowMeta>, Row)> {
        self.read.lock().clone()
    }

    pub fn written_rows(&self) -> Vec<(Arc<RowMeta>, Row)> {
        self.written.lock().clone()
    }

    pub fn error_rows(&self) -> Vec<(Arc<RowMeta>, Row)> {
        self.errors.lock().clone()
    }

    /// Values of `field` in every written row, in arrival order.
    pub fn written_values(&self, field: &str) -> Vec<Value> {
        self.written
            .lock()
            .iter()
            .filter_map(|(meta, row)| row.value_of(meta, field).cloned())
            .collect()
    }
}

impl RowListener for RowCollector {
    fn row_read(&self, meta: &Arc<RowMeta>, row: &Row) {
        self.read.lock().push((Arc::clone(meta), row.clone()));
    }

    fn row_written(&self, meta: &Arc<RowMeta>, row: &Row) {
        self.written.lock().push((Arc::clone(meta), row.clone()));
    }

    fn error_row_written(&self, meta: &Arc<RowMeta>, row: &Row) {
        self.errors.lock().push((Arc::clone(meta), row.clone()));
    }
}
