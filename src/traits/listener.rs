// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::row::{Row, RowMeta};

/// Observer of the rows a transform reads and writes.
///
/// Listeners are called on the worker thread of each copy, so a listener
/// shared between copies sees rows from several threads.
pub trait RowListener: Send + Sync {
    fn row_read(&self, _meta: &Arc<RowMeta>, _row: &Row) {}

    fn row_written(&self, _meta: &Arc<RowMeta>, _row: &Row) {}

    fn error_row_written(&self, _meta: &Arc<RowMeta>, _row: &Row) {}
}
