// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::ErrorHandlingConfig;
use crate::errors::RouteError;
use crate::observability::messages::transform::ErrorCeilingReached;
use crate::observability::messages::StructuredLog;
use crate::row::{Row, RowMeta, Value, ValueMeta, ValueType};
use crate::rowset::RowSet;

/// Diverts failing rows of one worker to its error row set.
///
/// A diverted row is the original row followed by four diagnostic fields:
/// the number of errors, a description, the offending field names and the
/// error codes. The field names come from [`ErrorHandlingConfig`].
///
/// The error count can be shared by every copy of a transform through
/// [`with_shared_count`](Self::with_shared_count), making `max_errors` a
/// ceiling for the transform as a whole.
pub struct ErrorRouter {
    transform_id: String,
    config: ErrorHandlingConfig,
    rowset: Arc<RowSet>,
    error_count: Arc<AtomicU64>,
    // input layout -> extended error layout, rebuilt when the input layout changes
    layout: Option<(Arc<RowMeta>, Arc<RowMeta>)>,
}

impl ErrorRouter {
    pub fn new(
        transform_id: impl Into<String>,
        config: ErrorHandlingConfig,
        rowset: Arc<RowSet>,
    ) -> Self {
        Self {
            transform_id: transform_id.into(),
            config,
            rowset,
            error_count: Arc::new(AtomicU64::new(0)),
            layout: None,
        }
    }

    /// Count errors in `error_count` instead of a counter of its own.
    pub fn with_shared_count(mut self, error_count: Arc<AtomicU64>) -> Self {
        self.error_count = error_count;
        self
    }

    /// Divert `row` with its diagnostics.
    ///
    /// Fails with [`RouteError::ErrorCeilingExceeded`], without diverting
    /// anything, when the row would take the count above `max_errors`.
    pub fn route(
        &mut self,
        meta: &Arc<RowMeta>,
        row: Row,
        nr_errors: u64,
        description: &str,
        field_names: Option<&str>,
        error_codes: Option<&str>,
    ) -> Result<(), RouteError> {
        let (error_meta, error_row) =
            self.divert(meta, row, nr_errors, description, field_names, error_codes)?;
        self.send(error_meta, error_row)
    }

    /// Counts the error and builds the error row without sending it.
    pub(crate) fn divert(
        &mut self,
        meta: &Arc<RowMeta>,
        mut row: Row,
        nr_errors: u64,
        description: &str,
        field_names: Option<&str>,
        error_codes: Option<&str>,
    ) -> Result<(Arc<RowMeta>, Row), RouteError> {
        let nr_errors = nr_errors.max(1);
        let max_errors = self.config.max_errors;
        let reserved = self
            .error_count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                let next = current + nr_errors;
                match max_errors {
                    Some(max_errors) if next > max_errors => None,
                    _ => Some(next),
                }
            });
        if let (Err(current), Some(max_errors)) = (reserved, max_errors) {
            ErrorCeilingReached {
                transform_id: &self.transform_id,
                max_errors,
            }
            .log();
            return Err(RouteError::ErrorCeilingExceeded {
                max_errors,
                error_count: current + nr_errors,
            });
        }

        row.push(Value::Integer(nr_errors as i64));
        row.push(Value::String(description.to_string()));
        row.push(field_names.map_or(Value::Null, Value::from));
        row.push(error_codes.map_or(Value::Null, Value::from));

        Ok((self.error_layout(meta), row))
    }

    pub(crate) fn send(&self, meta: Arc<RowMeta>, row: Row) -> Result<(), RouteError> {
        self.rowset.put_row(meta, row)?;
        Ok(())
    }

    fn error_layout(&mut self, meta: &Arc<RowMeta>) -> Arc<RowMeta> {
        if let Some((input, extended)) = &self.layout {
            if Arc::ptr_eq(input, meta) || **input == **meta {
                return Arc::clone(extended);
            }
        }

        let extended = Arc::new(
            meta.with_field(ValueMeta::new(&self.config.nr_errors_field, ValueType::Integer))
                .with_field(ValueMeta::new(&self.config.description_field, ValueType::String))
                .with_field(ValueMeta::new(&self.config.fields_field, ValueType::String))
                .with_field(ValueMeta::new(&self.config.codes_field, ValueType::String)),
        );
        self.layout = Some((Arc::clone(meta), Arc::clone(&extended)));
        extended
    }

    /// Errors diverted so far, by every router sharing the count.
    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::SeqCst)
    }

    /// ID of the transform receiving diverted rows.
    pub fn target(&self) -> &str {
        &self.config.target
    }

    pub(crate) fn close(&self) {
        self.rowset.set_done();
    }
}
