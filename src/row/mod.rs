// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Row data model shared by every stream segment in a pipeline.
//!
//! A [`Row`] is an ordered tuple of [`Value`]s. Its layout is described by a
//! [`RowMeta`], which is shared by `Arc` among all rows flowing through the
//! same hop. Once a stream segment starts emitting rows its `RowMeta` is
//! never mutated; transforms that add fields derive a new meta with
//! [`RowMeta::with_field`] and share that one downstream.

mod meta;
#[allow(clippy::module_inception)]
mod row;
mod value;

pub use meta::{RowMeta, ValueMeta};
pub use row::Row;
pub use value::{Value, ValueType};
