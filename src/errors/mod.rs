// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod execution;
mod transform;
mod transform_map;

pub use config::{ConfigError, ValidationError};
pub use execution::ExecutionError;
pub use transform::{RouteError, RowSetError, TransformError};
pub use transform_map::TransformMapError;
