// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Transform implementations for The Hopwood ETL engine.
//!
//! Every backend implements the [`Transform`](crate::traits::Transform) trait
//! and is reached through the
//! [`TransformRegistry`](crate::config::TransformRegistry), which maps the
//! `type:` identifier of a pipeline file to a constructor.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process Rust transforms:
//! - **Sources**: `generate_rows`
//! - **Field transforms**: `multiply`, `parse_integer`
//! - **Flow**: `dummy`, `filter_rows`, `write_to_log`
//!
//! ## Stub Backend (Test-Only)
//! Transforms that fail, panic, stall or cancel the run on purpose, for
//! exercising the engine's failure handling. NOT available in production builds.
//!
//! # Architecture
//!
//! ```text
//! Configuration → Registry → Transform Instance (one per copy) → TransformRuntime
//! ```
//!
//! # Examples
//!
//! ```rust
//! use the_hopwood::backends::local::LocalTransformFactory;
//! use the_hopwood::config::TransformConfig;
//!
//! let config = TransformConfig::new("double", "multiply")
//!     .with_option("field", "value")
//!     .with_option("factor", 2);
//!
//! let transform = LocalTransformFactory::create_transform(&config)?;
//! assert_eq!(transform.name(), "multiply");
//! # Ok::<(), String>(())
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
