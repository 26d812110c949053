// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::TransformConfig;
use crate::traits::Transform;

use super::transforms::*;

/// Factory for creating local (in-process) transform instances
pub struct LocalTransformFactory;

impl LocalTransformFactory {
    /// Create a transform instance from configuration
    ///
    /// The `type` field in the config determines which transform to create:
    /// - "generate_rows" -> GenerateRowsTransform (requires `field`, `values`)
    /// - "dummy" -> DummyTransform
    /// - "multiply" -> MultiplyTransform (requires `field`, `factor`)
    /// - "parse_integer" -> ParseIntegerTransform (requires `field`)
    /// - "filter_rows" -> FilterRowsTransform (requires `field`, `op`)
    /// - "write_to_log" -> WriteToLogTransform
    pub fn create_transform(config: &TransformConfig) -> Result<Box<dyn Transform>, String> {
        match config.transform_type.as_str() {
            // Sources
            "generate_rows" => Ok(Box::new(GenerateRowsTransform::from_config(config)?)),

            // Field transforms
            "dummy" => Ok(Box::new(DummyTransform::new())),
            "multiply" => Ok(Box::new(MultiplyTransform::from_config(config)?)),
            "parse_integer" => Ok(Box::new(ParseIntegerTransform::from_config(config)?)),

            // Flow
            "filter_rows" => Ok(Box::new(FilterRowsTransform::from_config(config)?)),
            "write_to_log" => Ok(Box::new(WriteToLogTransform::from_config(config)?)),

            other => Err(format!("Unknown local transform implementation: '{}'", other)),
        }
    }

    /// List all available local transform implementations
    pub fn list_available_implementations() -> Vec<&'static str> {
        vec![
            "generate_rows",
            "dummy",
            "multiply",
            "parse_integer",
            "filter_rows",
            "write_to_log",
        ]
    }

    /// Check if an implementation is available
    pub fn is_implementation_available(transform_type: &str) -> bool {
        Self::list_available_implementations().contains(&transform_type)
    }
}
