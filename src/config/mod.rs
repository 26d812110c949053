// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod hop_graph;
mod loader;
mod registry;
mod runtime;
mod transform_map;
mod validation;

#[cfg(test)]
mod integration_tests;
pub mod consts;

pub use hop_graph::HopGraph;
pub use loader::{
    load_and_validate_config, load_config, DataMovement, EngineOptions, ErrorHandlingConfig,
    HopConfig, PipelineConfig, TransformConfig,
};
pub use registry::{TransformConstructor, TransformRegistry};
pub use runtime::RuntimeBuilder;
pub use transform_map::{ResolvedTransform, TransformMap};
pub use validation::validate_pipeline;
