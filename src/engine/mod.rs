// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod collector;
pub(crate) mod context;
mod error_router;
mod orchestrator;
mod row_producer;
mod runtime;
mod status;
mod topology;


pub use collector::RowCollector;
pub use context::{RunContext, TransformContext};
pub use error_router::ErrorRouter;
pub use orchestrator::PipelineOrchestrator;
pub use row_producer::RowProducer;
pub use runtime::TransformRuntime;
pub use status::{
    ExecutionStatus, PipelineResult, PipelineStatus, TransformCounters, TransformSummary,
};
