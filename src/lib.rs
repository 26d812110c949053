// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // transform implementations
pub mod config;     // pipeline definitions + registry
pub mod engine;     // orchestrator and worker runtime
pub mod errors;     // error handling
pub mod observability;
pub mod row;        // data model
pub mod rowset;     // bounded row queues
pub mod traits;     // plugin and hook abstractions
