// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod hooks;
pub mod listener;
pub mod transform;

pub use hooks::{HookContext, HookPoint, LifecycleHooks, NoopHooks};
pub use listener::RowListener;
pub use transform::Transform;
