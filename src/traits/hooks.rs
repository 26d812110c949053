// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::engine::PipelineStatus;

/// Points in a run where [`LifecycleHooks::call`] is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// Before row sets are allocated. Variables set here are visible to every transform.
    PipelinePrepareExecution,
    /// After every transform initialised, before any worker thread is spawned.
    PipelineStartThreads,
    /// After each copy's `init` succeeded.
    TransformAfterInit,
    /// After every worker reached a terminal state.
    PipelineFinished,
}

impl Display for HookPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HookPoint::PipelinePrepareExecution => "PipelinePrepareExecution",
            HookPoint::PipelineStartThreads => "PipelineStartThreads",
            HookPoint::TransformAfterInit => "TransformAfterInit",
            HookPoint::PipelineFinished => "PipelineFinished",
        };
        f.write_str(name)
    }
}

/// State handed to a hook.
///
/// `transform_id` and `copy_nr` are only set for
/// [`HookPoint::TransformAfterInit`], `status` only for
/// [`HookPoint::PipelineFinished`].
#[derive(Debug, Clone, Default)]
pub struct HookContext {
    pub pipeline_name: String,
    pub transform_id: Option<String>,
    pub copy_nr: Option<usize>,
    pub variables: HashMap<String, String>,
    pub status: Option<PipelineStatus>,
}

/// Extension point called at fixed moments of a run.
///
/// Implementations must be cheap; they run on the orchestrator's thread.
pub trait LifecycleHooks: Send + Sync {
    fn call(&self, hook: HookPoint, ctx: &mut HookContext) -> Result<(), String>;
}

/// Hooks that do nothing.
pub struct NoopHooks;

impl LifecycleHooks for NoopHooks {
    fn call(&self, _hook: HookPoint, _ctx: &mut HookContext) -> Result<(), String> {
        Ok(())
    }
}
