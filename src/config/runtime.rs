// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::{load_config, PipelineConfig, TransformRegistry};
use crate::engine::PipelineOrchestrator;
use crate::errors::{ConfigError, ExecutionError};
use crate::traits::LifecycleHooks;

/// Pipeline runtime builder - turns a pipeline definition into a ready orchestrator.
///
/// The `RuntimeBuilder` gathers everything a run needs besides the pipeline
/// definition itself: the transform registry (built-ins unless replaced),
/// lifecycle hooks and run variables. [`build`](Self::build) validates the
/// graph and resolves every transform type once.
///
/// # Examples
///
/// ## Building a runtime from configuration
/// ```
/// use the_hopwood::config::{PipelineConfig, RuntimeBuilder, TransformConfig};
///
/// let config = PipelineConfig {
///     name: "single".to_string(),
///     engine: Default::default(),
///     transforms: vec![TransformConfig::new("only", "dummy")],
///     hops: vec![],
/// };
///
/// let orchestrator = RuntimeBuilder::from_config(config)
///     .with_variable("run_id", "42")
///     .build()
///     .unwrap();
///
/// assert_eq!(orchestrator.pipeline_name(), "single");
/// ```
pub struct RuntimeBuilder {
    config: PipelineConfig,
    registry: Option<TransformRegistry>,
    hooks: Option<Arc<dyn LifecycleHooks>>,
    variables: HashMap<String, String>,
}

impl RuntimeBuilder {
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            config,
            registry: None,
            hooks: None,
            variables: HashMap::new(),
        }
    }

    /// Load a pipeline file (YAML or TOML) into a builder.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Ok(Self::from_config(load_config(path)?))
    }

    /// Resolve transform types against `registry` instead of the built-ins.
    pub fn with_registry(mut self, registry: TransformRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn LifecycleHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validate the pipeline and create its orchestrator.
    ///
    /// # Returns
    /// A [`PipelineOrchestrator`] in its idle state, ready for `prepare`/`start`
    /// or a single `execute`.
    pub fn build(self) -> Result<PipelineOrchestrator, ExecutionError> {
        let registry = self.registry.unwrap_or_else(TransformRegistry::with_builtins);
        let mut orchestrator = PipelineOrchestrator::new(self.config, &registry)?;

        if let Some(hooks) = self.hooks {
            orchestrator = orchestrator.with_hooks(hooks);
        }
        for (name, value) in self.variables {
            orchestrator = orchestrator.with_variable(name, value);
        }
        Ok(orchestrator)
    }
}
