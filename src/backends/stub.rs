// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test-only transforms for exercising failure paths of the engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Deserialize;

use crate::backends::local::transforms::{next_row, parse_options};
use crate::config::{TransformConfig, TransformRegistry};
use crate::engine::TransformContext;
use crate::errors::TransformError;
use crate::row::Value;
use crate::traits::Transform;

/// How a [`FailingTransform`] fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailMode {
    /// A diverting row error.
    #[default]
    Row,
    Fatal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FailingConfig {
    /// Integer values of the first field that fail
    #[serde(default)]
    pub fail_on: Vec<i64>,
    #[serde(default)]
    pub mode: FailMode,
}

/// Passes rows through, failing on the configured values
pub struct FailingTransform {
    config: FailingConfig,
}

impl FailingTransform {
    pub fn from_config(config: &TransformConfig) -> Result<Self, String> {
        Ok(Self {
            config: parse_options(config)?,
        })
    }
}

impl Transform for FailingTransform {
    fn name(&self) -> &str {
        "failing"
    }

    fn process_row(&mut self, ctx: &mut TransformContext) -> Result<bool, TransformError> {
        let Some((meta, row)) = next_row(ctx) else {
            return Ok(false);
        };

        if let Some(value) = row.get(0).and_then(Value::as_integer) {
            if self.config.fail_on.contains(&value) {
                return Err(match self.config.mode {
                    FailMode::Row => TransformError::row_field(
                        format!("value {} rejected", value),
                        meta.field(0).map(|f| f.name.clone()).unwrap_or_default(),
                        "STUB001",
                    ),
                    FailMode::Fatal => TransformError::fatal(format!("value {} is fatal", value)),
                });
            }
        }

        ctx.put_row(&meta, row)?;
        Ok(true)
    }
}

/// Panics on the first row
pub struct PanickingTransform;

impl Transform for PanickingTransform {
    fn name(&self) -> &str {
        "panicking"
    }

    fn process_row(&mut self, ctx: &mut TransformContext) -> Result<bool, TransformError> {
        if ctx.get_row().is_some() {
            panic!("stub transform panicked");
        }
        Ok(false)
    }
}

/// Fails `init`
pub struct InitFailingTransform;

impl Transform for InitFailingTransform {
    fn name(&self) -> &str {
        "init_failing"
    }

    fn init(&mut self, _ctx: &mut TransformContext) -> Result<(), TransformError> {
        Err(TransformError::fatal("stub init failure"))
    }

    fn process_row(&mut self, _ctx: &mut TransformContext) -> Result<bool, TransformError> {
        Ok(false)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlowConfig {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_delay_ms() -> u64 {
    2_000
}

/// Sleeps before every row without looking at the stop signal
pub struct SlowTransform {
    delay: Duration,
}

impl SlowTransform {
    pub fn from_config(config: &TransformConfig) -> Result<Self, String> {
        let config: SlowConfig = parse_options(config)?;
        Ok(Self {
            delay: Duration::from_millis(config.delay_ms),
        })
    }
}

impl Transform for SlowTransform {
    fn name(&self) -> &str {
        "slow"
    }

    fn process_row(&mut self, ctx: &mut TransformContext) -> Result<bool, TransformError> {
        thread::sleep(self.delay);
        let Some((meta, row)) = next_row(ctx) else {
            return Ok(false);
        };
        ctx.put_row(&meta, row)?;
        Ok(true)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopAllConfig {
    #[serde(default)]
    pub after: u64,
}

/// Passes `after` rows through, then cancels the run
pub struct StopAllTransform {
    after: u64,
    seen: u64,
}

impl StopAllTransform {
    pub fn from_config(config: &TransformConfig) -> Result<Self, String> {
        let config: StopAllConfig = parse_options(config)?;
        Ok(Self {
            after: config.after,
            seen: 0,
        })
    }
}

impl Transform for StopAllTransform {
    fn name(&self) -> &str {
        "stop_all"
    }

    fn process_row(&mut self, ctx: &mut TransformContext) -> Result<bool, TransformError> {
        if self.seen >= self.after {
            ctx.stop_all();
            return Ok(true);
        }
        let Some((meta, row)) = next_row(ctx) else {
            return Ok(false);
        };
        self.seen += 1;
        ctx.put_row(&meta, row)?;
        Ok(true)
    }
}

/// Counts `init` and `dispose` calls across every instance sharing it.
#[derive(Debug, Default)]
pub struct LifecycleCounter {
    inits: AtomicUsize,
    disposals: AtomicUsize,
}

impl LifecycleCounter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn disposals(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }
}

/// Passthrough recording its lifecycle in a shared counter
pub struct CountingTransform {
    counter: Arc<LifecycleCounter>,
}

impl CountingTransform {
    pub fn new(counter: Arc<LifecycleCounter>) -> Self {
        Self { counter }
    }
}

impl Transform for CountingTransform {
    fn name(&self) -> &str {
        "counting"
    }

    fn init(&mut self, _ctx: &mut TransformContext) -> Result<(), TransformError> {
        self.counter.inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn process_row(&mut self, ctx: &mut TransformContext) -> Result<bool, TransformError> {
        let Some((meta, row)) = next_row(ctx) else {
            return Ok(false);
        };
        ctx.put_row(&meta, row)?;
        Ok(true)
    }

    fn dispose(&mut self, _ctx: &mut TransformContext) {
        self.counter.disposals.fetch_add(1, Ordering::SeqCst);
    }
}

/// Passes rows through, then fails once with a row error at end of input
#[derive(Default)]
pub struct FlushFailingTransform {
    flushed: bool,
}

impl Transform for FlushFailingTransform {
    fn name(&self) -> &str {
        "flush_failing"
    }

    fn process_row(&mut self, ctx: &mut TransformContext) -> Result<bool, TransformError> {
        if let Some((meta, row)) = next_row(ctx) {
            ctx.put_row(&meta, row)?;
            return Ok(true);
        }
        if !self.flushed {
            self.flushed = true;
            return Err(TransformError::row("flush failed"));
        }
        Ok(false)
    }
}

/// The built-in transforms plus every stub above.
///
/// `counting` transforms report to `counter`.
pub fn stub_registry(counter: &Arc<LifecycleCounter>) -> TransformRegistry {
    let mut registry = TransformRegistry::with_builtins();
    registry.register("failing", |c: &TransformConfig| {
        Ok(Box::new(FailingTransform::from_config(c)?) as Box<dyn Transform>)
    });
    registry.register("panicking", |_: &TransformConfig| {
        Ok(Box::new(PanickingTransform) as Box<dyn Transform>)
    });
    registry.register("flush_failing", |_: &TransformConfig| {
        Ok(Box::new(FlushFailingTransform::default()) as Box<dyn Transform>)
    });
    registry.register("init_failing", |_: &TransformConfig| {
        Ok(Box::new(InitFailingTransform) as Box<dyn Transform>)
    });
    registry.register("slow", |c: &TransformConfig| {
        Ok(Box::new(SlowTransform::from_config(c)?) as Box<dyn Transform>)
    });
    registry.register("stop_all", |c: &TransformConfig| {
        Ok(Box::new(StopAllTransform::from_config(c)?) as Box<dyn Transform>)
    });
    let counter = Arc::clone(counter);
    registry.register("counting", move |_: &TransformConfig| {
        Ok(Box::new(CountingTransform::new(Arc::clone(&counter))) as Box<dyn Transform>)
    });
    registry
}
