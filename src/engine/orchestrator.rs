// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline orchestration: validation, row set allocation, worker threads.
//!
//! A run goes through four steps, each a method on [`PipelineOrchestrator`]:
//!
//! 1. **new**: validate the hop graph and resolve every transform type
//! 2. **prepare**: allocate row sets, instantiate one transform per copy and
//!    call `init` on each in topological order
//! 3. **start**: spawn one named OS thread per (transform, copy)
//! 4. **wait**: block until every worker is terminal and aggregate the result
//!
//! Between `prepare` and `start` callers may obtain [`RowProducer`]s for
//! injection transforms and attach [`RowListener`]s.
//!
//! # Cancellation
//!
//! Every worker shares one stop signal. A fatal error in any worker, a call to
//! `stop_all` from a transform or [`PipelineOrchestrator::stop`] raises it;
//! workers notice it at the top of their loop and inside every blocked row
//! set wait. Once it is raised `wait` allows `shutdown_timeout` for the
//! workers to report, then marks the stragglers `Stopped` and detaches them.
//!
//! # Examples
//!
//! ```
//! use the_hopwood::config::{HopConfig, PipelineConfig, TransformConfig, TransformRegistry};
//! use the_hopwood::engine::{PipelineOrchestrator, PipelineStatus};
//!
//! let config = PipelineConfig {
//!     name: "doubling".to_string(),
//!     engine: Default::default(),
//!     transforms: vec![
//!         TransformConfig::new("numbers", "generate_rows")
//!             .with_option("field", "value")
//!             .with_option("type", "integer")
//!             .with_option("values", vec![1, 2, 3]),
//!         TransformConfig::new("double", "multiply")
//!             .with_option("field", "value")
//!             .with_option("factor", 2),
//!     ],
//!     hops: vec![HopConfig::new("numbers", "double")],
//! };
//!
//! let pipeline = PipelineOrchestrator::new(config, &TransformRegistry::with_builtins()).unwrap();
//! let result = pipeline.execute().unwrap();
//! assert_eq!(result.status, PipelineStatus::Finished);
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::config::{validate_pipeline, HopGraph, PipelineConfig, TransformMap, TransformRegistry};
use crate::engine::context::{RunContext, TransformContext};
use crate::engine::runtime::{panic_message, TransformRuntime};
use crate::engine::status::{ExecutionStatus, PipelineResult, TransformCounters, TransformSummary};
use crate::engine::topology::Topology;
use crate::engine::RowProducer;
use crate::errors::{ExecutionError, ValidationError};
use crate::observability::messages::engine::{
    HookFailed, PipelineCompleted, PipelinePrepared, PipelineStarted, StopRequested,
    TransformInitFailed, WorkerShutdownTimedOut,
};
use crate::observability::messages::validation::PipelineValidationFailed;
use crate::observability::messages::StructuredLog;
use crate::rowset::{RowSet, StopSignal};
use crate::traits::{HookContext, HookPoint, LifecycleHooks, NoopHooks, RowListener};

/// Workers initialised but not yet running.
struct PreparedRun {
    run: Arc<RunContext>,
    workers: Vec<TransformRuntime>,
    injectors: HashMap<String, Arc<RowSet>>,
    // injectors a producer was handed out for
    claimed: HashSet<String>,
}

/// Workers spawned, reporting over `reports`.
struct ActiveRun {
    run: Arc<RunContext>,
    started_at: Instant,
    reports: mpsc::Receiver<TransformSummary>,
    handles: HashMap<(String, usize), JoinHandle<()>>,
    // declaration order of every worker, for stable result ordering
    order: Vec<(String, usize)>,
}

enum RunState {
    Idle,
    Prepared(PreparedRun),
    Running(ActiveRun),
    Finished,
}

/// Runs one pipeline definition.
///
/// An orchestrator performs a single run: row sets and workers are created
/// by [`prepare`](Self::prepare) and never reused.
pub struct PipelineOrchestrator {
    config: PipelineConfig,
    transforms: TransformMap,
    hooks: Arc<dyn LifecycleHooks>,
    variables: HashMap<String, String>,
    // shared with the run context and callers of stop_signal()
    stop: StopSignal,
    state: RunState,
}

impl PipelineOrchestrator {
    /// Validate `config` and resolve every transform type against `registry`.
    pub fn new(
        config: PipelineConfig,
        registry: &TransformRegistry,
    ) -> Result<Self, ExecutionError> {
        if let Err(errors) = validate_pipeline(&config) {
            PipelineValidationFailed {
                pipeline: &config.name,
                error_count: errors.len(),
            }
            .log();
            return Err(ExecutionError::InvalidGraph(errors));
        }

        let transforms = TransformMap::from_config(&config, registry)?;

        Ok(Self {
            config,
            transforms,
            hooks: Arc::new(NoopHooks),
            variables: HashMap::new(),
            stop: StopSignal::new(),
            state: RunState::Idle,
        })
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn LifecycleHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Set a variable visible to every transform through `TransformContext::variable`.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn pipeline_name(&self) -> &str {
        &self.config.name
    }

    /// Allocate row sets and initialise every (transform, copy).
    ///
    /// If any `init` fails, the transforms initialised so far are disposed and
    /// the run is aborted with [`ExecutionError::TransformInitFailed`].
    pub fn prepare(&mut self) -> Result<(), ExecutionError> {
        if !matches!(self.state, RunState::Idle) {
            return Err(ExecutionError::AlreadyStarted);
        }

        let mut hook_ctx = self.hook_context();
        self.call_hook(HookPoint::PipelinePrepareExecution, &mut hook_ctx)?;

        let run = Arc::new(
            RunContext::new(
                self.config.name.clone(),
                hook_ctx.variables.clone(),
                self.config.engine.get_poll_interval(),
            )
            .with_stop_signal(self.stop.clone()),
        );

        let mut topology = Topology::build(&self.config, &run);
        let rowset_count = topology.rowset_count();

        let graph = HopGraph::from_config(&self.config);
        let order: Vec<String> = match graph.topological_order() {
            Some(order) => order.into_iter().map(str::to_string).collect(),
            None => {
                // validated in new(), so only reachable if the config was mutated
                return Err(ExecutionError::InvalidGraph(vec![ValidationError::CyclicHop {
                    cycle: Vec::new(),
                }]));
            }
        };

        let mut workers: Vec<TransformRuntime> = Vec::new();
        for transform_id in &order {
            let resolved = self
                .transforms
                .get(transform_id)
                .ok_or_else(|| ExecutionError::TransformNotFound(transform_id.clone()))?;
            let config = Arc::clone(resolved.config());

            for copy_nr in 0..config.copies {
                let transform = match resolved.instantiate() {
                    Ok(transform) => transform,
                    Err(e) => {
                        abandon_all(workers);
                        return Err(e.into());
                    }
                };
                let ctx = TransformContext::new(
                    Arc::clone(&run),
                    Arc::clone(&config),
                    copy_nr,
                    topology.take_wiring(transform_id, copy_nr),
                );
                let mut worker = TransformRuntime::new(transform, ctx);

                if let Err(source) = worker.init() {
                    TransformInitFailed {
                        transform_id,
                        copy_nr,
                        error: &source.to_string(),
                    }
                    .log();
                    worker.abandon();
                    abandon_all(workers);
                    return Err(ExecutionError::TransformInitFailed {
                        transform_id: transform_id.clone(),
                        copy_nr,
                        source,
                    });
                }
                workers.push(worker);

                hook_ctx.transform_id = Some(transform_id.clone());
                hook_ctx.copy_nr = Some(copy_nr);
                if let Err(e) = self.call_hook(HookPoint::TransformAfterInit, &mut hook_ctx) {
                    abandon_all(workers);
                    return Err(e);
                }
            }
        }

        PipelinePrepared {
            pipeline: &self.config.name,
            transform_count: self.config.transforms.len(),
            worker_count: workers.len(),
            rowset_count,
        }
        .log();

        self.state = RunState::Prepared(PreparedRun {
            run,
            workers,
            injectors: topology.into_injectors(),
            claimed: HashSet::new(),
        });
        Ok(())
    }

    /// A producer feeding the injection transform `transform_id`.
    ///
    /// Must be called between [`prepare`](Self::prepare) and
    /// [`start`](Self::start). Injection transforms nobody asked a producer
    /// for see an empty, finished stream once the run starts.
    pub fn row_producer(&mut self, transform_id: &str) -> Result<RowProducer, ExecutionError> {
        let RunState::Prepared(prepared) = &mut self.state else {
            return Err(ExecutionError::NotPrepared);
        };
        if self.config.transform(transform_id).is_none() {
            return Err(ExecutionError::TransformNotFound(transform_id.to_string()));
        }
        let rowset = prepared
            .injectors
            .get(transform_id)
            .ok_or_else(|| ExecutionError::NotAnInjectionPoint(transform_id.to_string()))?;

        prepared.claimed.insert(transform_id.to_string());
        Ok(RowProducer::new(transform_id, Arc::clone(rowset)))
    }

    /// Attach a listener to every copy of `transform_id`.
    pub fn add_row_listener(
        &mut self,
        transform_id: &str,
        listener: Arc<dyn RowListener>,
    ) -> Result<(), ExecutionError> {
        let RunState::Prepared(prepared) = &mut self.state else {
            return Err(ExecutionError::NotPrepared);
        };

        let mut found = false;
        for worker in prepared
            .workers
            .iter_mut()
            .filter(|w| w.transform_id() == transform_id)
        {
            worker.add_listener(Arc::clone(&listener));
            found = true;
        }

        if found {
            Ok(())
        } else {
            Err(ExecutionError::TransformNotFound(transform_id.to_string()))
        }
    }

    /// Spawn one thread per (transform, copy).
    pub fn start(&mut self) -> Result<(), ExecutionError> {
        let prepared = match std::mem::replace(&mut self.state, RunState::Finished) {
            RunState::Prepared(prepared) => prepared,
            RunState::Idle => {
                self.state = RunState::Idle;
                return Err(ExecutionError::NotPrepared);
            }
            other => {
                self.state = other;
                return Err(ExecutionError::AlreadyStarted);
            }
        };

        let mut hook_ctx = self.hook_context();
        hook_ctx.variables = prepared.run.variables().clone();
        if let Err(e) = self.call_hook(HookPoint::PipelineStartThreads, &mut hook_ctx) {
            for rowset in prepared.injectors.values() {
                rowset.set_done();
            }
            abandon_all(prepared.workers);
            return Err(e);
        }

        for (transform_id, rowset) in &prepared.injectors {
            if !prepared.claimed.contains(transform_id) {
                rowset.set_done();
            }
        }

        let run = prepared.run;
        let (sender, reports) = mpsc::channel();
        let order: Vec<(String, usize)> = prepared
            .workers
            .iter()
            .map(|w| (w.transform_id().to_string(), w.copy_nr()))
            .collect();
        let worker_count = order.len();

        let mut handles = HashMap::new();
        let mut pending = prepared.workers.into_iter();
        while let Some(worker) = pending.next() {
            let transform_id = worker.transform_id().to_string();
            let copy_nr = worker.copy_nr();
            let sender = sender.clone();
            let stop_run = Arc::clone(&run);
            let (thread_id, thread_copy) = (transform_id.clone(), copy_nr);

            let spawned = thread::Builder::new()
                .name(format!("{}.{}", transform_id, copy_nr))
                .spawn(move || {
                    let summary = panic::catch_unwind(AssertUnwindSafe(|| worker.run()))
                        .unwrap_or_else(|payload| {
                            stop_run.request_stop(&format!("{}.{}", thread_id, thread_copy));
                            TransformSummary {
                                transform_id: thread_id.clone(),
                                copy_nr: thread_copy,
                                status: ExecutionStatus::Errored,
                                counters: TransformCounters::default(),
                                error: Some(panic_message(payload.as_ref())),
                            }
                        });
                    let _ = sender.send(summary);
                });

            match spawned {
                Ok(handle) => {
                    handles.insert((transform_id, copy_nr), handle);
                }
                Err(source) => {
                    run.request_stop("orchestrator");
                    abandon_all(pending.collect());
                    let spawned_order: Vec<(String, usize)> = order
                        .iter()
                        .filter(|key| handles.contains_key(*key))
                        .cloned()
                        .collect();
                    self.state = RunState::Running(ActiveRun {
                        run,
                        started_at: Instant::now(),
                        reports,
                        handles,
                        order: spawned_order,
                    });
                    return Err(ExecutionError::SpawnFailed {
                        transform_id,
                        copy_nr,
                        source,
                    });
                }
            }
        }

        PipelineStarted {
            pipeline: &self.config.name,
            worker_count,
        }
        .log();

        self.state = RunState::Running(ActiveRun {
            run,
            started_at: Instant::now(),
            reports,
            handles,
            order,
        });
        Ok(())
    }

    /// Raise the stop signal. Workers wind down cooperatively.
    pub fn stop(&self) {
        if self.stop.request() {
            StopRequested {
                pipeline: &self.config.name,
                requested_by: "orchestrator",
            }
            .log();
        }
    }

    /// A handle to the run's stop signal, usable from other threads while
    /// [`wait`](Self::wait) blocks.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Block until every worker is terminal and aggregate their reports.
    pub fn wait(&mut self) -> Result<PipelineResult, ExecutionError> {
        let active = match std::mem::replace(&mut self.state, RunState::Finished) {
            RunState::Running(active) => active,
            other => {
                self.state = other;
                return Err(ExecutionError::NotStarted);
            }
        };

        let ActiveRun {
            run,
            started_at,
            reports,
            mut handles,
            order,
        } = active;

        let shutdown_timeout = self.config.engine.get_shutdown_timeout();
        let poll = run.poll_interval();
        let mut outstanding: BTreeSet<(String, usize)> = order.iter().cloned().collect();
        let mut received: HashMap<(String, usize), TransformSummary> = HashMap::new();
        let mut deadline: Option<Instant> = None;

        while !outstanding.is_empty() {
            if deadline.is_none() && run.is_stopped() {
                deadline = Some(Instant::now() + shutdown_timeout);
            }
            let timeout = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    (deadline - now).min(poll)
                }
                None => poll,
            };

            match reports.recv_timeout(timeout) {
                Ok(summary) => {
                    let key = (summary.transform_id.clone(), summary.copy_nr);
                    outstanding.remove(&key);
                    if let Some(handle) = handles.remove(&key) {
                        let _ = handle.join();
                    }
                    received.insert(key, summary);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        for (transform_id, copy_nr) in &outstanding {
            WorkerShutdownTimedOut {
                transform_id,
                copy_nr: *copy_nr,
                timeout: shutdown_timeout,
            }
            .log();
        }
        // stragglers are left running detached
        drop(handles);

        let transforms: Vec<TransformSummary> = order
            .iter()
            .map(|key| {
                received
                    .remove(key)
                    .unwrap_or_else(|| TransformSummary::abandoned(&key.0, key.1))
            })
            .collect();

        let result = PipelineResult::aggregate(
            self.config.name.clone(),
            transforms,
            run.is_stopped(),
            started_at.elapsed(),
        );

        PipelineCompleted {
            pipeline: &result.pipeline_name,
            status: &result.status.to_string(),
            diverted_rows: result.diverted_rows(),
            duration: result.duration,
        }
        .log();

        let mut hook_ctx = self.hook_context();
        hook_ctx.variables = run.variables().clone();
        hook_ctx.status = Some(result.status);
        // the run is over, a failing hook can only be reported
        let _ = self.call_hook(HookPoint::PipelineFinished, &mut hook_ctx);

        Ok(result)
    }

    /// Prepare, start and wait in one call.
    pub fn execute(mut self) -> Result<PipelineResult, ExecutionError> {
        self.prepare()?;
        self.start()?;
        self.wait()
    }

    fn hook_context(&self) -> HookContext {
        HookContext {
            pipeline_name: self.config.name.clone(),
            variables: self.variables.clone(),
            ..Default::default()
        }
    }

    fn call_hook(&self, hook: HookPoint, ctx: &mut HookContext) -> Result<(), ExecutionError> {
        self.hooks.call(hook, ctx).map_err(|message| {
            HookFailed {
                pipeline: &self.config.name,
                hook: &hook.to_string(),
                error: &message,
            }
            .log();
            ExecutionError::HookFailed {
                hook: hook.to_string(),
                message,
            }
        })
    }
}

fn abandon_all(workers: Vec<TransformRuntime>) {
    for worker in workers {
        worker.abandon();
    }
}

