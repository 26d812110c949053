// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_ERROR_CODES_FIELD, DEFAULT_ERROR_DESCRIPTION_FIELD, DEFAULT_ERROR_FIELDS_FIELD,
    DEFAULT_NR_ERRORS_FIELD, DEFAULT_PIPELINE_NAME, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_ROWSET_SIZE, DEFAULT_SHUTDOWN_TIMEOUT_MS,
};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for a pipeline.
///
/// This struct represents the complete definition of a pipeline: engine
/// tuning, the transforms (graph nodes) and the hops (graph edges). It is
/// typically loaded from a YAML or TOML file.
///
/// # Fields
/// * `name` - Pipeline name used in logs and thread names (optional)
/// * `engine` - Engine tuning options (optional)
/// * `transforms` - The transforms that make up the graph
/// * `hops` - Directed edges between transforms (optional)
///
/// # Example
/// ```yaml
/// name: doubling
/// engine:
///   rowset_size: 1000
///   poll_interval_ms: 20
///   shutdown_timeout_ms: 2000
/// transforms:
///   - id: numbers
///     type: generate_rows
///     options:
///       field: value
///       values: [1, 2, 3]
///   - id: double
///     type: multiply
///     copies: 2
///     options:
///       field: value
///       factor: 2
/// hops:
///   - from: numbers
///     to: double
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_pipeline_name")]
    pub name: String,
    #[serde(default)]
    pub engine: EngineOptions,
    pub transforms: Vec<TransformConfig>,
    #[serde(default)]
    pub hops: Vec<HopConfig>,
}

fn default_pipeline_name() -> String {
    DEFAULT_PIPELINE_NAME.to_string()
}

impl PipelineConfig {
    /// Look up a transform definition by ID
    pub fn transform(&self, id: &str) -> Option<&TransformConfig> {
        self.transforms.iter().find(|t| t.id == id)
    }

    /// Hops that take part in execution
    pub fn enabled_hops(&self) -> impl Iterator<Item = &HopConfig> {
        self.hops.iter().filter(|h| h.enabled)
    }
}

/// Engine tuning options.
///
/// None of these affect results, only latency and memory use. All fields are
/// optional and fall back to the constants in [`crate::config::consts`].
///
/// # Fields
/// * `rowset_size` - Capacity of every row set, in rows
/// * `poll_interval_ms` - How often blocked waits re-check the stop signal
/// * `shutdown_timeout_ms` - How long workers get to finish after a stop
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EngineOptions {
    pub rowset_size: Option<usize>,
    pub poll_interval_ms: Option<u64>,
    pub shutdown_timeout_ms: Option<u64>,
}

impl EngineOptions {
    /// Get the row set capacity, using the built-in default if not configured.
    pub fn get_rowset_size(&self) -> usize {
        self.rowset_size.unwrap_or(DEFAULT_ROWSET_SIZE).max(1)
    }

    /// Get the poll interval, using the built-in default if not configured.
    pub fn get_poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.poll_interval_ms
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
                .max(1),
        )
    }

    /// Get the shutdown timeout, using the built-in default if not configured.
    pub fn get_shutdown_timeout(&self) -> Duration {
        Duration::from_millis(
            self.shutdown_timeout_ms
                .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_MS),
        )
    }
}

/// Configuration for a single transform in the graph.
///
/// # Fields
/// * `id` - Unique identifier for this transform
/// * `transform_type` - Registry identifier of the implementation (`type` in files)
/// * `copies` - Number of parallel workers running this transform
/// * `data_movement` - How rows are spread over multiple output hops
/// * `inject` - Whether external callers may push rows into this transform
/// * `error_handling` - Where failing rows are diverted to (optional)
/// * `options` - Transform-specific options
///
/// # Example
/// ```yaml
/// id: parse
/// type: parse_integer
/// copies: 2
/// error_handling:
///   target: rejects
///   max_errors: 10
/// options:
///   field: amount
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TransformConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub transform_type: String,
    #[serde(default = "default_copies")]
    pub copies: usize,
    #[serde(default)]
    pub data_movement: DataMovement,
    #[serde(default)]
    pub inject: bool,
    #[serde(default)]
    pub error_handling: Option<ErrorHandlingConfig>,
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>,
}

fn default_copies() -> usize {
    1
}

impl TransformConfig {
    /// A single-copy transform with no options, mostly useful in tests.
    pub fn new(id: impl Into<String>, transform_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            transform_type: transform_type.into(),
            copies: 1,
            data_movement: DataMovement::default(),
            inject: false,
            error_handling: None,
            options: HashMap::new(),
        }
    }

    pub fn with_copies(mut self, copies: usize) -> Self {
        self.copies = copies;
        self
    }

    pub fn with_option(mut self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    pub fn with_error_handling(mut self, error_handling: ErrorHandlingConfig) -> Self {
        self.error_handling = Some(error_handling);
        self
    }

    pub fn injectable(mut self) -> Self {
        self.inject = true;
        self
    }

    pub fn option(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.options.get(key)
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(|v| v.as_str())
    }
}

/// How a transform with several output hops spreads its rows.
///
/// Copies of one target transform always share their input row sets; this
/// only decides between distinct targets.
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataMovement {
    /// Every output hop receives every row
    #[default]
    Copy,
    /// Rows are handed to the output hops round-robin
    Distribute,
}

/// Error diversion settings for a transform.
///
/// # Example
/// ```yaml
/// error_handling:
///   target: rejects
///   max_errors: 100
///   description_field: why
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ErrorHandlingConfig {
    /// Transform receiving the diverted rows
    pub target: String,
    /// Maximum number of diverted errors per copy, unlimited when absent
    #[serde(default)]
    pub max_errors: Option<u64>,
    #[serde(default = "default_nr_errors_field")]
    pub nr_errors_field: String,
    #[serde(default = "default_description_field")]
    pub description_field: String,
    #[serde(default = "default_fields_field")]
    pub fields_field: String,
    #[serde(default = "default_codes_field")]
    pub codes_field: String,
}

fn default_nr_errors_field() -> String {
    DEFAULT_NR_ERRORS_FIELD.to_string()
}

fn default_description_field() -> String {
    DEFAULT_ERROR_DESCRIPTION_FIELD.to_string()
}

fn default_fields_field() -> String {
    DEFAULT_ERROR_FIELDS_FIELD.to_string()
}

fn default_codes_field() -> String {
    DEFAULT_ERROR_CODES_FIELD.to_string()
}

impl ErrorHandlingConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            max_errors: None,
            nr_errors_field: default_nr_errors_field(),
            description_field: default_description_field(),
            fields_field: default_fields_field(),
            codes_field: default_codes_field(),
        }
    }

    pub fn with_max_errors(mut self, max_errors: u64) -> Self {
        self.max_errors = Some(max_errors);
        self
    }
}

/// Directed edge between two transforms.
///
/// # Example
/// ```yaml
/// from: numbers
/// to: double
/// enabled: false
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HopConfig {
    pub from: String,
    pub to: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl HopConfig {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            enabled: true,
        }
    }
}

/// Load a pipeline definition from a YAML or TOML file.
///
/// The format is chosen by extension: `.toml` is parsed as TOML, anything
/// else as YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let cfg = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(cfg)
}

/// Load and validate a pipeline definition.
///
/// This function loads the definition and validates the hop graph to ensure
/// it's acyclic and all references are resolved.
pub fn load_and_validate_config<P: AsRef<Path>>(
    path: P,
) -> Result<PipelineConfig, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_pipeline(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}
