// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

/// Errors that can occur during pipeline graph validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A cycle was detected across enabled hops and error-handling edges
    CyclicHop {
        /// The cycle path, first and last element are the same transform
        cycle: Vec<String>,
    },
    /// A hop references a transform that doesn't exist
    UnresolvedHop {
        from: String,
        to: String,
        /// The endpoint that couldn't be resolved
        missing_transform: String,
    },
    /// Error handling points at a transform that doesn't exist
    UnresolvedErrorTarget {
        transform_id: String,
        target: String,
    },
    /// Error handling points back at the failing transform itself
    SelfErrorTarget { transform_id: String },
    /// A transform has a duplicate ID
    DuplicateTransformId { transform_id: String },
    /// The same enabled hop is declared twice
    DuplicateHop { from: String, to: String },
    /// A transform declares fewer than one copy
    InvalidCopyCount { transform_id: String, copies: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CyclicHop { cycle } => {
                write!(f, "Cyclic hop detected: {}", cycle.join(" -> "))
            }
            ValidationError::UnresolvedHop {
                from,
                to,
                missing_transform,
            } => {
                write!(
                    f,
                    "Hop '{}' -> '{}' references transform '{}' which does not exist",
                    from, to, missing_transform
                )
            }
            ValidationError::UnresolvedErrorTarget {
                transform_id,
                target,
            } => {
                write!(
                    f,
                    "Transform '{}' diverts errors to '{}' which does not exist",
                    transform_id, target
                )
            }
            ValidationError::SelfErrorTarget { transform_id } => {
                write!(
                    f,
                    "Transform '{}' cannot divert errors to itself",
                    transform_id
                )
            }
            ValidationError::DuplicateTransformId { transform_id } => {
                write!(f, "Duplicate transform ID: '{}'", transform_id)
            }
            ValidationError::DuplicateHop { from, to } => {
                write!(f, "Duplicate hop: '{}' -> '{}'", from, to)
            }
            ValidationError::InvalidCopyCount {
                transform_id,
                copies,
            } => {
                write!(
                    f,
                    "Transform '{}' declares {} copies, at least 1 is required",
                    transform_id, copies
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a pipeline definition from disk.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read pipeline file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML pipeline definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML pipeline definition: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration validation failed:\n{}", join_lines(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_lines(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
