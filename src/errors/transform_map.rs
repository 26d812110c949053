// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for transform registry resolution and transform instantiation.

use std::error::Error;
use std::fmt;

/// Errors that can occur while resolving transform types into instances
#[derive(Debug, Clone, PartialEq)]
pub enum TransformMapError {
    /// No constructor is registered for the transform's type identifier
    UnknownTransformType {
        transform_id: String,
        transform_type: String,
    },

    /// The constructor rejected the transform's configuration
    TransformCreationFailed {
        transform_id: String,
        transform_type: String,
        reason: String,
    },
}

impl fmt::Display for TransformMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformMapError::UnknownTransformType {
                transform_id,
                transform_type,
            } => {
                write!(
                    f,
                    "Transform type '{}' used by '{}' is not registered",
                    transform_type, transform_id
                )
            }
            TransformMapError::TransformCreationFailed {
                transform_id,
                transform_type,
                reason,
            } => {
                write!(
                    f,
                    "Failed to create {} transform '{}': {}",
                    transform_type, transform_id, reason
                )
            }
        }
    }
}

impl Error for TransformMapError {}
