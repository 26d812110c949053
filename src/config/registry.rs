// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::backends::local::LocalTransformFactory;
use crate::config::TransformConfig;
use crate::traits::Transform;

/// Builds one transform instance from its configuration.
///
/// Called once per copy, so every copy owns independent state.
pub type TransformConstructor =
    Arc<dyn Fn(&TransformConfig) -> Result<Box<dyn Transform>, String> + Send + Sync>;

/// Maps transform type identifiers (`type:` in pipeline files) to constructors.
///
/// # Examples
///
/// ```
/// use the_hopwood::config::TransformRegistry;
///
/// let registry = TransformRegistry::with_builtins();
/// assert!(registry.contains("multiply"));
/// assert!(!registry.contains("send_mail"));
/// ```
#[derive(Clone, Default)]
pub struct TransformRegistry {
    constructors: HashMap<String, TransformConstructor>,
}

impl TransformRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every local transform shipped with the crate.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for transform_type in LocalTransformFactory::list_available_implementations() {
            registry.register(transform_type, LocalTransformFactory::create_transform);
        }
        registry
    }

    /// Register a constructor, replacing any previous one for the same type.
    pub fn register<F>(&mut self, transform_type: impl Into<String>, constructor: F)
    where
        F: Fn(&TransformConfig) -> Result<Box<dyn Transform>, String> + Send + Sync + 'static,
    {
        self.constructors
            .insert(transform_type.into(), Arc::new(constructor));
    }

    pub fn get(&self, transform_type: &str) -> Option<&TransformConstructor> {
        self.constructors.get(transform_type)
    }

    pub fn contains(&self, transform_type: &str) -> bool {
        self.constructors.contains_key(transform_type)
    }

    /// Registered type identifiers, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("types", &self.types())
            .finish()
    }
}
