// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{PipelineConfig, TransformConfig, TransformConstructor, TransformRegistry};
use crate::errors::TransformMapError;
use crate::traits::Transform;

/// A transform whose type identifier has been resolved against a registry.
#[derive(Clone)]
pub struct ResolvedTransform {
    config: Arc<TransformConfig>,
    constructor: TransformConstructor,
}

impl ResolvedTransform {
    pub fn config(&self) -> &Arc<TransformConfig> {
        &self.config
    }

    /// Build a fresh instance for one copy.
    pub fn instantiate(&self) -> Result<Box<dyn Transform>, TransformMapError> {
        (self.constructor)(self.config.as_ref()).map_err(|reason| {
            TransformMapError::TransformCreationFailed {
                transform_id: self.config.id.clone(),
                transform_type: self.config.transform_type.clone(),
                reason,
            }
        })
    }
}

/// Every transform of a pipeline, resolved once at build time.
///
/// Resolution also instantiates each transform once and throws the instance
/// away, so option errors surface before a run is prepared rather than
/// halfway through allocating row sets.
#[derive(Clone, Default)]
pub struct TransformMap(HashMap<String, ResolvedTransform>);

impl TransformMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Resolve every transform of `cfg` against `registry`.
    pub fn from_config(
        cfg: &PipelineConfig,
        registry: &TransformRegistry,
    ) -> Result<Self, TransformMapError> {
        let mut map = HashMap::new();

        for transform in &cfg.transforms {
            let constructor = registry.get(&transform.transform_type).ok_or_else(|| {
                TransformMapError::UnknownTransformType {
                    transform_id: transform.id.clone(),
                    transform_type: transform.transform_type.clone(),
                }
            })?;

            let resolved = ResolvedTransform {
                config: Arc::new(transform.clone()),
                constructor: Arc::clone(constructor),
            };
            resolved.instantiate()?;

            map.insert(transform.id.clone(), resolved);
        }

        Ok(Self(map))
    }

    pub fn get(&self, id: &str) -> Option<&ResolvedTransform> {
        self.0.get(id)
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
