//! Pipeline validation for graph integrity and executability.
//!
//! This module checks a [`PipelineConfig`] before any row set or worker is
//! created. The checks run in a fixed order so that messages stay meaningful:
//!
//! 1. **Uniqueness**: transform IDs are unique and every transform has at
//!    least one copy
//! 2. **References**: every enabled hop and every error-handling target
//!    resolves to an existing transform, and no hop is declared twice
//! 3. **Cycle detection**: DFS over enabled hops plus error edges
//!
//! Cycle detection needs a structurally valid graph, so it only runs when
//! the first two stages found nothing.
//!
//! # Examples
//!
//! ```rust
//! use the_hopwood::config::{validate_pipeline, HopConfig, PipelineConfig, TransformConfig};
//! use the_hopwood::errors::ValidationError;
//!
//! let config = PipelineConfig {
//!     name: "broken".to_string(),
//!     engine: Default::default(),
//!     transforms: vec![TransformConfig::new("a", "dummy")],
//!     hops: vec![HopConfig::new("a", "nowhere")],
//! };
//!
//! let errors = validate_pipeline(&config).unwrap_err();
//! assert!(matches!(errors[0], ValidationError::UnresolvedHop { .. }));
//! ```

use std::collections::{HashMap, HashSet};

use crate::config::PipelineConfig;
use crate::errors::ValidationError;
use crate::observability::messages::validation::{
    CyclicHopDetected, DuplicateTransformIdDetected, UnresolvedReferenceDetected,
};
use crate::observability::messages::StructuredLog;

/// Validates a pipeline definition for structural integrity and executability.
///
/// All errors found in one stage are reported together so users can fix them
/// in one pass.
///
/// # Returns
///
/// * `Ok(())` - The pipeline can be executed
/// * `Err(Vec<ValidationError>)` - Every problem found
pub fn validate_pipeline(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(duplicate_errors) = validate_unique_transform_ids(config) {
        errors.extend(duplicate_errors);
    }

    if let Err(copy_errors) = validate_copy_counts(config) {
        errors.extend(copy_errors);
    }

    if let Err(reference_errors) = validate_references(config) {
        errors.extend(reference_errors);
    }

    // Cycle detection needs a graph whose edges all resolve
    if errors.is_empty() {
        if let Err(cycle_errors) = validate_acyclic_graph(config) {
            errors.extend(cycle_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_unique_transform_ids(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut seen_ids = HashSet::new();
    let mut errors = Vec::new();

    for transform in &config.transforms {
        if !seen_ids.insert(&transform.id) {
            DuplicateTransformIdDetected {
                transform_id: &transform.id,
            }
            .log();
            errors.push(ValidationError::DuplicateTransformId {
                transform_id: transform.id.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_copy_counts(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<ValidationError> = config
        .transforms
        .iter()
        .filter(|t| t.copies == 0)
        .map(|t| ValidationError::InvalidCopyCount {
            transform_id: t.id.clone(),
            copies: t.copies,
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks that hops and error targets point at existing transforms.
///
/// Disabled hops are not executed, but a dangling disabled hop is still
/// reported: it almost always means a transform was renamed.
fn validate_references(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let transform_ids: HashSet<&String> = config.transforms.iter().map(|t| &t.id).collect();
    let mut seen_hops = HashSet::new();
    let mut errors = Vec::new();

    for hop in &config.hops {
        for endpoint in [&hop.from, &hop.to] {
            if !transform_ids.contains(endpoint) {
                UnresolvedReferenceDetected {
                    referenced_by: &hop.from,
                    missing: endpoint,
                }
                .log();
                errors.push(ValidationError::UnresolvedHop {
                    from: hop.from.clone(),
                    to: hop.to.clone(),
                    missing_transform: endpoint.clone(),
                });
            }
        }

        if hop.enabled && !seen_hops.insert((&hop.from, &hop.to)) {
            errors.push(ValidationError::DuplicateHop {
                from: hop.from.clone(),
                to: hop.to.clone(),
            });
        }
    }

    for transform in &config.transforms {
        let Some(handling) = &transform.error_handling else {
            continue;
        };
        if handling.target == transform.id {
            errors.push(ValidationError::SelfErrorTarget {
                transform_id: transform.id.clone(),
            });
        } else if !transform_ids.contains(&handling.target) {
            UnresolvedReferenceDetected {
                referenced_by: &transform.id,
                missing: &handling.target,
            }
            .log();
            errors.push(ValidationError::UnresolvedErrorTarget {
                transform_id: transform.id.clone(),
                target: handling.target.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// DFS with a recursion stack over enabled hops and error edges.
///
/// Transforms are visited in declaration order so the reported cycle is
/// stable between runs.
fn validate_acyclic_graph(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut graph: HashMap<&str, Vec<&str>> = HashMap::new();
    for transform in &config.transforms {
        graph.insert(&transform.id, Vec::new());
    }
    for hop in config.enabled_hops() {
        if let Some(next) = graph.get_mut(hop.from.as_str()) {
            next.push(&hop.to);
        }
    }
    for transform in &config.transforms {
        if let Some(handling) = &transform.error_handling {
            if let Some(next) = graph.get_mut(transform.id.as_str()) {
                next.push(&handling.target);
            }
        }
    }

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for transform in &config.transforms {
        if !visited.contains(transform.id.as_str()) {
            if let Some(cycle) = dfs_cycle_detection(
                &transform.id,
                &graph,
                &mut visited,
                &mut rec_stack,
                &mut path,
            ) {
                let cycle_refs: Vec<&str> = cycle.iter().map(String::as_str).collect();
                CyclicHopDetected { cycle: &cycle_refs }.log();
                return Err(vec![ValidationError::CyclicHop { cycle }]);
            }
        }
    }

    Ok(())
}

/// Returns the cycle path, closed with the repeated first node, if one is
/// reachable from `node`.
fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                let cycle_start = path.iter().position(|&x| x == neighbor).unwrap_or(0);
                let mut cycle: Vec<String> =
                    path[cycle_start..].iter().map(|s| s.to_string()).collect();
                cycle.push(neighbor.to_string());
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}
