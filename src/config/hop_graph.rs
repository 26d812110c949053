// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::config::PipelineConfig;

/// Adjacency view of a pipeline's execution graph.
///
/// Contains one edge per enabled hop plus one edge per error-handling
/// target. Disabled hops are not part of the graph at all. Edges reference
/// transforms by ID; edges whose endpoints don't exist are dropped, so build
/// the graph from a validated configuration.
///
/// # Examples
///
/// ```
/// use the_hopwood::config::{HopConfig, HopGraph, PipelineConfig, TransformConfig};
///
/// let config = PipelineConfig {
///     name: "example".to_string(),
///     engine: Default::default(),
///     transforms: vec![
///         TransformConfig::new("read", "generate_rows"),
///         TransformConfig::new("write", "dummy"),
///     ],
///     hops: vec![HopConfig::new("read", "write")],
/// };
///
/// let graph = HopGraph::from_config(&config);
/// assert_eq!(graph.successors("read"), &["write".to_string()]);
/// assert_eq!(graph.topological_order().unwrap(), vec!["read", "write"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HopGraph {
    /// Transform IDs in declaration order
    nodes: Vec<String>,
    successors: HashMap<String, Vec<String>>,
    predecessors: HashMap<String, Vec<String>>,
}

impl HopGraph {
    /// Build the execution graph from a pipeline definition
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut graph = Self::default();
        for transform in &config.transforms {
            graph.add_node(&transform.id);
        }
        for hop in config.enabled_hops() {
            graph.add_edge(&hop.from, &hop.to);
        }
        for transform in &config.transforms {
            if let Some(handling) = &transform.error_handling {
                graph.add_edge(&transform.id, &handling.target);
            }
        }
        graph
    }

    fn add_node(&mut self, id: &str) {
        if !self.successors.contains_key(id) {
            self.nodes.push(id.to_string());
            self.successors.insert(id.to_string(), Vec::new());
            self.predecessors.insert(id.to_string(), Vec::new());
        }
    }

    fn add_edge(&mut self, from: &str, to: &str) {
        if !self.successors.contains_key(from) || !self.successors.contains_key(to) {
            return;
        }
        if let Some(next) = self.successors.get_mut(from) {
            next.push(to.to_string());
        }
        if let Some(previous) = self.predecessors.get_mut(to) {
            previous.push(from.to_string());
        }
    }

    /// Transforms this one sends rows to
    pub fn successors(&self, id: &str) -> &[String] {
        self.successors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Transforms this one receives rows from
    pub fn predecessors(&self, id: &str) -> &[String] {
        self.predecessors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Transforms without incoming edges
    pub fn entry_points(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|id| self.predecessors(id).is_empty())
            .map(String::as_str)
            .collect()
    }

    /// Transforms without outgoing edges
    pub fn terminals(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|id| self.successors(id).is_empty())
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Topological order using Kahn's algorithm.
    ///
    /// Ties are broken by transform ID so the order is deterministic. Returns
    /// `None` if the graph contains a cycle.
    pub fn topological_order(&self) -> Option<Vec<&str>> {
        let mut in_degree: HashMap<&str, usize> = self
            .nodes
            .iter()
            .map(|id| (id.as_str(), self.predecessors(id).len()))
            .collect();

        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut queue: VecDeque<&str> = VecDeque::new();
        let mut order = Vec::with_capacity(self.nodes.len());

        loop {
            queue.extend(std::mem::take(&mut ready));
            let Some(id) = queue.pop_front() else {
                break;
            };
            order.push(id);

            for next in self.successors(id) {
                if let Some(degree) = in_degree.get_mut(next.as_str()) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(next.as_str());
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            Some(order)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ErrorHandlingConfig, HopConfig, TransformConfig};

    fn config(transforms: &[&str], hops: &[(&str, &str)]) -> PipelineConfig {
        PipelineConfig {
            name: "test".to_string(),
            engine: Default::default(),
            transforms: transforms
                .iter()
                .map(|id| TransformConfig::new(*id, "dummy"))
                .collect(),
            hops: hops.iter().map(|(f, t)| HopConfig::new(*f, *t)).collect(),
        }
    }

    #[test]
    fn test_linear_chain_order() {
        let graph = HopGraph::from_config(&config(&["c", "b", "a"], &[("a", "b"), ("b", "c")]));

        assert_eq!(graph.topological_order().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(graph.entry_points(), vec!["a"]);
        assert_eq!(graph.terminals(), vec!["c"]);
    }

    #[test]
    fn test_diamond_order_is_deterministic() {
        let graph = HopGraph::from_config(&config(
            &["a", "b", "c", "d"],
            &[("a", "c"), ("a", "b"), ("b", "d"), ("c", "d")],
        ));

        assert_eq!(graph.topological_order().unwrap(), vec!["a", "b", "c", "d"]);
        assert_eq!(graph.predecessors("d").len(), 2);
    }

    #[test]
    fn test_cycle_has_no_order() {
        let graph = HopGraph::from_config(&config(&["a", "b"], &[("a", "b"), ("b", "a")]));
        assert!(graph.topological_order().is_none());
    }

    #[test]
    fn test_disabled_hops_are_ignored() {
        let mut cfg = config(&["a", "b"], &[("a", "b")]);
        cfg.hops[0].enabled = false;

        let graph = HopGraph::from_config(&cfg);
        assert!(graph.successors("a").is_empty());
        assert_eq!(graph.entry_points(), vec!["a", "b"]);
    }

    #[test]
    fn test_error_targets_are_edges() {
        let mut cfg = config(&["parse", "rejects"], &[]);
        cfg.transforms[0].error_handling = Some(ErrorHandlingConfig::new("rejects"));

        let graph = HopGraph::from_config(&cfg);
        assert_eq!(graph.successors("parse"), &["rejects".to_string()]);
        assert_eq!(graph.predecessors("rejects"), &["parse".to_string()]);
    }
}
