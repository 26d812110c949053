// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Row set allocation for one run.
//!
//! * one row set per (enabled hop, producing copy); every copy of the
//!   consuming transform reads from it, so copies compete for rows
//! * one error row set per copy of a transform with error handling, read by
//!   every copy of the error target; the copies share one error count
//! * one injector row set per transform marked `inject`, read by every copy

use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::engine::context::{CopyWiring, OutputHop, RunContext};
use crate::rowset::RowSet;

pub(crate) struct Topology {
    wiring: HashMap<(String, usize), CopyWiring>,
    injectors: HashMap<String, Arc<RowSet>>,
    rowset_count: usize,
}

impl Topology {
    pub fn build(config: &PipelineConfig, run: &RunContext) -> Self {
        let capacity = config.engine.get_rowset_size();
        let new_rowset = |origin: String, destination: String| {
            Arc::new(RowSet::with_stop_signal(
                origin,
                destination,
                capacity,
                run.poll_interval(),
                run.stop_signal().clone(),
            ))
        };

        let copies: HashMap<&str, usize> = config
            .transforms
            .iter()
            .map(|t| (t.id.as_str(), t.copies))
            .collect();

        let mut wiring: HashMap<(String, usize), CopyWiring> = HashMap::new();
        for transform in &config.transforms {
            for copy_nr in 0..transform.copies {
                wiring.insert((transform.id.clone(), copy_nr), CopyWiring::default());
            }
        }

        let mut rowset_count = 0;
        let mut connect = |rowset: &Arc<RowSet>, consumer: &str| {
            for copy_nr in 0..copies.get(consumer).copied().unwrap_or(0) {
                if let Some(w) = wiring.get_mut(&(consumer.to_string(), copy_nr)) {
                    w.inputs.push(Arc::clone(rowset));
                }
            }
        };

        let mut outputs: Vec<((String, usize), OutputHop)> = Vec::new();
        let mut error_rowsets: Vec<((String, usize), Arc<RowSet>, Arc<AtomicU64>)> = Vec::new();

        for hop in config.enabled_hops() {
            let Some(&producer_copies) = copies.get(hop.from.as_str()) else {
                continue;
            };
            for copy_nr in 0..producer_copies {
                let rowset = new_rowset(format!("{}.{}", hop.from, copy_nr), hop.to.clone());
                connect(&rowset, &hop.to);
                outputs.push((
                    (hop.from.clone(), copy_nr),
                    OutputHop {
                        target: hop.to.clone(),
                        rowset,
                    },
                ));
                rowset_count += 1;
            }
        }

        for transform in &config.transforms {
            let Some(handling) = &transform.error_handling else {
                continue;
            };
            let error_count = Arc::new(AtomicU64::new(0));
            for copy_nr in 0..transform.copies {
                let rowset = new_rowset(
                    format!("{}.{}", transform.id, copy_nr),
                    format!("{} (errors)", handling.target),
                );
                connect(&rowset, &handling.target);
                error_rowsets.push((
                    (transform.id.clone(), copy_nr),
                    rowset,
                    Arc::clone(&error_count),
                ));
                rowset_count += 1;
            }
        }

        let mut injectors = HashMap::new();
        for transform in config.transforms.iter().filter(|t| t.inject) {
            let rowset = new_rowset("producer".to_string(), transform.id.clone());
            connect(&rowset, &transform.id);
            injectors.insert(transform.id.clone(), rowset);
            rowset_count += 1;
        }

        for (key, output) in outputs {
            if let Some(w) = wiring.get_mut(&key) {
                w.outputs.push(output);
            }
        }
        for (key, rowset, error_count) in error_rowsets {
            if let Some(w) = wiring.get_mut(&key) {
                w.error_rowset = Some(rowset);
                w.error_count = Some(error_count);
            }
        }

        Self {
            wiring,
            injectors,
            rowset_count,
        }
    }

    /// Hand out the wiring of one copy. Each copy's wiring can be taken once.
    pub fn take_wiring(&mut self, transform_id: &str, copy_nr: usize) -> CopyWiring {
        self.wiring
            .remove(&(transform_id.to_string(), copy_nr))
            .unwrap_or_default()
    }

    pub fn into_injectors(self) -> HashMap<String, Arc<RowSet>> {
        self.injectors
    }

    pub fn rowset_count(&self) -> usize {
        self.rowset_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ErrorHandlingConfig, HopConfig, TransformConfig};
    use std::time::Duration;

    fn run() -> RunContext {
        RunContext::new("test", HashMap::new(), Duration::from_millis(5))
    }

    #[test]
    fn test_rowset_per_hop_and_producer_copy() {
        let config = PipelineConfig {
            name: "test".to_string(),
            engine: Default::default(),
            transforms: vec![
                TransformConfig::new("gen", "generate_rows"),
                TransformConfig::new("work", "dummy").with_copies(4),
                TransformConfig::new("sink", "dummy"),
            ],
            hops: vec![HopConfig::new("gen", "work"), HopConfig::new("work", "sink")],
        };

        let mut topology = Topology::build(&config, &run());
        // 1 for gen -> work, 4 for work.N -> sink
        assert_eq!(topology.rowset_count(), 5);

        let gen = topology.take_wiring("gen", 0);
        assert!(gen.inputs.is_empty());
        assert_eq!(gen.outputs.len(), 1);

        let work: Vec<CopyWiring> = (0..4).map(|c| topology.take_wiring("work", c)).collect();
        for w in &work {
            assert_eq!(w.inputs.len(), 1);
            assert!(Arc::ptr_eq(&w.inputs[0], &gen.outputs[0].rowset));
            assert_eq!(w.outputs.len(), 1);
        }

        let sink = topology.take_wiring("sink", 0);
        assert_eq!(sink.inputs.len(), 4);
        assert!(sink.outputs.is_empty());
    }

    #[test]
    fn test_disabled_hops_get_no_rowset() {
        let mut hop = HopConfig::new("a", "b");
        hop.enabled = false;
        let config = PipelineConfig {
            name: "test".to_string(),
            engine: Default::default(),
            transforms: vec![
                TransformConfig::new("a", "dummy"),
                TransformConfig::new("b", "dummy"),
            ],
            hops: vec![hop],
        };

        let mut topology = Topology::build(&config, &run());
        assert_eq!(topology.rowset_count(), 0);
        assert!(topology.take_wiring("b", 0).inputs.is_empty());
    }

    #[test]
    fn test_error_and_injector_rowsets() {
        let config = PipelineConfig {
            name: "test".to_string(),
            engine: Default::default(),
            transforms: vec![
                TransformConfig::new("input", "dummy").injectable(),
                TransformConfig::new("parse", "parse_integer")
                    .with_copies(2)
                    .with_error_handling(ErrorHandlingConfig::new("rejects")),
                TransformConfig::new("rejects", "dummy"),
            ],
            hops: vec![HopConfig::new("input", "parse")],
        };

        let mut topology = Topology::build(&config, &run());
        // input -> parse, two error row sets, one injector
        assert_eq!(topology.rowset_count(), 4);

        let parse0 = topology.take_wiring("parse", 0);
        let parse1 = topology.take_wiring("parse", 1);
        assert!(parse0.error_rowset.is_some());
        assert!(parse1.error_rowset.is_some());
        let (count0, count1) = (parse0.error_count.unwrap(), parse1.error_count.unwrap());
        assert!(Arc::ptr_eq(&count0, &count1));

        let rejects = topology.take_wiring("rejects", 0);
        assert_eq!(rejects.inputs.len(), 2);

        let input = topology.take_wiring("input", 0);
        assert_eq!(input.inputs.len(), 1);
        let injectors = topology.into_injectors();
        assert!(Arc::ptr_eq(&injectors["input"], &input.inputs[0]));
    }
}
