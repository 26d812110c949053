// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use std::time::Duration;

    use crate::config::{
        load_and_validate_config, load_config, DataMovement, HopGraph, RuntimeBuilder,
        TransformMap, TransformRegistry,
    };
    use crate::engine::{PipelineStatus, RowCollector};
    use crate::row::Value;

    /// Test that the linear sample pipeline loads with its engine options
    #[test]
    fn test_linear_doubling_yaml_loading() {
        let config = load_and_validate_config("configs/linear-doubling.yaml").unwrap();

        assert_eq!(config.name, "linear-doubling");
        assert_eq!(config.engine.get_rowset_size(), 100);
        assert_eq!(config.engine.get_poll_interval(), Duration::from_millis(20));
        assert_eq!(config.transforms.len(), 3);
        assert_eq!(config.transforms[0].id, "numbers");
        assert_eq!(config.transforms[1].transform_type, "multiply");
        assert_eq!(config.hops.len(), 2);

        let graph = HopGraph::from_config(&config);
        assert_eq!(graph.entry_points(), vec!["numbers"]);
        assert_eq!(graph.terminals(), vec!["log"]);
    }

    /// Test copies and data movement defaults on the fan-out sample
    #[test]
    fn test_fan_out_yaml_loading() {
        let config = load_and_validate_config("configs/fan-out.yaml").unwrap();

        let work = config.transform("work").unwrap();
        assert_eq!(work.copies, 4);
        assert_eq!(work.data_movement, DataMovement::Copy);
        assert_eq!(config.engine.get_rowset_size(), 10);
    }

    /// Test that error handling settings and renamed fields survive loading
    #[test]
    fn test_error_diversion_yaml_loading() {
        let config = load_and_validate_config("configs/error-diversion.yaml").unwrap();

        let handling = config
            .transform("parse")
            .and_then(|t| t.error_handling.as_ref())
            .unwrap();
        assert_eq!(handling.target, "rejects");
        assert_eq!(handling.max_errors, Some(10));
        assert_eq!(handling.description_field, "reason");
        assert_eq!(handling.nr_errors_field, "nr_errors");

        // the error edge makes rejects reachable
        let graph = HopGraph::from_config(&config);
        assert_eq!(graph.predecessors("rejects"), &["parse".to_string()]);
    }

    /// Test the TOML sample: injection flag, inline options and disabled hops
    #[test]
    fn test_injected_filter_toml_loading() {
        let config = load_and_validate_config("configs/injected-filter.toml").unwrap();

        assert_eq!(config.name, "injected-filter");
        assert!(config.transform("input").unwrap().inject);
        assert_eq!(
            config.transform("split").unwrap().option_str("send_true_to"),
            Some("large")
        );
        assert_eq!(config.hops.len(), 5);
        assert_eq!(config.enabled_hops().count(), 4);
    }

    /// Every sample resolves against the built-in registry
    #[test]
    fn test_samples_resolve_against_builtins() {
        let registry = TransformRegistry::with_builtins();
        for path in [
            "configs/linear-doubling.yaml",
            "configs/fan-out.yaml",
            "configs/error-diversion.yaml",
            "configs/injected-filter.toml",
        ] {
            let config = load_config(path).unwrap();
            let transforms = TransformMap::from_config(&config, &registry)
                .unwrap_or_else(|e| panic!("{} failed to resolve: {}", path, e));
            assert_eq!(transforms.len(), config.transforms.len(), "{}", path);
        }
    }

    /// Run the linear sample end to end
    #[test]
    fn test_run_linear_doubling_from_file() {
        let mut orchestrator = RuntimeBuilder::from_file("configs/linear-doubling.yaml")
            .unwrap()
            .build()
            .unwrap();
        let collector = RowCollector::new();

        orchestrator.prepare().unwrap();
        orchestrator.add_row_listener("log", collector.clone()).unwrap();
        orchestrator.start().unwrap();
        let result = orchestrator.wait().unwrap();

        assert_eq!(result.status, PipelineStatus::Finished);
        assert_eq!(
            collector.written_values("value"),
            vec![Value::Integer(2), Value::Integer(4), Value::Integer(6)]
        );
    }

    /// Run the error diversion sample end to end
    #[test]
    fn test_run_error_diversion_from_file() {
        let mut orchestrator = RuntimeBuilder::from_file("configs/error-diversion.yaml")
            .unwrap()
            .build()
            .unwrap();
        let rejects = RowCollector::new();

        orchestrator.prepare().unwrap();
        orchestrator.add_row_listener("rejects", rejects.clone()).unwrap();
        orchestrator.start().unwrap();
        let result = orchestrator.wait().unwrap();

        assert_eq!(result.status, PipelineStatus::FinishedWithErrors);
        assert_eq!(result.diverted_rows(), 2);
        assert_eq!(result.totals("valid").lines_read, 3);

        let reasons: Vec<String> = rejects
            .read_rows()
            .iter()
            .map(|(meta, row)| row.value_of(meta, "reason").unwrap().to_string())
            .collect();
        assert_eq!(reasons.len(), 2);
        assert!(reasons[0].contains("'x'"));
    }
}
