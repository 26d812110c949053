// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use the_hopwood::config::{HopGraph, RuntimeBuilder};
use the_hopwood::engine::{PipelineResult, PipelineStatus, RowCollector};
use the_hopwood::row::{Row, RowMeta, Value, ValueMeta, ValueType};

/// Field name of the rows built from command line values
const INJECTED_FIELD: &str = "value";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <pipeline.yaml|pipeline.toml> [value ...]", args[0]);
        eprintln!("Example: {} configs/linear-doubling.yaml", args[0]);
        eprintln!("Example: {} configs/injected-filter.toml 4 12 x 40", args[0]);
        std::process::exit(2);
    }

    let config_file = &args[1];
    let values = &args[2..];

    let builder = RuntimeBuilder::from_file(config_file)
        .with_context(|| format!("loading {}", config_file))?;
    let config = builder.config().clone();
    let injection_points: Vec<String> = config
        .transforms
        .iter()
        .filter(|t| t.inject)
        .map(|t| t.id.clone())
        .collect();
    if !values.is_empty() && injection_points.is_empty() {
        bail!(
            "{} has no injection transform (`inject: true`) to receive {} value(s)",
            config_file,
            values.len()
        );
    }

    let mut orchestrator = builder.build().context("building pipeline")?;

    println!("📋 Pipeline: {} ({})", orchestrator.pipeline_name(), config_file);
    println!(
        "🔧 Transforms: {}, hops: {}",
        config.transforms.len(),
        config.enabled_hops().count()
    );

    orchestrator.prepare().context("preparing pipeline")?;

    let graph = HopGraph::from_config(&config);
    let mut outputs: Vec<(String, Arc<RowCollector>)> = Vec::new();
    for terminal in graph.terminals() {
        let collector = RowCollector::new();
        orchestrator.add_row_listener(terminal, collector.clone())?;
        outputs.push((terminal.to_string(), collector));
    }

    let mut producers = Vec::new();
    for transform_id in &injection_points {
        producers.push(orchestrator.row_producer(transform_id)?);
    }

    orchestrator.start().context("starting pipeline")?;

    let meta = Arc::new(RowMeta::new(vec![ValueMeta::new(
        INJECTED_FIELD,
        ValueType::String,
    )]));
    'inject: for producer in producers {
        for value in values {
            let row = Row::new(vec![Value::from(value.as_str())]);
            if let Err(e) = producer.put_row(Arc::clone(&meta), row) {
                // the run is ending; its result says why
                eprintln!("⚠️  Injection into {} stopped: {}", producer.transform_id(), e);
                break 'inject;
            }
        }
        producer.finished();
    }

    let result = orchestrator.wait().context("waiting for pipeline")?;

    println!("\n📤 Output:");
    for (transform_id, collector) in &outputs {
        for (meta, row) in collector.written_rows() {
            println!("  {} {}", transform_id, serde_json::to_string(&row.to_json(&meta))?);
        }
    }

    print_summary(&result);

    if result.status != PipelineStatus::Finished {
        std::process::exit(1);
    }
    Ok(())
}

fn print_summary(result: &PipelineResult) {
    println!("\n📊 Execution Results:");
    println!("⏱️  Execution Time: {:?}", result.duration);
    println!("🏁 Status: {}", result.status);
    println!("\n🔄 Transforms:");
    for summary in &result.transforms {
        let counters = &summary.counters;
        println!(
            "  {}.{} [{}] read={} written={} rejected={} errors={}",
            summary.transform_id,
            summary.copy_nr,
            summary.status,
            counters.lines_read,
            counters.lines_written,
            counters.lines_rejected,
            counters.errors,
        );
        if let Some(error) = &summary.error {
            println!("     ❌ {}", error);
        }
    }
}
