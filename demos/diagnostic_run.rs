//! Run one diagnostic experiment from an optional JSON configuration.
//!
//! ```text
//! cargo run --example diagnostic_run -- [config.json] [generations]
//! cargo run --example diagnostic_run -- --example-config
//! ```
//!
//! Set `RUST_LOG=info` (or `debug`) for per-generation output.

use std::fs;
use std::process;

use selection_diagnostics::{DiagnosticWorld, ExperimentConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.get(1).is_some_and(|a| a == "--example-config") {
        match ExperimentConfig::default().to_json_string() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing config: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let mut config = match args.get(1) {
        Some(path) => {
            let text = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading config file {path}: {e}");
                process::exit(1);
            });
            ExperimentConfig::from_json_str(&text).unwrap_or_else(|e| {
                eprintln!("Error loading config: {e}");
                process::exit(1);
            })
        }
        None => ExperimentConfig {
            population_size: 128,
            objective_count: 20,
            generations: 200,
            target: 10.0,
            accuracy: 0.5,
            ..Default::default()
        },
    };
    if let Some(generations) = args.get(2).and_then(|s| s.parse().ok()) {
        config.generations = generations;
    }

    let mut world = DiagnosticWorld::from_config(&config).unwrap_or_else(|e| {
        eprintln!("Error building world: {e}");
        process::exit(1);
    });

    let history = world.run(config.generations).unwrap_or_else(|e| {
        eprintln!("Run aborted at generation {}: {e}", world.generation());
        process::exit(1);
    });

    for stats in history.iter().step_by((config.generations / 10).max(1)) {
        println!(
            "Gen {:>5}: best {:>9.3}  mean {:>9.3}  max optimized {:>3}  unique optimized {:>3}",
            stats.generation,
            stats.best_aggregate,
            stats.mean_aggregate,
            stats.max_optimized,
            stats.unique_optimized
        );
    }
    if let Some(last) = history.last() {
        println!(
            "Finished {} generations; {} of {} objectives optimized somewhere in the population.",
            history.len(),
            last.unique_optimized,
            config.objective_count
        );
    }
}
