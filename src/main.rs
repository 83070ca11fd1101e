//! traincraft - headless distillery simulation and model table tooling

mod config;
mod headless;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{TraincraftConfig, DEFAULT_CONFIG_PATH};
use std::path::PathBuf;
use tracing::info;
use traincraft_core::RegistryKey;
use traincraft_models::{ModelTable, RecordingSink, MODEL_UNIT_SCALE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Traincraft distillery simulation and model tables", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run distilleries headlessly and write their events as JSONL
    Simulate {
        /// Number of distilleries
        #[arg(long, default_value_t = 1)]
        machines: u32,
        /// Server ticks to run
        #[arg(long, default_value_t = 200)]
        ticks: u64,
        /// Batches of input loaded into each distillery
        #[arg(long, default_value_t = 2)]
        batches: u32,
        /// Fuel item placed in the burn slot
        #[arg(long, default_value = "minecraft:coal")]
        fuel: String,
        /// Fuel stack size
        #[arg(long, default_value_t = 1)]
        fuel_count: u32,
        /// Event log output
        #[arg(long, default_value = "target/distillery_events.jsonl")]
        events: PathBuf,
        /// Save directory; resumed when it already holds a store
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },
    /// Load a model table and print its statistics
    Model {
        /// Model name under the models directory, or a path to a JSON table
        #[arg(default_value = "caboose3")]
        model: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting traincraft v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = TraincraftConfig::load_from_path(&cli.config);

    match cli.command {
        Command::Simulate {
            machines,
            ticks,
            batches,
            fuel,
            fuel_count,
            events,
            save_dir,
        } => {
            let fuel = RegistryKey::parse(&fuel)
                .with_context(|| format!("Invalid fuel item {fuel:?}"))?;
            let summaries = headless::run(headless::SimulateConfig {
                config,
                machines,
                ticks,
                batches,
                fuel,
                fuel_count,
                events_path: events,
                save_dir,
            })?;
            println!("Ran {} distilleries for {ticks} ticks", summaries.len());
            for s in &summaries {
                println!(
                    "  {}: output {} fluid {} mB burn {} active {}",
                    s.pos, s.output, s.fluid, s.burn_time, s.active
                );
            }
        }
        Command::Model { model } => {
            let path = if model.ends_with(".json") {
                PathBuf::from(&model)
            } else {
                config.model_path(&model)
            };
            let table = ModelTable::load_from_file(&path)
                .with_context(|| format!("Failed to load model {}", path.display()))?;
            let mut sink = RecordingSink::default();
            table.render(MODEL_UNIT_SCALE, &mut sink);
            println!("{} ({} draws)", table.name, sink.drawn.len());
            match table.stats() {
                Some(stats) => {
                    println!(
                        "  boxes {} rotated {} volume {:.1}",
                        stats.boxes, stats.rotated, stats.volume
                    );
                    println!(
                        "  bounds {:?} .. {:?} size {:?}",
                        stats.bounds.min,
                        stats.bounds.max,
                        stats.bounds.size()
                    );
                }
                None => println!("  empty model"),
            }
        }
    }
    Ok(())
}
