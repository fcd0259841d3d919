//! flowgraph-cli: a thin command-line transport over `flowgraph-core`.
//!
//! Reads a flow JSON document and an operation JSON document from disk,
//! applies the operation, and writes the resulting flow back out -- an
//! additive transport layer, not a second copy of the engine's logic.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use flowgraph_core::{
    apply, get_all_steps, get_import_operations, get_used_pieces, normalize, EngineConfig, Flow,
    Operation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Parser)]
#[command(name = "flowgraph", version, about = "Flow-graph transformation engine CLI")]
struct Cli {
    /// Output format for commands that print a flow or operation list
    #[arg(long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// Suppress informational logging
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a single operation to a flow and print the resulting flow
    Apply {
        /// Path to the flow JSON document
        flow: PathBuf,
        /// Path to the operation JSON document
        operation: PathBuf,
    },
    /// Strip sample data and credentials, and upgrade piece version pins
    Normalize {
        /// Path to the flow JSON document
        flow: PathBuf,
    },
    /// List every step name reachable from the trigger, in traversal order
    Steps {
        /// Path to the flow JSON document
        flow: PathBuf,
    },
    /// List the distinct piece names referenced by the flow
    Pieces {
        /// Path to the flow JSON document
        flow: PathBuf,
    },
    /// Linearize a step's subtree into a replayable sequence of ADD_ACTION operations
    ImportOps {
        /// Path to the flow JSON document
        flow: PathBuf,
        /// Name of the step whose subtree should be linearized
        step: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet { log::LevelFilter::Warn } else { log::LevelFilter::Info };
    env_logger::Builder::new().filter_level(level).format_timestamp(None).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    match &cli.command {
        Commands::Apply { flow, operation } => {
            let flow = read_flow(flow)?;
            let op = read_operation(operation)?;
            let result = apply(&flow, &op).map_err(|e| e.to_string())?;
            print_flow(&result, cli.output);
        }
        Commands::Normalize { flow } => {
            let flow = read_flow(flow)?;
            let result = normalize(&flow, &EngineConfig::default());
            print_flow(&result, cli.output);
        }
        Commands::Steps { flow } => {
            let flow = read_flow(flow)?;
            for step in get_all_steps(&flow.trigger) {
                println!("{}\t{}", step.name(), step.meta().display_name);
            }
        }
        Commands::Pieces { flow } => {
            let flow = read_flow(flow)?;
            for piece in get_used_pieces(&flow.trigger) {
                println!("{piece}");
            }
        }
        Commands::ImportOps { flow, step } => {
            let flow = read_flow(flow)?;
            let root = flowgraph_core::get_step(&flow, step)
                .ok_or_else(|| format!("no such step: {step}"))?;
            let ops = get_import_operations(root);
            print_value(&serde_json::to_value(&ops).map_err(|e| e.to_string())?, cli.output);
        }
    }
    Ok(())
}

fn read_flow(path: &PathBuf) -> Result<Flow, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("reading {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("parsing {}: {e}", path.display()))
}

fn read_operation(path: &PathBuf) -> Result<Operation, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("reading {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("parsing {}: {e}", path.display()))
}

fn print_flow(flow: &Flow, format: OutputFormat) {
    let value = serde_json::to_value(flow).expect("flow always serializes");
    print_value(&value, format);
}

fn print_value(value: &serde_json::Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{value}"),
        OutputFormat::Pretty => println!("{}", serde_json::to_string_pretty(value).expect("valid json")),
    }
}
