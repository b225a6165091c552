mod args;
mod commands;
pub mod defaults;
mod printing;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use args::InitArgs;
use commands::{export, init, inspect, run};

/// Evographs: evolutionary game dynamics on random graphs
///
/// Simulates a spatial Moran process: every generation one node reproduces in
/// proportion to its payoff-derived fitness and its offspring replaces a
/// neighbour, until one genotype holds the whole graph.
#[derive(Parser, Debug)]
#[command(name = "evographs")]
#[command(author, version, about = "Simulates the spatial Moran process on random graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a new simulation.
    ///
    /// Samples the graph, payoff matrix and initial genotypes and records
    /// generation 0, but does not run it yet.
    Init(Box<InitArgs>),

    /// Run an initialized simulation.
    ///
    /// Executes the simulation generation by generation.
    Run {
        /// Database path
        #[arg(short, long, default_value = defaults::OUTPUT_DB)]
        database: PathBuf,

        /// Resume from the last saved checkpoint
        ///
        /// Without it the run restarts from generation 0 and replaces any
        /// previously recorded generations.
        #[arg(long)]
        resume: bool,

        /// Record (and checkpoint) every N generations
        #[arg(long, default_value_t = defaults::RECORD_EVERY)]
        record_every: usize,

        /// Show progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Info: Show configuration and outcome of a simulation.
    Info {
        /// Database path
        #[arg(short, long, default_value = defaults::OUTPUT_DB)]
        database: PathBuf,
    },

    /// Generations: List recorded generations with genotype counts.
    Generations {
        /// Database path
        #[arg(short, long, default_value = defaults::OUTPUT_DB)]
        database: PathBuf,
    },

    /// Export the recorded history (CSV, JSON).
    ///
    /// Use this to feed a renderer or analyse runs in other tools.
    Export {
        /// Database path
        #[arg(short, long, default_value = defaults::OUTPUT_DB)]
        database: PathBuf,

        /// Generation(s) to export (e.g., "100", "0..1000", "10,20", "all")
        #[arg(short = 'g', long)]
        generations: Option<String>,

        /// Output format (csv, json)
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("evographs=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => {
            init::init_simulation(&args)?;
        }
        Commands::Run {
            database,
            resume,
            record_every,
            progress,
        } => {
            run::run_simulation(&database, resume, record_every, progress)?;
        }
        Commands::Info { database } => {
            inspect::show_info(&database)?;
        }
        Commands::Generations { database } => {
            inspect::show_generations(&database)?;
        }
        Commands::Export {
            database,
            generations,
            format,
            output,
        } => {
            export::export_data(&database, generations.as_deref(), &format, output.as_ref())?;
        }
    }

    Ok(())
}
