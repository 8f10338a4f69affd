use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bmc_bench::commands::{
    analyze_command, bounds_command, history_command, list_backends_command, run_command,
};
use bmc_bench_core::backends::BackendKind;

/// Bounded-model-checking experiment driver.
///
/// This CLI is a thin wrapper around `bmc-bench-core` (exposed in code as `bmc_bench_core`).
/// Diagnostics go to stderr (filter with `RUST_LOG`); stdout carries only results.
#[derive(Parser, Debug)]
#[command(
    name = "bmc-bench",
    version,
    about = "Run BMC backends over benchmarks and compare their logs",
    long_about = None
)]
struct Cli {
    /// Experiment config file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one backend over every benchmark in a directory.
    ///
    /// Logs land in `<output_dir>/<backend>/`, one per benchmark (two for rbmc).
    Run {
        /// Directory holding the benchmark sources (not searched recursively).
        dir: String,

        /// Backend to run: rbmc, kani, or esbmc.
        #[arg(long)]
        backend: BackendKind,
    },

    /// Normalize the logs of a previous run into a report.
    Analyze {
        /// Backend whose logs to read: rbmc, kani, or esbmc.
        #[arg(long)]
        backend: BackendKind,

        /// Emit JSON instead of the text table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the supported backends and how they are launched.
    Backends {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show the effective loop-bound table.
    Bounds {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List recorded invocations from the run ledger.
    History {
        #[arg(long)]
        backend: BackendKind,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli.config.as_deref();
    match cli.command {
        Command::Run { dir, backend } => run_command(config, &dir, backend)?,
        Command::Analyze { backend, json } => analyze_command(config, backend, json)?,
        Command::Backends { json } => list_backends_command(config, json)?,
        Command::Bounds { json } => bounds_command(config, json)?,
        Command::History { backend, json } => history_command(config, backend, json)?,
    }

    Ok(())
}
