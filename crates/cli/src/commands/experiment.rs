use std::fs;

use anyhow::{Context, Result};

use bmc_bench_core::analysis::analyze;
use bmc_bench_core::backends::BackendKind;
use bmc_bench_core::db::RunLedger;
use bmc_bench_core::report::{render, render_json};
use bmc_bench_core::services::experiment::Experiment;
use bmc_bench_core::services::invoker::SystemLauncher;

use crate::canonicalize_or_current;
use crate::commands::{experiment_layout, load_experiment_config};

/// Run one backend over every benchmark in `dir`.
pub fn run_command(config_path: Option<&str>, dir: &str, backend: BackendKind) -> Result<()> {
    let config = load_experiment_config(config_path)?;
    let layout = experiment_layout(&config)?;
    let bench_dir = canonicalize_or_current(dir)?;

    fs::create_dir_all(&layout.output_dir).with_context(|| {
        format!("Failed to create output dir: {}", layout.output_dir.display())
    })?;
    let ledger = if config.record_history {
        Some(RunLedger::open(&layout.ledger_path).with_context(|| {
            format!("Failed to open run ledger at {}", layout.ledger_path.display())
        })?)
    } else {
        None
    };

    let launcher = SystemLauncher::new(config.timeout());
    let experiment = Experiment {
        config: &config,
        layout: &layout,
        launcher: &launcher,
        ledger: ledger.as_ref(),
    };
    let reports = experiment
        .run(&bench_dir, backend)
        .with_context(|| format!("Experiment with {backend} failed"))?;

    println!("Ran {} invocation(s) with {}:", reports.len(), backend);
    for report in &reports {
        let status = if report.outcome.timed_out {
            "timeout".to_string()
        } else {
            match report.outcome.exit_code {
                Some(code) => format!("exit {code}"),
                None => "killed".to_string(),
            }
        };
        let tag = report.strategy.map(|s| format!(" [{s}]")).unwrap_or_default();
        println!(
            "  - {}{} {} ({:.3}s) -> {}",
            report.benchmark,
            tag,
            status,
            report.outcome.elapsed.as_secs_f64(),
            report.log_path.display()
        );
    }
    Ok(())
}

/// Analyze the logs a previous run left for `backend` and print the report.
pub fn analyze_command(config_path: Option<&str>, backend: BackendKind, json: bool) -> Result<()> {
    let config = load_experiment_config(config_path)?;
    let layout = experiment_layout(&config)?;
    let log_dir = layout.backend_dir(backend);

    // Everything is parsed before anything is printed, so a bad log never
    // produces a partial report.
    let report = analyze(backend, &log_dir)
        .with_context(|| format!("Failed to analyze {} logs", backend))?;

    if json {
        let serialized = render_json(&report).context("Failed to serialize report to JSON")?;
        println!("{}", serialized);
    } else {
        print!("{}", render(&report));
    }
    Ok(())
}
