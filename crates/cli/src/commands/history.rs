use anyhow::{anyhow, Context, Result};

use bmc_bench_core::backends::BackendKind;
use bmc_bench_core::db::RunLedger;

use crate::commands::{experiment_layout, load_experiment_config};

/// List recorded invocations of `backend` from the run ledger.
pub fn history_command(config_path: Option<&str>, backend: BackendKind, json: bool) -> Result<()> {
    let config = load_experiment_config(config_path)?;
    let layout = experiment_layout(&config)?;
    if !layout.ledger_path.is_file() {
        return Err(anyhow!("No run ledger found at {}", layout.ledger_path.display()));
    }

    let ledger = RunLedger::open(&layout.ledger_path).with_context(|| {
        format!("Failed to open run ledger at {}", layout.ledger_path.display())
    })?;
    let records = ledger.list(Some(backend.as_str())).context("Failed to list invocations")?;

    if json {
        let serialized = serde_json::to_string_pretty(&records)
            .context("Failed to serialize invocations to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Invocations of {} ({}):", backend, records.len());
    if records.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for record in records {
        let status = match (record.timed_out, record.exit_code) {
            (true, _) => "timeout".to_string(),
            (false, Some(code)) => format!("exit {code}"),
            (false, None) => "killed".to_string(),
        };
        println!(
            "  - {} [{}] {} started={} hash={}",
            record.benchmark,
            record.strategy.as_deref().unwrap_or("-"),
            status,
            record.started_at,
            record.source_hash.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
