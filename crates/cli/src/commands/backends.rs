use anyhow::Result;
use serde::Serialize;

use bmc_bench_core::backends::BackendKind;
use bmc_bench_core::config::ExperimentConfig;

use crate::commands::load_experiment_config;

#[derive(Debug, Serialize)]
pub struct BackendInfo {
    pub name: String,
    pub binary: String,
    pub extensions: Vec<String>,
    /// Strategy passes per benchmark; empty for single-pass backends.
    pub passes: Vec<String>,
    pub rewrites_harness: bool,
}

/// Describe one backend as configured.
pub fn backend_info(config: &ExperimentConfig, kind: BackendKind) -> BackendInfo {
    let verifier = kind.verifier();
    BackendInfo {
        name: kind.as_str().to_string(),
        binary: config.binary_for(kind).display().to_string(),
        extensions: verifier
            .accepted_sources()
            .iter()
            .map(|s| format!(".{}", s.extension()))
            .collect(),
        passes: verifier.strategies().iter().map(|s| s.as_str().to_string()).collect(),
        rewrites_harness: verifier.rewrites_harness(),
    }
}

/// List the supported verification backends.
pub fn list_backends_command(config_path: Option<&str>, json: bool) -> Result<()> {
    let config = load_experiment_config(config_path)?;
    let entries: Vec<BackendInfo> =
        BackendKind::ALL.iter().map(|kind| backend_info(&config, *kind)).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Backends:");
    for entry in entries {
        let passes =
            if entry.passes.is_empty() { "single".to_string() } else { entry.passes.join("+") };
        let harness = if entry.rewrites_harness { " (harness rewrite)" } else { "" };
        println!(
            "- {}: binary={} sources={} passes={}{}",
            entry.name,
            entry.binary,
            entry.extensions.join(","),
            passes,
            harness
        );
    }

    Ok(())
}
