use std::path::Path;

use anyhow::{Context, Result};

use bmc_bench_core::config::{load_config, ExperimentConfig};
use bmc_bench_core::db::ExperimentLayout;

use crate::canonicalize_or_current;

/// Load the experiment config from `path`, or the defaults when no file is given.
pub fn load_experiment_config(path: Option<&str>) -> Result<ExperimentConfig> {
    match path {
        Some(path) => load_config(Path::new(path))
            .with_context(|| format!("Failed to load experiment config from {path}")),
        None => Ok(ExperimentConfig::default()),
    }
}

/// Resolve the output layout for a config (output dir made absolute).
pub fn experiment_layout(config: &ExperimentConfig) -> Result<ExperimentLayout> {
    let output_dir = canonicalize_or_current(&config.output_dir)?;
    Ok(ExperimentLayout::new(output_dir))
}
