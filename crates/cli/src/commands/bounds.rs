use anyhow::{Context, Result};

use crate::commands::load_experiment_config;

/// Print the effective loop-bound table (built-ins plus config overrides).
pub fn bounds_command(config_path: Option<&str>, json: bool) -> Result<()> {
    let config = load_experiment_config(config_path)?;
    let table = config.loop_bounds();

    if json {
        let serialized =
            serde_json::to_string_pretty(&table).context("Failed to serialize loop bounds")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Loop bounds ({}):", table.len());
    if table.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for (id, bound) in table.iter() {
        println!("  - {id}: {bound}");
    }
    Ok(())
}
