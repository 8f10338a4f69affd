//! Experiment configuration.
//!
//! Every field has a default, so running without a config file is the common
//! case. A config file can be JSON or YAML (chosen by extension).

mod bounds;

pub use bounds::LoopBoundTable;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backends::BackendKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to parse config YAML at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Optional explicit executable per backend; `None` means look it up on `PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendPaths {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rbmc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kani: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esbmc: Option<String>,
}

impl BackendPaths {
    pub fn get(&self, kind: BackendKind) -> Option<&str> {
        match kind {
            BackendKind::Rbmc => self.rbmc.as_deref(),
            BackendKind::Kani => self.kani.as_deref(),
            BackendKind::Esbmc => self.esbmc.as_deref(),
        }
    }
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_record_history() -> bool {
    true
}

/// Serializable experiment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Output root; one subdirectory per backend is created beneath it.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub backends: BackendPaths,
    /// rbmc support library; defaults to `target/release/librbmc.rlib`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rbmc_library: Option<String>,
    /// Rust sysroot for rbmc's library search path; probed with rustc when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rust_sysroot: Option<String>,
    /// Kill a verifier still running after this many seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Extra or replacement unwind bounds, layered over the built-in table.
    #[serde(default)]
    pub loop_bounds: BTreeMap<String, u32>,
    /// Record each invocation in the run ledger.
    #[serde(default = "default_record_history")]
    pub record_history: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            backends: BackendPaths::default(),
            rbmc_library: None,
            rust_sysroot: None,
            timeout_secs: None,
            loop_bounds: BTreeMap::new(),
            record_history: default_record_history(),
        }
    }
}

impl ExperimentConfig {
    /// Effective loop-bound table (built-ins plus config entries).
    pub fn loop_bounds(&self) -> LoopBoundTable {
        LoopBoundTable::builtin().with_overrides(&self.loop_bounds)
    }

    /// Executable to launch for a backend.
    pub fn binary_for(&self, kind: BackendKind) -> PathBuf {
        PathBuf::from(self.backends.get(kind).unwrap_or_else(|| kind.verifier().default_binary()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Load a config file; YAML for `.yaml`/`.yml`, JSON otherwise.
pub fn load_config(path: &Path) -> Result<ExperimentConfig, ConfigError> {
    let body = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&body)
            .map_err(|source| ConfigError::Yaml { path: path.to_path_buf(), source }),
        _ => serde_json::from_str(&body)
            .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source }),
    }
}
