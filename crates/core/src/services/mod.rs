//! Experiment services: backend conventions, process invocation, orchestration.

pub mod backends;
pub mod experiment;
pub mod invoker;

use std::path::PathBuf;

use thiserror::Error;

use crate::db::DbError;

/// Failures that abort an experiment run.
///
/// A verifier exiting non-zero is not one of them: that outcome is recorded
/// and left to log analysis.
#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("Benchmark directory not found at {0}")]
    MissingDirectory(PathBuf),
    #[error("Benchmark file vanished before invocation: {0}")]
    MissingBenchmark(PathBuf),
    #[error("Benchmark id '{0}' is produced by more than one source file")]
    DuplicateBenchmark(String),
    #[error("Toolchain probe failed: {0}")]
    Toolchain(String),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Run ledger error: {0}")]
    Ledger(#[from] DbError),
}

impl ExperimentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExperimentError::Io { path: path.into(), source }
    }
}
