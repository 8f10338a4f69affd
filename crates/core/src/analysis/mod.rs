//! Log normalization engine.
//!
//! Reads the verification logs a backend left in its output directory and
//! reduces each benchmark's log(s) into one `NormalizedResult`. The engine is a
//! pure function of the directory contents: re-running it without re-running
//! the verifiers yields identical records.

pub mod grammar;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::backends::{BackendKind, Strategy};
use crate::model::{NormalizedResult, Report, Timing};

use self::grammar::{LogGrammar, LogMetrics};

/// Extension of every verification log.
pub const LOG_EXTENSION: &str = "log";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Log directory not found at {0}")]
    MissingLogDirectory(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed log line {file}:{line}: {reason}")]
    MalformedLine { file: PathBuf, line: usize, reason: String },
    #[error("Log for benchmark '{benchmark}' has no matching {missing} log")]
    UnpairedLog { benchmark: String, missing: String },
}

/// Analyze every log in `log_dir` with the grammar of `kind`.
pub fn analyze(kind: BackendKind, log_dir: &Path) -> Result<Report, AnalysisError> {
    if !log_dir.is_dir() {
        return Err(AnalysisError::MissingLogDirectory(log_dir.to_path_buf()));
    }
    let verifier = kind.verifier();
    let logs = collect_logs(log_dir)?;
    debug!(backend = %kind, logs = logs.len(), dir = %log_dir.display(), "analyzing logs");

    match verifier.strategies() {
        [] => analyze_single(verifier.grammar(), &logs),
        _ => analyze_paired(verifier.grammar(), &logs),
    }
}

/// Map of log file stem to path, for every `*.log` directly inside `dir`.
fn collect_logs(dir: &Path) -> Result<BTreeMap<String, PathBuf>, AnalysisError> {
    let io_err = |source| AnalysisError::Io { path: dir.to_path_buf(), source };
    let mut logs = BTreeMap::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.file_type().map_err(io_err)?.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(LOG_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            logs.insert(stem.to_string(), path);
        }
    }
    Ok(logs)
}

fn scan_file(grammar: &LogGrammar, path: &Path) -> Result<LogMetrics, AnalysisError> {
    let bytes =
        fs::read(path).map_err(|source| AnalysisError::Io { path: path.to_path_buf(), source })?;
    // Verifier output may carry non-UTF-8 bytes from compiler diagnostics.
    let text = String::from_utf8_lossy(&bytes);
    grammar.scan(path, &text)
}

fn analyze_single(
    grammar: &LogGrammar,
    logs: &BTreeMap<String, PathBuf>,
) -> Result<Report, AnalysisError> {
    let mut report = Report::new();
    for (id, path) in logs {
        let metrics = scan_file(grammar, path)?;
        report.insert(
            id.clone(),
            NormalizedResult {
                conditions: metrics.conditions,
                checks: metrics.checks,
                bugs: metrics.bugs,
                timing: Timing::Single { seconds: metrics.seconds },
            },
        );
    }
    Ok(report)
}

/// Split `<id>-<strategy>` into its id and strategy.
pub fn split_strategy(stem: &str) -> Option<(&str, Strategy)> {
    [Strategy::Forward, Strategy::Once]
        .into_iter()
        .find_map(|s| stem.strip_suffix(&s.log_suffix()).map(|id| (id, s)))
}

/// Two-pass analysis: counts and primary timing from the forward log, bugs and
/// the second timing from the once log.
fn analyze_paired(
    grammar: &LogGrammar,
    logs: &BTreeMap<String, PathBuf>,
) -> Result<Report, AnalysisError> {
    let mut forward: BTreeMap<&str, &PathBuf> = BTreeMap::new();
    let mut once: BTreeMap<&str, &PathBuf> = BTreeMap::new();
    for (stem, path) in logs {
        match split_strategy(stem) {
            Some((id, Strategy::Forward)) => {
                forward.insert(id, path);
            }
            Some((id, Strategy::Once)) => {
                once.insert(id, path);
            }
            None => {
                return Err(AnalysisError::UnpairedLog {
                    benchmark: stem.clone(),
                    missing: "strategy-tagged".to_string(),
                })
            }
        }
    }

    if let Some(id) = once.keys().find(|id| !forward.contains_key(*id)) {
        return Err(AnalysisError::UnpairedLog {
            benchmark: id.to_string(),
            missing: Strategy::Forward.as_str().to_string(),
        });
    }

    let mut report = Report::new();
    for (id, forward_path) in forward {
        let once_path = once.get(id).ok_or_else(|| AnalysisError::UnpairedLog {
            benchmark: id.to_string(),
            missing: Strategy::Once.as_str().to_string(),
        })?;
        let forward_metrics = scan_file(grammar, forward_path)?;
        let once_metrics = scan_file(grammar, once_path)?;
        report.insert(
            id.to_string(),
            NormalizedResult {
                conditions: forward_metrics.conditions,
                checks: forward_metrics.checks,
                bugs: once_metrics.bugs,
                timing: Timing::Paired {
                    forward: forward_metrics.seconds,
                    once: once_metrics.seconds,
                },
            },
        );
    }
    Ok(report)
}
