//! Experiment orchestrator: discover benchmarks and drive one backend over them.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backends::{BackendKind, Strategy, Verifier};
use crate::config::ExperimentConfig;
use crate::db::{sha256_file, ExperimentLayout, InvocationRecord, RunLedger};
use crate::harness;
use crate::model::Benchmark;
use crate::services::invoker::{build_invocations, InvocationOutcome, Launcher};
use crate::services::ExperimentError;

/// Result of one finished invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationReport {
    pub benchmark: String,
    pub strategy: Option<Strategy>,
    pub log_path: PathBuf,
    pub outcome: InvocationOutcome,
}

/// Scan `dir` (non-recursively) for benchmarks the verifier accepts, sorted by id.
pub fn discover_benchmarks(
    dir: &Path,
    verifier: &dyn Verifier,
) -> Result<Vec<Benchmark>, ExperimentError> {
    if !dir.is_dir() {
        return Err(ExperimentError::MissingDirectory(dir.to_path_buf()));
    }
    let mut benchmarks = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ExperimentError::io(dir, e))? {
        let entry = entry.map_err(|e| ExperimentError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| ExperimentError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        if let Some(benchmark) = Benchmark::from_path(&entry.path()) {
            if verifier.accepts(benchmark.kind) {
                benchmarks.push(benchmark);
            }
        }
    }
    benchmarks.sort_by(|a, b| a.id.cmp(&b.id));

    let mut seen = BTreeSet::new();
    for benchmark in &benchmarks {
        if !seen.insert(benchmark.id.as_str()) {
            return Err(ExperimentError::DuplicateBenchmark(benchmark.id.clone()));
        }
    }
    Ok(benchmarks)
}

/// Make a relative program path with directory components absolute, since
/// verifiers run inside a scratch working directory. Bare names are left for
/// `PATH` lookup.
fn resolve_program(program: PathBuf) -> Result<PathBuf, ExperimentError> {
    if program.is_absolute() || program.components().count() < 2 {
        return Ok(program);
    }
    let cwd = std::env::current_dir().map_err(|e| ExperimentError::io(".", e))?;
    Ok(cwd.join(program))
}

/// Coordinator tying config, output layout, and a launcher together.
pub struct Experiment<'a> {
    pub config: &'a ExperimentConfig,
    pub layout: &'a ExperimentLayout,
    pub launcher: &'a dyn Launcher,
    pub ledger: Option<&'a RunLedger>,
}

impl Experiment<'_> {
    /// Run `kind` over every accepted benchmark in `dir`, strictly sequentially.
    ///
    /// Aborts on the first precondition or I/O failure; a verifier exiting
    /// non-zero is recorded and does not stop the run.
    pub fn run(
        &self,
        dir: &Path,
        kind: BackendKind,
    ) -> Result<Vec<InvocationReport>, ExperimentError> {
        let verifier = kind.verifier();
        let benchmarks = discover_benchmarks(dir, verifier)?;

        let backend_dir = self.layout.backend_dir(kind);
        fs::create_dir_all(&backend_dir).map_err(|e| ExperimentError::io(&backend_dir, e))?;

        let program = resolve_program(self.config.binary_for(kind))?;
        let env = verifier.environment(self.config)?;
        let bounds = self.config.loop_bounds();
        info!(
            backend = %kind,
            benchmarks = benchmarks.len(),
            dir = %dir.display(),
            "starting experiment"
        );

        let mut reports = Vec::new();
        for benchmark in &benchmarks {
            if !benchmark.path.is_file() {
                return Err(ExperimentError::MissingBenchmark(benchmark.path.clone()));
            }
            let staged = if verifier.rewrites_harness() {
                harness::rewrite(&benchmark.path, &backend_dir)
                    .map_err(|e| ExperimentError::io(&benchmark.path, e))?
            } else {
                benchmark.path.clone()
            };
            let input = fs::canonicalize(&staged).map_err(|e| ExperimentError::io(&staged, e))?;
            let source_hash = match self.ledger {
                Some(_) => Some(
                    sha256_file(&benchmark.path)
                        .map_err(|e| ExperimentError::io(&benchmark.path, e))?,
                ),
                None => None,
            };

            let bound = bounds.bound_for(&benchmark.id);
            let invocations = build_invocations(
                verifier,
                &program,
                &input,
                &benchmark.id,
                bound,
                &env,
                self.layout,
            );
            for invocation in invocations {
                info!(
                    backend = %kind,
                    benchmark = %benchmark.id,
                    strategy = invocation.strategy.map(|s| s.as_str()).unwrap_or("-"),
                    unwind = ?bound,
                    "invoking verifier"
                );
                debug!(
                    command = %invocation.command_line(),
                    env = ?invocation.env.keys().collect::<Vec<_>>(),
                    log = %invocation.log_path.display(),
                    "invocation details"
                );

                let started_at = Utc::now().to_rfc3339();
                let outcome = self.launcher.launch(&invocation)?;
                let finished_at = Utc::now().to_rfc3339();

                if outcome.timed_out {
                    warn!(
                        benchmark = %benchmark.id,
                        elapsed = ?outcome.elapsed,
                        "verifier timed out"
                    );
                } else if !outcome.success() {
                    warn!(
                        benchmark = %benchmark.id,
                        exit_code = ?outcome.exit_code,
                        "verifier exited unsuccessfully; the log decides the result"
                    );
                }

                if let Some(ledger) = self.ledger {
                    ledger.record(&InvocationRecord {
                        benchmark: benchmark.id.clone(),
                        backend: kind.as_str().to_string(),
                        strategy: invocation.strategy.map(|s| s.as_str().to_string()),
                        log_path: invocation.log_path.display().to_string(),
                        source_hash: source_hash.clone(),
                        exit_code: outcome.exit_code,
                        timed_out: outcome.timed_out,
                        started_at,
                        finished_at,
                    })?;
                }

                reports.push(InvocationReport {
                    benchmark: benchmark.id.clone(),
                    strategy: invocation.strategy,
                    log_path: invocation.log_path,
                    outcome,
                });
            }
        }

        info!(backend = %kind, invocations = reports.len(), "experiment finished");
        Ok(reports)
    }
}
