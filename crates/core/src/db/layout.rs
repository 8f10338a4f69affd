use std::path::{Path, PathBuf};

use crate::backends::{BackendKind, Strategy};

/// File name of the run ledger inside the output directory.
pub const LEDGER_FILE_NAME: &str = "runs.db";

/// Logical layout of an experiment's output tree.
///
/// This is derived from a chosen output root. It does *not* perform any IO
/// itself; the orchestrator creates directories before the first write.
#[derive(Debug, Clone)]
pub struct ExperimentLayout {
    /// Output root holding one subdirectory per backend.
    pub output_dir: PathBuf,
    /// Path to the SQLite run ledger.
    pub ledger_path: PathBuf,
}

impl ExperimentLayout {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        let output_dir = output_dir.as_ref().to_path_buf();
        let ledger_path = output_dir.join(LEDGER_FILE_NAME);
        Self { output_dir, ledger_path }
    }

    /// Directory holding a backend's logs (and, for kani, staged harnesses).
    pub fn backend_dir(&self, kind: BackendKind) -> PathBuf {
        self.output_dir.join(kind.as_str())
    }

    /// `<output>/<kind>/<id>.log`, or `<id>-<strategy>.log` for tagged passes.
    pub fn log_path(
        &self,
        kind: BackendKind,
        benchmark: &str,
        strategy: Option<Strategy>,
    ) -> PathBuf {
        let name = match strategy {
            Some(s) => format!("{benchmark}{}.log", s.log_suffix()),
            None => format!("{benchmark}.log"),
        };
        self.backend_dir(kind).join(name)
    }
}
