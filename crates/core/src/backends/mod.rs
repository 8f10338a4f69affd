//! Verification backends: the closed set of supported BMC tools.
//!
//! A backend is selected by a single `BackendKind` value that is threaded
//! through orchestration and analysis. Each kind resolves to a `Verifier`,
//! which knows the tool's command-line conventions, its environment, and the
//! grammar used to read its logs.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analysis::grammar::LogGrammar;
use crate::config::ExperimentConfig;
use crate::model::SourceKind;
use crate::services::backends::{EsbmcBackend, KaniBackend, RbmcBackend};
use crate::services::ExperimentError;

/// Supported verification backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Rbmc,
    Kani,
    Esbmc,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [BackendKind::Rbmc, BackendKind::Kani, BackendKind::Esbmc];

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Rbmc => "rbmc",
            BackendKind::Kani => "kani",
            BackendKind::Esbmc => "esbmc",
        }
    }

    /// Resolve the verifier implementing this backend's conventions.
    pub fn verifier(self) -> &'static dyn Verifier {
        match self {
            BackendKind::Rbmc => &RbmcBackend,
            BackendKind::Kani => &KaniBackend,
            BackendKind::Esbmc => &EsbmcBackend,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rbmc" => Ok(BackendKind::Rbmc),
            "kani" => Ok(BackendKind::Kani),
            "esbmc" => Ok(BackendKind::Esbmc),
            other => Err(format!("Unsupported backend '{other}'. Allowed: rbmc, kani, esbmc")),
        }
    }
}

/// Strategy tag for backends that run each benchmark twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Stop at the first failing assertion; source of counts and primary timing.
    Forward,
    /// Encode every assertion in one query; source of bug findings.
    Once,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Forward => "forward",
            Strategy::Once => "once",
        }
    }

    /// Suffix appended to the benchmark id in log file names (`<id>-<strategy>.log`).
    pub fn log_suffix(self) -> String {
        format!("-{}", self.as_str())
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of boolean check flags a backend may be launched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckFlag {
    NoDefaultChecks,
    NoUnwindingChecks,
    NoOverflowChecks,
    MemorySafetyChecks,
    MemoryLeakChecks,
    ForceMallocSuccess,
}

/// Backend-specific conventions for launching a verifier and reading its logs.
pub trait Verifier: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Executable looked up on `PATH` when the config names none.
    fn default_binary(&self) -> &'static str;

    fn accepted_sources(&self) -> &'static [SourceKind];

    fn accepts(&self, kind: SourceKind) -> bool {
        self.accepted_sources().contains(&kind)
    }

    /// Mandatory check flags, in command-line order.
    fn check_flags(&self) -> &'static [CheckFlag];

    /// Spelling of a check flag, or `None` if this tool has no such flag.
    fn spell_flag(&self, flag: CheckFlag) -> Option<&'static str>;

    /// Flag that precedes the loop bound (`--unwind N` or equivalent).
    fn unwind_flag(&self) -> &'static str;

    /// Strategy passes per benchmark; empty means a single untagged pass.
    fn strategies(&self) -> &'static [Strategy] {
        &[]
    }

    /// Extra arguments selecting a strategy pass.
    fn strategy_args(&self, _strategy: Strategy) -> Vec<String> {
        Vec::new()
    }

    /// Whether benchmarks must go through the harness rewriter first.
    fn rewrites_harness(&self) -> bool {
        false
    }

    /// Environment variables set on each invocation of this backend.
    fn environment(
        &self,
        _config: &ExperimentConfig,
    ) -> Result<BTreeMap<String, String>, ExperimentError> {
        Ok(BTreeMap::new())
    }

    fn grammar(&self) -> &'static LogGrammar;
}
