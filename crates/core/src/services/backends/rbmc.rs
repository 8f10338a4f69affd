use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::analysis::grammar::{Action, BugRule, LineRule, LogGrammar, Marker};
use crate::backends::{BackendKind, CheckFlag, Strategy, Verifier};
use crate::config::ExperimentConfig;
use crate::model::{BugCategory, SourceKind};
use crate::services::ExperimentError;

/// Environment variable naming the rbmc support library.
pub const RBMC_LIBRARY_ENV: &str = "RBMC_LIBRARY_PATH";

/// Support library used when the config names none, relative to the working directory.
pub const DEFAULT_RBMC_LIBRARY: &str = "target/release/librbmc.rlib";

pub static RBMC_GRAMMAR: LogGrammar = LogGrammar {
    line_rules: &[
        // "Generating 12 VC(s), including 5 assertions"
        LineRule {
            marker: Marker::Prefix("Generating "),
            action: Action::Summary { conditions: 1, checks: Some(4) },
        },
        LineRule { marker: Marker::Prefix("Verification time:"), action: Action::Elapsed },
    ],
    bug_rules: &[
        BugRule {
            category: BugCategory::InvalidFree,
            needles: &[
                Marker::Contains("dealloc failure"),
                Marker::Contains("drop failure"),
                Marker::Contains("invalid free"),
            ],
        },
        BugRule { category: BugCategory::MemoryLeak, needles: &[Marker::Contains("memory leak")] },
        BugRule {
            category: BugCategory::InvalidDereference,
            needles: &[
                Marker::Contains("dereference failure"),
                Marker::Contains("index out of bounds"),
            ],
        },
    ],
};

/// rbmc: MIR-level BMC for Rust, run once per SMT strategy.
pub struct RbmcBackend;

impl Verifier for RbmcBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Rbmc
    }

    fn default_binary(&self) -> &'static str {
        "rbmc"
    }

    fn accepted_sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Rust]
    }

    fn check_flags(&self) -> &'static [CheckFlag] {
        &[]
    }

    fn spell_flag(&self, _flag: CheckFlag) -> Option<&'static str> {
        None
    }

    fn unwind_flag(&self) -> &'static str {
        "--unwind"
    }

    fn strategies(&self) -> &'static [Strategy] {
        &[Strategy::Forward, Strategy::Once]
    }

    fn strategy_args(&self, strategy: Strategy) -> Vec<String> {
        vec!["--smt-strategy".to_string(), strategy.as_str().to_string()]
    }

    fn environment(
        &self,
        config: &ExperimentConfig,
    ) -> Result<BTreeMap<String, String>, ExperimentError> {
        let library = config.rbmc_library.as_deref().unwrap_or(DEFAULT_RBMC_LIBRARY);
        let library = absolutize(PathBuf::from(library))?;

        let sysroot = match &config.rust_sysroot {
            Some(path) => PathBuf::from(path),
            None => probe_sysroot()?,
        };
        let mut search_path = sysroot.join("lib").display().to_string();
        if let Some(inherited) = env::var_os("LD_LIBRARY_PATH") {
            let inherited = inherited.to_string_lossy();
            if !inherited.is_empty() {
                search_path = format!("{search_path}:{inherited}");
            }
        }

        let mut vars = BTreeMap::new();
        vars.insert(RBMC_LIBRARY_ENV.to_string(), library.display().to_string());
        vars.insert("LD_LIBRARY_PATH".to_string(), search_path);
        Ok(vars)
    }

    fn grammar(&self) -> &'static LogGrammar {
        &RBMC_GRAMMAR
    }
}

fn absolutize(path: PathBuf) -> Result<PathBuf, ExperimentError> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = env::current_dir()
        .map_err(|source| ExperimentError::Io { path: PathBuf::from("."), source })?;
    Ok(cwd.join(path))
}

/// Ask `rustc` for the active toolchain's sysroot.
fn probe_sysroot() -> Result<PathBuf, ExperimentError> {
    let output = Command::new("rustc")
        .args(["--print", "sysroot"])
        .output()
        .map_err(|e| ExperimentError::Toolchain(format!("failed to spawn rustc: {e}")))?;
    if !output.status.success() {
        return Err(ExperimentError::Toolchain(format!(
            "rustc --print sysroot exited with {}",
            output.status
        )));
    }
    let sysroot = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if sysroot.is_empty() {
        return Err(ExperimentError::Toolchain("rustc --print sysroot produced no output".into()));
    }
    debug!(%sysroot, "probed rust sysroot");
    Ok(PathBuf::from(sysroot))
}
