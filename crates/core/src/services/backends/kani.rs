use std::collections::BTreeMap;

use crate::analysis::grammar::{Action, BugRule, LineRule, LogGrammar, Marker};
use crate::backends::{BackendKind, CheckFlag, Verifier};
use crate::config::ExperimentConfig;
use crate::model::{BugCategory, SourceKind};
use crate::services::ExperimentError;

pub static KANI_GRAMMAR: LogGrammar = LogGrammar {
    line_rules: &[
        // "Generated 105 VCC(s), 32 remaining after simplification"
        LineRule {
            marker: Marker::Prefix("Generated "),
            action: Action::Summary { conditions: 1, checks: None },
        },
        // "Check 3: main.pointer_dereference.1"
        LineRule { marker: Marker::Prefix("Check "), action: Action::CountCheck },
        LineRule { marker: Marker::Prefix("Verification Time:"), action: Action::Elapsed },
    ],
    // Kani lists every check with its description, so only the failed-check
    // summary lines indicate a finding.
    bug_rules: &[
        BugRule {
            category: BugCategory::InvalidFree,
            needles: &[
                Marker::Contains("Failed Checks: free argument"),
                Marker::Contains("Failed Checks: double free"),
            ],
        },
        BugRule {
            category: BugCategory::MemoryLeak,
            needles: &[
                Marker::Contains("Failed Checks: dynamically allocated memory never freed"),
                Marker::Contains("Failed Checks: memory leak"),
            ],
        },
        BugRule {
            category: BugCategory::InvalidDereference,
            needles: &[
                Marker::Contains("Failed Checks: dereference failure"),
                Marker::Contains("Failed Checks: index out of bounds"),
            ],
        },
    ],
};

/// Kani: CBMC-based model checker for Rust proof harnesses.
pub struct KaniBackend;

impl Verifier for KaniBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Kani
    }

    fn default_binary(&self) -> &'static str {
        "kani"
    }

    fn accepted_sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Rust]
    }

    fn check_flags(&self) -> &'static [CheckFlag] {
        &[CheckFlag::NoDefaultChecks, CheckFlag::MemorySafetyChecks]
    }

    fn spell_flag(&self, flag: CheckFlag) -> Option<&'static str> {
        match flag {
            CheckFlag::NoDefaultChecks => Some("--no-default-checks"),
            CheckFlag::NoUnwindingChecks => Some("--no-unwinding-checks"),
            CheckFlag::NoOverflowChecks => Some("--no-overflow-checks"),
            CheckFlag::MemorySafetyChecks => Some("--memory-safety-checks"),
            CheckFlag::MemoryLeakChecks | CheckFlag::ForceMallocSuccess => None,
        }
    }

    fn unwind_flag(&self) -> &'static str {
        "--default-unwind"
    }

    fn rewrites_harness(&self) -> bool {
        true
    }

    fn environment(
        &self,
        _config: &ExperimentConfig,
    ) -> Result<BTreeMap<String, String>, ExperimentError> {
        let mut vars = BTreeMap::new();
        vars.insert("RUSTFLAGS".to_string(), "-Awarnings".to_string());
        Ok(vars)
    }

    fn grammar(&self) -> &'static LogGrammar {
        &KANI_GRAMMAR
    }
}
