use crate::analysis::grammar::{Action, BugRule, LineRule, LogGrammar, Marker};
use crate::backends::{BackendKind, CheckFlag, Verifier};
use crate::model::{BugCategory, SourceKind};

pub static ESBMC_GRAMMAR: LogGrammar = LogGrammar {
    line_rules: &[
        // "Generated 13 VCC(s), 5 remaining after simplification (40 assignments)"
        LineRule {
            marker: Marker::Prefix("Generated "),
            action: Action::Summary { conditions: 1, checks: Some(3) },
        },
        LineRule { marker: Marker::Prefix("Symex completed in:"), action: Action::Phase },
        LineRule { marker: Marker::Prefix("Slicing time:"), action: Action::Phase },
        LineRule { marker: Marker::Prefix("Encoding to solver time:"), action: Action::Phase },
        LineRule { marker: Marker::Prefix("Runtime decision procedure:"), action: Action::Phase },
    ],
    // "dereference failure: invalid pointer" is a prefix of the invalid-free
    // message, so that needle is anchored at the end of the line.
    bug_rules: &[
        BugRule {
            category: BugCategory::InvalidFree,
            needles: &[
                Marker::Contains("invalid pointer freed"),
                Marker::Contains("Operand of free must have zero pointer offset"),
                Marker::Contains("free() of non-dynamic memory"),
                Marker::Contains("double free"),
            ],
        },
        BugRule {
            category: BugCategory::MemoryLeak,
            needles: &[Marker::Contains("forgotten memory"), Marker::Contains("memory leak")],
        },
        BugRule {
            category: BugCategory::InvalidDereference,
            needles: &[
                Marker::Contains("dereference failure: NULL pointer"),
                Marker::Suffix("dereference failure: invalid pointer"),
                Marker::Contains("dereference failure: Access to object out of bounds"),
                Marker::Contains("dereference failure: accessed expired variable pointer"),
                Marker::Contains("array bounds violated"),
            ],
        },
    ],
};

/// ESBMC: SMT-based BMC for C programs.
pub struct EsbmcBackend;

impl Verifier for EsbmcBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Esbmc
    }

    fn default_binary(&self) -> &'static str {
        "esbmc"
    }

    fn accepted_sources(&self) -> &'static [SourceKind] {
        &[SourceKind::C, SourceKind::PreprocessedC]
    }

    fn check_flags(&self) -> &'static [CheckFlag] {
        &[CheckFlag::NoUnwindingChecks, CheckFlag::MemoryLeakChecks, CheckFlag::ForceMallocSuccess]
    }

    fn spell_flag(&self, flag: CheckFlag) -> Option<&'static str> {
        match flag {
            CheckFlag::NoUnwindingChecks => Some("--no-unwinding-assertions"),
            CheckFlag::MemoryLeakChecks => Some("--memory-leak-check"),
            CheckFlag::ForceMallocSuccess => Some("--force-malloc-success"),
            CheckFlag::NoDefaultChecks
            | CheckFlag::NoOverflowChecks
            | CheckFlag::MemorySafetyChecks => None,
        }
    }

    fn unwind_flag(&self) -> &'static str {
        "--unwind"
    }

    fn grammar(&self) -> &'static LogGrammar {
        &ESBMC_GRAMMAR
    }
}
