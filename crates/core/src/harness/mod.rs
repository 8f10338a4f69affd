//! Harness rewriter: turns an rbmc-style benchmark into a Kani proof harness.
//!
//! Rules, applied line by line in order:
//! - the entry point (`fn main()`) is preceded by `#[kani::proof]`;
//! - lines declaring the rbmc support library (`extern crate rbmc;`, with or
//!   without attributes or trailing comments) are dropped;
//! - nondeterministic-value calls are renamed to `kani::any`.
//!
//! No attempt is made to check that the result compiles; Kani reports that.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Annotation injected before the entry point.
pub const PROOF_MARKER: &str = "#[kani::proof]";

const ENTRY_POINT: &str = "fn main()";

/// Dependency declarations on the support library (current and legacy names).
const SUPPORT_CRATE_DECLS: &[&str] = &["extern crate rbmc;", "extern crate mirv;"];

const NONDET_CALLS: &[&str] = &["rbmc::nondet", "mirv::nondet"];

const KANI_NONDET: &str = "kani::any";

/// Apply the rewrite rules to source text. Line endings are preserved.
pub fn rewrite_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + PROOF_MARKER.len() + 1);
    let mut previous: Option<&str> = None;

    for line in source.split_inclusive('\n') {
        let trimmed = line.trim();
        if SUPPORT_CRATE_DECLS.iter().any(|decl| line.contains(decl)) {
            continue;
        }
        if line.starts_with(ENTRY_POINT) && previous != Some(PROOF_MARKER) {
            out.push_str(PROOF_MARKER);
            out.push('\n');
        }

        let mut rewritten = line.to_string();
        for call in NONDET_CALLS {
            rewritten = rewritten.replace(call, KANI_NONDET);
        }
        out.push_str(&rewritten);

        if !trimmed.is_empty() {
            previous = Some(trimmed);
        }
    }
    out
}

/// Rewrite `source_path` into `output_dir/<same file name>` and return the new path.
///
/// Fails if the source cannot be read or the output directory does not exist.
pub fn rewrite(source_path: &Path, output_dir: &Path) -> io::Result<PathBuf> {
    let source = fs::read_to_string(source_path)?;
    let file_name = source_path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", source_path.display()),
        )
    })?;
    let target = output_dir.join(file_name);
    fs::write(&target, rewrite_source(&source))?;
    Ok(target)
}
