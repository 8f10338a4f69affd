//! Core data model: benchmarks, bug categories, and normalized results.
//!
//! Everything here is a plain value type. Orchestration produces `Benchmark`s,
//! the log normalization engine produces `NormalizedResult`s, and the report
//! formatter consumes a `Report`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of source kinds a benchmark file can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Rust source (`.rs`).
    Rust,
    /// C source (`.c`).
    C,
    /// Preprocessed C source (`.i`).
    PreprocessedC,
}

impl SourceKind {
    /// File extension (without the dot) for this kind.
    pub fn extension(self) -> &'static str {
        match self {
            SourceKind::Rust => "rs",
            SourceKind::C => "c",
            SourceKind::PreprocessedC => "i",
        }
    }

    /// Map a file extension to a source kind, if supported.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "rs" => Some(SourceKind::Rust),
            "c" => Some(SourceKind::C),
            "i" => Some(SourceKind::PreprocessedC),
            _ => None,
        }
    }
}

/// A single source unit under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benchmark {
    /// File name with the extension stripped.
    pub id: String,
    pub path: PathBuf,
    pub kind: SourceKind,
}

impl Benchmark {
    /// Build a benchmark from a path, or `None` if the extension is unsupported
    /// or the file name is not valid UTF-8.
    pub fn from_path(path: &Path) -> Option<Self> {
        let kind = SourceKind::from_extension(path.extension()?.to_str()?)?;
        let id = path.file_stem()?.to_str()?.to_string();
        Some(Self { id, path: path.to_path_buf(), kind })
    }
}

/// Category of a bug finding.
///
/// The declaration order doubles as the rendering order (`ID,IF,ML`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BugCategory {
    #[serde(rename = "ID")]
    InvalidDereference,
    #[serde(rename = "IF")]
    InvalidFree,
    #[serde(rename = "ML")]
    MemoryLeak,
}

impl BugCategory {
    pub fn abbreviation(self) -> &'static str {
        match self {
            BugCategory::InvalidDereference => "ID",
            BugCategory::InvalidFree => "IF",
            BugCategory::MemoryLeak => "ML",
        }
    }
}

impl fmt::Display for BugCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for BugCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ID" => Ok(BugCategory::InvalidDereference),
            "IF" => Ok(BugCategory::InvalidFree),
            "ML" => Ok(BugCategory::MemoryLeak),
            other => Err(format!("Unknown bug category '{other}'. Allowed: ID, IF, ML")),
        }
    }
}

/// Unordered, duplicate-free set of bug categories found for one benchmark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BugSet(BTreeSet<BugCategory>);

impl BugSet {
    /// Placeholder rendered for an empty set.
    pub const EMPTY_PLACEHOLDER: &'static str = "-";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: BugCategory) -> bool {
        self.0.insert(category)
    }

    pub fn contains(&self, category: BugCategory) -> bool {
        self.0.contains(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = BugCategory> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<BugCategory> for BugSet {
    fn from_iter<T: IntoIterator<Item = BugCategory>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for BugSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(Self::EMPTY_PLACEHOLDER);
        }
        let joined: Vec<&str> = self.0.iter().map(|c| c.abbreviation()).collect();
        f.write_str(&joined.join(","))
    }
}

/// Timing figures for one benchmark, in seconds.
///
/// Two-pass backends keep both figures separately; they describe different
/// analyses and are never summed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    Single { seconds: f64 },
    Paired { forward: f64, once: f64 },
}

impl Timing {
    /// The primary figure: the single time, or the forward-pass time.
    pub fn primary(&self) -> f64 {
        match *self {
            Timing::Single { seconds } => seconds,
            Timing::Paired { forward, .. } => forward,
        }
    }

    pub fn is_paired(&self) -> bool {
        matches!(self, Timing::Paired { .. })
    }
}

/// Per-benchmark metrics record produced by the log normalization engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    /// Generated verification-condition count (0 when the log has no summary line).
    pub conditions: u64,
    /// Check/assertion count (0 when absent).
    pub checks: u64,
    pub bugs: BugSet,
    pub timing: Timing,
}

/// Benchmark identifier to normalized result, iterated in lexicographic order.
pub type Report = BTreeMap<String, NormalizedResult>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn benchmark_id_strips_extension() {
        let b = Benchmark::from_path(Path::new("bench/lockfree-3-0.rs")).unwrap();
        assert_eq!(b.id, "lockfree-3-0");
        assert_eq!(b.kind, SourceKind::Rust);
        assert!(Benchmark::from_path(Path::new("bench/README.md")).is_none());
    }

    #[test]
    fn bug_set_renders_in_fixed_order() {
        let set: BugSet =
            [BugCategory::MemoryLeak, BugCategory::InvalidDereference, BugCategory::MemoryLeak]
                .into_iter()
                .collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string(), "ID,ML");
        assert_eq!(BugSet::new().to_string(), "-");
    }
}
