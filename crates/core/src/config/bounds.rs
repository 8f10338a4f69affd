use std::collections::BTreeMap;

use serde::Serialize;

/// Built-in unwind bounds for the benchmarks that need one to terminate.
const BUILTIN_BOUNDS: &[(&str, u32)] = &[
    ("960521-1-2", 11),
    ("box_list_nondet", 11),
    ("lockfree-3-0", 3),
    ("lockfree-3-2", 3),
    ("lockfree-3.2", 3),
    ("test-0232-1", 5),
];

/// Static benchmark id to unwind bound mapping.
///
/// An absent entry means the backend runs with its own default (possibly
/// unbounded).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LoopBoundTable {
    entries: BTreeMap<String, u32>,
}

impl LoopBoundTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table.
    pub fn builtin() -> Self {
        BUILTIN_BOUNDS.iter().map(|(id, bound)| (id.to_string(), *bound)).collect()
    }

    /// Layer `overrides` on top of this table; overrides win.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, u32>) -> Self {
        self.entries.extend(overrides.iter().map(|(id, bound)| (id.clone(), *bound)));
        self
    }

    /// Exact-match lookup.
    pub fn bound_for(&self, id: &str) -> Option<u32> {
        self.entries.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(id, bound)| (id.as_str(), *bound))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, u32)> for LoopBoundTable {
    fn from_iter<T: IntoIterator<Item = (String, u32)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}
