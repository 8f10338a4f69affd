//! Table-driven log grammars.
//!
//! A `LogGrammar` is a small static description of one backend's log format:
//! which line markers carry counts and timings, and which substrings indicate
//! which bug category. Adding a backend or changing a marker string is a
//! change to one table.

use std::path::Path;

use crate::analysis::AnalysisError;
use crate::model::{BugCategory, BugSet};

/// How a line is recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Line (leading whitespace trimmed) starts with the text.
    Prefix(&'static str),
    /// Line contains the text anywhere.
    Contains(&'static str),
    /// Line (trailing whitespace trimmed) ends with the text.
    Suffix(&'static str),
}

impl Marker {
    /// Return the remainder of the line after the marker, if it matches.
    pub fn strip<'a>(&self, line: &'a str) -> Option<&'a str> {
        match *self {
            Marker::Prefix(text) => line.trim_start().strip_prefix(text),
            Marker::Contains(text) => line.find(text).map(|at| &line[at + text.len()..]),
            Marker::Suffix(text) => line.trim_end().strip_suffix(text).map(|_| ""),
        }
    }

    pub fn matches(&self, line: &str) -> bool {
        self.strip(line).is_some()
    }
}

/// What to extract from a matching line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Summary line with integer tokens at fixed whitespace positions.
    /// First match wins.
    Summary { conditions: usize, checks: Option<usize> },
    /// Each matching line counts one check.
    CountCheck,
    /// End-to-end verification time. First match wins.
    Elapsed,
    /// One sub-phase duration. All matches are summed.
    Phase,
}

#[derive(Debug, Clone, Copy)]
pub struct LineRule {
    pub marker: Marker,
    pub action: Action,
}

/// Line patterns that indicate one bug category. Needles of different
/// categories should not overlap: every matching category is reported.
#[derive(Debug, Clone, Copy)]
pub struct BugRule {
    pub category: BugCategory,
    pub needles: &'static [Marker],
}

#[derive(Debug)]
pub struct LogGrammar {
    pub line_rules: &'static [LineRule],
    pub bug_rules: &'static [BugRule],
}

/// Raw metrics scanned from one log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogMetrics {
    pub conditions: u64,
    pub checks: u64,
    pub bugs: BugSet,
    pub seconds: f64,
}

impl LogGrammar {
    /// Every bug category indicated by a single line.
    pub fn categories<'a>(&'a self, line: &'a str) -> impl Iterator<Item = BugCategory> + 'a {
        self.bug_rules
            .iter()
            .filter(move |rule| rule.needles.iter().any(|needle| needle.matches(line)))
            .map(|rule| rule.category)
    }

    /// Scan a whole log. Missing marker lines leave their fields at zero;
    /// a matching line with unexpected shape is a `MalformedLine` error.
    pub fn scan(&self, file: &Path, text: &str) -> Result<LogMetrics, AnalysisError> {
        let mut metrics = LogMetrics::default();
        let mut summary_seen = false;
        let mut elapsed_seen = false;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            for category in self.categories(line) {
                metrics.bugs.insert(category);
            }

            let Some((action, rest)) = self
                .line_rules
                .iter()
                .find_map(|rule| rule.marker.strip(line).map(|rest| (rule.action, rest)))
            else {
                continue;
            };

            match action {
                Action::Summary { conditions, checks } => {
                    if summary_seen {
                        continue;
                    }
                    summary_seen = true;
                    let tokens: Vec<&str> = line.split_whitespace().collect();
                    metrics.conditions = integer_token(&tokens, conditions)
                        .map_err(|reason| malformed(file, line_no, reason))?;
                    if let Some(pos) = checks {
                        metrics.checks += integer_token(&tokens, pos)
                            .map_err(|reason| malformed(file, line_no, reason))?;
                    }
                }
                Action::CountCheck => metrics.checks += 1,
                Action::Elapsed => {
                    if elapsed_seen {
                        continue;
                    }
                    elapsed_seen = true;
                    metrics.seconds +=
                        parse_seconds(rest).map_err(|reason| malformed(file, line_no, reason))?;
                }
                Action::Phase => {
                    metrics.seconds +=
                        parse_seconds(rest).map_err(|reason| malformed(file, line_no, reason))?;
                }
            }
        }

        Ok(metrics)
    }
}

fn malformed(file: &Path, line: usize, reason: String) -> AnalysisError {
    AnalysisError::MalformedLine { file: file.to_path_buf(), line, reason }
}

fn integer_token(tokens: &[&str], pos: usize) -> Result<u64, String> {
    let token = tokens
        .get(pos)
        .ok_or_else(|| format!("expected an integer at token {pos}, line has {}", tokens.len()))?;
    token
        .trim_end_matches(',')
        .parse::<u64>()
        .map_err(|e| format!("token {pos} ('{token}') is not an integer: {e}"))
}

/// Parse the first token of `rest` as a duration in seconds (`0.25s`, `250ms`, `0.25`).
fn parse_seconds(rest: &str) -> Result<f64, String> {
    let token = rest.split_whitespace().next().ok_or_else(|| "missing duration".to_string())?;
    let (number, scale) = match token.strip_suffix("ms") {
        Some(ms) => (ms, 1e-3),
        None => (token.strip_suffix('s').unwrap_or(token), 1.0),
    };
    number
        .parse::<f64>()
        .map(|value| value * scale)
        .map_err(|e| format!("'{token}' is not a duration: {e}"))
}
