//! Fixed-width text rendering of a `Report`.

use std::fmt::Write as _;

use crate::model::{NormalizedResult, Report, Timing};

const ID_WIDTH: usize = 28;
const COUNT_WIDTH: usize = 8;
const BUGS_WIDTH: usize = 10;
const TIME_WIDTH: usize = 10;

/// Render a report as aligned text: a header row, then one row per benchmark
/// in lexicographic order.
///
/// Two timing columns (`forward(s)`, `once(s)`) are emitted when any result
/// carries paired timing; otherwise a single `time(s)` column.
pub fn render(report: &Report) -> String {
    let paired = report.values().any(|r| r.timing.is_paired());
    let mut out = String::new();

    let _ = write!(
        out,
        "{:<ID_WIDTH$} {:>COUNT_WIDTH$} {:>COUNT_WIDTH$} {:<BUGS_WIDTH$}",
        "benchmark", "VCs", "checks", "bugs"
    );
    if paired {
        let _ = write!(out, " {:>TIME_WIDTH$} {:>TIME_WIDTH$}", "forward(s)", "once(s)");
    } else {
        let _ = write!(out, " {:>TIME_WIDTH$}", "time(s)");
    }
    out.push('\n');

    // BTreeMap iteration is already sorted by benchmark id.
    for (id, result) in report {
        render_row(&mut out, id, result, paired);
    }
    out
}

fn render_row(out: &mut String, id: &str, result: &NormalizedResult, paired: bool) {
    let _ = write!(
        out,
        "{:<ID_WIDTH$} {:>COUNT_WIDTH$} {:>COUNT_WIDTH$} {:<BUGS_WIDTH$}",
        id,
        result.conditions,
        result.checks,
        result.bugs.to_string()
    );
    match (result.timing, paired) {
        (Timing::Paired { forward, once }, _) => {
            let _ = write!(out, " {:>TIME_WIDTH$.3} {:>TIME_WIDTH$.3}", forward, once);
        }
        (Timing::Single { seconds }, true) => {
            let _ = write!(out, " {:>TIME_WIDTH$.3} {:>TIME_WIDTH$}", seconds, "-");
        }
        (Timing::Single { seconds }, false) => {
            let _ = write!(out, " {:>TIME_WIDTH$.3}", seconds);
        }
    }
    out.push('\n');
}

/// Pretty JSON rendering of the same mapping.
pub fn render_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BugSet;

    #[test]
    fn single_row_layout() {
        let mut report = Report::new();
        report.insert(
            "a".into(),
            NormalizedResult {
                conditions: 12,
                checks: 5,
                bugs: BugSet::new(),
                timing: Timing::Single { seconds: 0.5 },
            },
        );
        let text = render(&report);
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, format!("{:<28} {:>8} {:>8} {:<10} {:>10}", "a", 12, 5, "-", "0.500"));
    }
}
