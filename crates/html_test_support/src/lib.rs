//! Shared helpers for golden-fixture tests: fixture discovery, expected-file
//! headers, TOML sanitize cases, and line diffs for mismatch reports.

pub mod cases;
pub mod fixtures;

pub use cases::{Case, CaseFile, load_case_files};
pub use fixtures::{Expected, FixtureFilter, FixtureStatus, fixture_dirs, parse_expected_file};

use std::fmt::Write;

const MISSING: &str = "<missing>";
const CONTEXT: usize = 2;

// input: "a\n\"b\"\u{1}"
// output: "a\\n\\\"b\\\"\\u{01}"
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let escaped = match ch {
            '\\' => "\\\\",
            '"' => "\\\"",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            ch if ch < ' ' => {
                let _ = write!(out, "\\u{{{:02X}}}", u32::from(ch));
                continue;
            }
            ch => {
                out.push(ch);
                continue;
            }
        };
        out.push_str(escaped);
    }
    out
}

fn line(lines: &[String], i: usize) -> &str {
    lines.get(i).map_or(MISSING, String::as_str)
}

/// Report the first line where two snapshots disagree, with a little
/// context on either side.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    let total = expected.len().max(actual.len());
    let mut report = String::new();
    match (0..total).find(|&i| line(expected, i) != line(actual, i)) {
        Some(first) => {
            let window = first.saturating_sub(CONTEXT)..(first + CONTEXT + 1).min(total);
            let _ = writeln!(report, "first mismatch at line {}:", first + 1);
            for i in window {
                let marker = if i == first { '>' } else { ' ' };
                let _ = writeln!(report, "{marker} {:>4}  expected: {}", i + 1, line(expected, i));
                let _ = writeln!(report, "{marker} {:>4}    actual: {}", i + 1, line(actual, i));
            }
        }
        None => {
            let _ = writeln!(report, "snapshots are identical");
        }
    }
    let _ = writeln!(report, "expected {} lines, actual {} lines", expected.len(), actual.len());
    report
}

/// Split sanitized output into comparable lines, keeping line terminators visible.
pub fn snapshot_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(escape_text).collect()
}
