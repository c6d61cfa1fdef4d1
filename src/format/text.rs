//! Plain text rendering of the console report.

use crate::model::TestSummaryRow;
use crate::report::Summary;
use crate::util::format_window_label;
use std::fmt::Write as _;

/// Rule under the ranked-list heading.
const HEAVY_RULE_WIDTH: usize = 80;
/// Rule under the status breakdown heading.
const LIGHT_RULE_WIDTH: usize = 40;

/// Render a list of exit codes as `[1, 137]`.
#[must_use]
pub fn format_exit_codes(codes: &[u32]) -> String {
    let inner = codes
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{inner}]")
}

/// Render a list of durations as `['30s', '41s']`.
#[must_use]
pub fn format_durations(durations: &[String]) -> String {
    let inner = durations
        .iter()
        .map(|d| format!("'{d}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{inner}]")
}

/// One ranked entry, four lines, leading blank line.
#[must_use]
pub fn format_summary_row(rank: usize, row: &TestSummaryRow) -> String {
    format!(
        "\n{rank}. {}\n   Total runs: {} (Failed: {}, Flaked: {})\n   Exit codes: {}\n   Durations: {}\n",
        row.test_command,
        row.total_runs,
        row.failed_count,
        row.flaked_count,
        format_exit_codes(&row.exit_codes),
        format_durations(&row.durations),
    )
}

/// Render the full console report for a summary.
#[must_use]
pub fn render_report(summary: &Summary, top: usize) -> String {
    let window = format_window_label(summary.window);
    let mut out = String::new();

    let _ = writeln!(out, "Tests from the last {window}: {}", summary.recent.len());
    let _ = writeln!(out, "Total tests in dataset: {}", summary.total);
    out.push('\n');

    if summary.is_empty() {
        let _ = writeln!(out, "No test failures found in the last {window}");
        return out;
    }

    let _ = writeln!(out, "Most frequently failing/flaky tests in the last {window}:");
    out.push_str(&"=".repeat(HEAVY_RULE_WIDTH));
    out.push('\n');

    for (idx, row) in summary.rows.iter().take(top).enumerate() {
        out.push_str(&format_summary_row(idx + 1, row));
    }

    out.push_str("\n\nSummary by status:\n");
    out.push_str(&"-".repeat(LIGHT_RULE_WIDTH));
    out.push('\n');
    for entry in &summary.status_counts {
        let _ = writeln!(out, "{}: {}", entry.status, entry.count);
    }

    out
}
