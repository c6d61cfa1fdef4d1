//! JSON output shapes for `--json` mode.

use crate::model::{StatusCount, TestSummaryRow};
use crate::report::Summary;
use crate::util::format_window_suffix;
use serde::Serialize;
use std::path::PathBuf;

/// Machine-readable report, printed instead of the text report.
#[derive(Debug, Serialize)]
pub struct ReportOutput<'a> {
    /// Window in compact form, e.g. `48h`.
    pub window: String,
    pub total_records: usize,
    pub recent_records: usize,
    pub summary: &'a [TestSummaryRow],
    pub status_counts: &'a [StatusCount],
    /// Files written by this run; empty when nothing was exported.
    pub exports: Vec<PathBuf>,
}

impl<'a> ReportOutput<'a> {
    #[must_use]
    pub fn new(summary: &'a Summary, exports: Vec<PathBuf>) -> Self {
        Self {
            window: format_window_suffix(summary.window),
            total_records: summary.total,
            recent_records: summary.recent.len(),
            summary: &summary.rows,
            status_counts: &summary.status_counts,
            exports,
        }
    }
}
