//! Output formatting for `ci_flakes`.
//!
//! Supports the human-readable console report, JSON output for `--json`,
//! and the two CSV exports.
//!
//! # CSV Output
//!
//! The [`csv`] module writes the flat recent-record list and the
//! per-command summary, and can read the record list back.

pub mod csv;
mod output;
pub mod text;

pub use output::ReportOutput;
pub use text::{format_durations, format_exit_codes, render_report};
