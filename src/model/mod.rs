//! Core data types for `ci_flakes`.
//!
//! - `TestResultRecord` - One parsed dashboard line
//! - `Status` - Failure kind reported by the dashboard
//! - `Timestamp` - Year-less `MM-DD HH:MM:SS` stamp as printed upstream
//! - `ResolvedRecord` - A record with its absolute date-time attached
//! - `TestSummaryRow` - Per-command aggregate over the recent window
//!
//! Every extracted field is an `Option`: `None` means the extraction rule
//! did not match that line.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Failure kind printed by the dashboard for a test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "FLAKED")]
    Flaked,
}

impl Status {
    /// Marker text exactly as it appears in the page.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Failed => "FAILED",
            Self::Flaked => "FLAKED",
        }
    }

    /// Exact, case-sensitive match against the marker text.
    #[must_use]
    pub fn from_marker(text: &str) -> Option<Self> {
        match text {
            "FAILED" => Some(Self::Failed),
            "FLAKED" => Some(Self::Flaked),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = crate::error::CiFlakesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_marker(s).ok_or_else(|| {
            crate::error::CiFlakesError::validation("status", format!("unknown status '{s}'"))
        })
    }
}

/// Year-less run timestamp, `MM-DD HH:MM:SS`, kept as printed.
///
/// The digits are not range checked here; `report::resolve_timestamp`
/// decides whether they form a real calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Wrap text that already has the `MM-DD HH:MM:SS` shape.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields extracted from one dashboard line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResultRecord {
    #[serde(rename = "date-time")]
    pub timestamp: Option<Timestamp>,
    pub status: Option<Status>,
    pub link: Option<String>,
    pub test_command: Option<String>,
    pub duration: Option<String>,
    pub exit_code: Option<u32>,
    pub target: Option<String>,
}

/// A parsed record plus its absolute date-time.
///
/// `datetime` is `None` when the line had no timestamp or its digits did not
/// form a valid date in the run's year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    #[serde(flatten)]
    pub record: TestResultRecord,
    pub datetime: Option<NaiveDateTime>,
}

/// Aggregate for one test command over the recent window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSummaryRow {
    pub test_command: String,
    pub total_runs: usize,
    pub failed_count: usize,
    pub flaked_count: usize,
    /// Distinct exit codes in order of first appearance.
    pub exit_codes: Vec<u32>,
    /// Every observed duration, in input order.
    pub durations: Vec<String>,
}

impl TestSummaryRow {
    #[must_use]
    pub fn new(test_command: impl Into<String>) -> Self {
        Self {
            test_command: test_command.into(),
            total_runs: 0,
            failed_count: 0,
            flaked_count: 0,
            exit_codes: Vec::new(),
            durations: Vec::new(),
        }
    }

    /// Fold one record into the aggregate.
    pub fn add(&mut self, record: &TestResultRecord) {
        self.total_runs += 1;
        match record.status {
            Some(Status::Failed) => self.failed_count += 1,
            Some(Status::Flaked) => self.flaked_count += 1,
            None => {}
        }
        if let Some(code) = record.exit_code {
            if !self.exit_codes.contains(&code) {
                self.exit_codes.push(code);
            }
        }
        if let Some(duration) = &record.duration {
            self.durations.push(duration.clone());
        }
    }
}

/// Frequency of one status among the recent records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,
}
