//! Time-windowed aggregation of parsed records.
//!
//! The pipeline is: attach an absolute date-time to every record
//! ([`resolve_records`]), keep the ones inside the trailing window, group
//! them by test command and rank the groups by run count ([`summarize`]).
//!
//! The run's clock is always passed in as `now`; nothing here reads the
//! system time.

use crate::format::text;
use crate::model::{ResolvedRecord, StatusCount, TestResultRecord, TestSummaryRow, Timestamp};
use chrono::{Datelike, Duration, NaiveDateTime};
use std::collections::HashMap;
use tracing::{debug, info};

/// Format of the year-qualified timestamp.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Number of ranked commands shown by default.
pub const DEFAULT_TOP: usize = 10;

/// Knobs for [`summarize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Trailing window; records at or after `now - window` are recent.
    pub window: Duration,
    /// How many ranked commands the text report lists.
    pub top: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            window: Duration::hours(48),
            top: DEFAULT_TOP,
        }
    }
}

/// Result of one aggregation pass.
#[derive(Debug, Clone)]
pub struct Summary {
    pub window: Duration,
    /// Number of records before the window filter.
    pub total: usize,
    /// Records inside the window, input order.
    pub recent: Vec<ResolvedRecord>,
    /// Every command group, ranked.
    pub rows: Vec<TestSummaryRow>,
    /// Status frequencies over `recent`, most frequent first.
    pub status_counts: Vec<StatusCount>,
    /// Rendered console report.
    pub report: String,
}

impl Summary {
    /// True when no record fell inside the window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }
}

/// Combine a year-less timestamp with `year`.
///
/// Returns `None` when the digits do not form a real date-time
/// (e.g. `02-30 10:00:00` or `07-01 25:00:00`).
#[must_use]
pub fn resolve_timestamp(timestamp: &Timestamp, year: i32) -> Option<NaiveDateTime> {
    let text = format!("{year}-{timestamp}");
    match NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT) {
        Ok(datetime) => Some(datetime),
        Err(err) => {
            debug!(timestamp = %timestamp, year, error = %err, "Unresolvable timestamp");
            None
        }
    }
}

/// Attach a date-time to every record, using the year of `now`.
#[must_use]
pub fn resolve_records(records: Vec<TestResultRecord>, now: NaiveDateTime) -> Vec<ResolvedRecord> {
    let year = now.year();
    records
        .into_iter()
        .map(|record| {
            let datetime = record
                .timestamp
                .as_ref()
                .and_then(|ts| resolve_timestamp(ts, year));
            ResolvedRecord { record, datetime }
        })
        .collect()
}

/// Filter to the recent window, group by command, rank, and render.
#[must_use]
pub fn summarize(
    records: &[ResolvedRecord],
    now: NaiveDateTime,
    options: &SummaryOptions,
) -> Summary {
    // No cutoff when the window reaches past the earliest representable date.
    let cutoff = now.checked_sub_signed(options.window);
    let recent: Vec<ResolvedRecord> = records
        .iter()
        .filter(|r| {
            r.datetime
                .is_some_and(|dt| cutoff.is_none_or(|cutoff| dt >= cutoff))
        })
        .cloned()
        .collect();

    info!(
        total = records.len(),
        recent = recent.len(),
        cutoff = ?cutoff,
        "Filtered records to window"
    );

    let (rows, status_counts) = if recent.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        (rank_commands(&recent), count_statuses(&recent))
    };

    let mut summary = Summary {
        window: options.window,
        total: records.len(),
        recent,
        rows,
        status_counts,
        report: String::new(),
    };
    summary.report = text::render_report(&summary, options.top);
    summary
}

/// Group by `test_command` and sort by run count, descending.
///
/// Records without a command are skipped. Ties keep the order in which
/// each command first appeared.
#[must_use]
pub fn rank_commands(records: &[ResolvedRecord]) -> Vec<TestSummaryRow> {
    let mut rows: Vec<TestSummaryRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for resolved in records {
        let Some(command) = resolved.record.test_command.as_deref() else {
            continue;
        };
        let slot = *index.entry(command).or_insert_with(|| {
            rows.push(TestSummaryRow::new(command));
            rows.len() - 1
        });
        rows[slot].add(&resolved.record);
    }

    debug!(groups = rows.len(), "Grouped records by command");

    // sort_by is stable
    rows.sort_by(|a, b| b.total_runs.cmp(&a.total_runs));
    rows
}

/// Status frequencies, most frequent first; records without status are left out.
#[must_use]
pub fn count_statuses(records: &[ResolvedRecord]) -> Vec<StatusCount> {
    let mut counts: Vec<StatusCount> = Vec::new();
    for status in records.iter().filter_map(|r| r.record.status) {
        match counts.iter_mut().find(|c| c.status == status) {
            Some(entry) => entry.count += 1,
            None => counts.push(StatusCount { status, count: 1 }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn record(ts: &str, status: Option<Status>, command: Option<&str>) -> TestResultRecord {
        TestResultRecord {
            timestamp: Some(Timestamp::new(ts)),
            status,
            link: Some("http://x/1".to_string()),
            test_command: command.map(str::to_string),
            duration: command.map(|_| "30s".to_string()),
            exit_code: Some(1),
            target: Some("next".to_string()),
        }
    }

    #[test]
    fn test_resolve_timestamp_uses_given_year() {
        let dt = resolve_timestamp(&Timestamp::new("07-01 12:00:00"), 2025).unwrap();
        assert_eq!(dt.to_string(), "2025-07-01 12:00:00");
    }

    #[test]
    fn test_resolve_timestamp_rejects_bad_calendar_values() {
        assert!(resolve_timestamp(&Timestamp::new("02-30 10:00:00"), 2025).is_none());
        assert!(resolve_timestamp(&Timestamp::new("13-01 10:00:00"), 2025).is_none());
        assert!(resolve_timestamp(&Timestamp::new("07-01 25:00:00"), 2025).is_none());
        // Leap day depends on the year.
        assert!(resolve_timestamp(&Timestamp::new("02-29 10:00:00"), 2025).is_none());
        assert!(resolve_timestamp(&Timestamp::new("02-29 10:00:00"), 2024).is_some());
    }

    #[test]
    fn test_resolve_records_keeps_every_record() {
        let records = vec![
            record("07-01 12:00:00", Some(Status::Failed), Some("a")),
            TestResultRecord::default(),
            record("99-99 00:00:00", None, None),
        ];
        let resolved = resolve_records(records, now());
        assert_eq!(resolved.len(), 3);
        assert!(resolved[0].datetime.is_some());
        assert!(resolved[1].datetime.is_none());
        assert!(resolved[2].datetime.is_none());
    }

    #[test]
    fn test_window_is_inclusive() {
        let records = resolve_records(
            vec![
                record("07-01 12:00:00", Some(Status::Failed), Some("edge")),
                record("07-01 11:59:59", Some(Status::Failed), Some("old")),
                record("07-04 08:00:00", Some(Status::Flaked), Some("future")),
            ],
            now(),
        );
        let summary = summarize(&records, now(), &SummaryOptions::default());
        let commands: Vec<_> = summary
            .recent
            .iter()
            .filter_map(|r| r.record.test_command.as_deref())
            .collect();
        assert_eq!(commands, vec!["edge", "future"]);
        assert_eq!(summary.total, 3);
    }

    #[test]
    fn test_window_past_earliest_date_keeps_everything() {
        let records = resolve_records(
            vec![
                record("01-01 00:00:00", Some(Status::Failed), Some("oldest")),
                record("07-03 10:00:00", Some(Status::Failed), Some("newest")),
                TestResultRecord::default(),
            ],
            now(),
        );
        let options = SummaryOptions {
            window: Duration::days(100_000_000),
            ..SummaryOptions::default()
        };
        let summary = summarize(&records, now(), &options);
        assert_eq!(summary.recent.len(), 2);
        assert_eq!(summary.total, 3);
    }

    #[test]
    fn test_failed_and_flaked_same_command() {
        let records = resolve_records(
            vec![
                record("07-03 10:00:00", Some(Status::Failed), Some("yarn test p2p")),
                record("07-03 11:00:00", Some(Status::Flaked), Some("yarn test p2p")),
            ],
            now(),
        );
        let summary = summarize(&records, now(), &SummaryOptions::default());
        assert_eq!(summary.rows.len(), 1);
        let row = &summary.rows[0];
        assert_eq!(row.total_runs, 2);
        assert_eq!(row.failed_count, 1);
        assert_eq!(row.flaked_count, 1);
    }

    #[test]
    fn test_commandless_records_counted_but_not_grouped() {
        let records = resolve_records(
            vec![
                record("07-03 10:00:00", Some(Status::Failed), None),
                record("07-03 10:30:00", Some(Status::Failed), Some("a")),
            ],
            now(),
        );
        let summary = summarize(&records, now(), &SummaryOptions::default());
        assert_eq!(summary.recent.len(), 2);
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.status_counts[0].count, 2);
    }

    #[test]
    fn test_ranking_ties_keep_first_appearance() {
        let records = resolve_records(
            vec![
                record("07-03 01:00:00", Some(Status::Failed), Some("b")),
                record("07-03 02:00:00", Some(Status::Failed), Some("a")),
                record("07-03 03:00:00", Some(Status::Failed), Some("c")),
                record("07-03 04:00:00", Some(Status::Failed), Some("c")),
                record("07-03 05:00:00", Some(Status::Flaked), Some("a")),
            ],
            now(),
        );
        let rows = rank_commands(&records);
        let order: Vec<_> = rows.iter().map(|r| r.test_command.as_str()).collect();
        assert_eq!(order, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_counts_never_exceed_total() {
        let records = resolve_records(
            vec![
                record("07-03 01:00:00", Some(Status::Failed), Some("x")),
                record("07-03 02:00:00", None, Some("x")),
                record("07-03 03:00:00", Some(Status::Flaked), Some("x")),
            ],
            now(),
        );
        let rows = rank_commands(&records);
        assert_eq!(rows[0].total_runs, 3);
        assert!(rows[0].failed_count + rows[0].flaked_count < rows[0].total_runs);
    }

    #[test]
    fn test_status_counts_order() {
        let records = resolve_records(
            vec![
                record("07-03 01:00:00", Some(Status::Flaked), Some("x")),
                record("07-03 02:00:00", Some(Status::Failed), Some("x")),
                record("07-03 03:00:00", Some(Status::Failed), Some("y")),
                record("07-03 04:00:00", None, Some("y")),
            ],
            now(),
        );
        let counts = count_statuses(&records);
        assert_eq!(
            counts,
            vec![
                StatusCount { status: Status::Failed, count: 2 },
                StatusCount { status: Status::Flaked, count: 1 },
            ]
        );
    }

    #[test]
    fn test_empty_window_skips_grouping() {
        let records = resolve_records(
            vec![record("01-01 00:00:00", Some(Status::Failed), Some("old"))],
            now(),
        );
        let summary = summarize(&records, now(), &SummaryOptions::default());
        assert!(summary.is_empty());
        assert!(summary.rows.is_empty());
        assert!(summary.status_counts.is_empty());
        assert_eq!(summary.total, 1);
        assert!(summary.report.contains("No test failures found in the last 48 hours"));
    }

    #[test]
    fn test_custom_window() {
        let records = resolve_records(
            vec![
                record("07-03 11:30:00", Some(Status::Failed), Some("fresh")),
                record("07-03 10:00:00", Some(Status::Failed), Some("stale")),
            ],
            now(),
        );
        let options = SummaryOptions {
            window: Duration::hours(1),
            top: 10,
        };
        let summary = summarize(&records, now(), &options);
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].test_command, "fresh");
    }
}
