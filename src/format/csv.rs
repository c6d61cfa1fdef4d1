//! CSV export and re-import for `ci_flakes`.
//!
//! Two files are produced per run:
//! - the flat list of recent records ([`RECORD_FIELDS`])
//! - the per-command summary ([`SUMMARY_FIELDS`])
//!
//! Fields containing commas, quotes, or newlines are quoted. `None` is
//! written as an empty field and read back as `None`.

use crate::error::{CiFlakesError, Result};
use crate::format::text::{format_durations, format_exit_codes};
use crate::model::{ResolvedRecord, Status, TestResultRecord, TestSummaryRow, Timestamp};
use crate::report::DATETIME_FORMAT;
use chrono::NaiveDateTime;
use std::io::{self, Write};

/// Columns of the recent-records export.
pub const RECORD_FIELDS: &[&str] = &[
    "date-time",
    "status",
    "link",
    "test_command",
    "duration",
    "exit_code",
    "target",
    "datetime",
];

/// Columns of the summary export; `test_command` is the index column.
pub const SUMMARY_FIELDS: &[&str] = &[
    "test_command",
    "total_runs",
    "failed_count",
    "flaked_count",
    "exit_codes",
    "durations",
];

/// Escape a CSV field value.
///
/// Wraps in double quotes if the value contains commas, quotes, or newlines.
/// Doubles any existing quotes within the value.
#[must_use]
pub fn escape_field(value: &str) -> String {
    let needs_quoting = value.contains(',')
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');

    if needs_quoting {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// Get a field value from a resolved record by column name.
#[must_use]
pub fn get_field_value(resolved: &ResolvedRecord, field: &str) -> String {
    let record = &resolved.record;
    match field {
        "date-time" => record
            .timestamp
            .as_ref()
            .map_or_else(String::new, |ts| ts.as_str().to_string()),
        "status" => record
            .status
            .map_or_else(String::new, |s| s.as_str().to_string()),
        "link" => record.link.clone().unwrap_or_default(),
        "test_command" => record.test_command.clone().unwrap_or_default(),
        "duration" => record.duration.clone().unwrap_or_default(),
        "exit_code" => record
            .exit_code
            .map_or_else(String::new, |code| code.to_string()),
        "target" => record.target.clone().unwrap_or_default(),
        "datetime" => resolved
            .datetime
            .map_or_else(String::new, |dt| dt.format(DATETIME_FORMAT).to_string()),
        _ => String::new(),
    }
}

/// Write CSV header row to the given writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_header<W: Write>(writer: &mut W, fields: &[&str]) -> io::Result<()> {
    let header = fields.join(",");
    writeln!(writer, "{header}")
}

/// Format a single record as a CSV row.
#[must_use]
pub fn format_record_row(resolved: &ResolvedRecord) -> String {
    RECORD_FIELDS
        .iter()
        .map(|&field| escape_field(&get_field_value(resolved, field)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Format a single summary row as a CSV row.
#[must_use]
pub fn format_summary_row(row: &TestSummaryRow) -> String {
    [
        row.test_command.clone(),
        row.total_runs.to_string(),
        row.failed_count.to_string(),
        row.flaked_count.to_string(),
        format_exit_codes(&row.exit_codes),
        format_durations(&row.durations),
    ]
    .iter()
    .map(|value| escape_field(value))
    .collect::<Vec<_>>()
    .join(",")
}

/// Write recent records as CSV.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_records<W: Write>(writer: &mut W, records: &[ResolvedRecord]) -> io::Result<()> {
    write_header(writer, RECORD_FIELDS)?;
    for record in records {
        writeln!(writer, "{}", format_record_row(record))?;
    }
    Ok(())
}

/// Write summary rows as CSV.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_summary<W: Write>(writer: &mut W, rows: &[TestSummaryRow]) -> io::Result<()> {
    write_header(writer, SUMMARY_FIELDS)?;
    for row in rows {
        writeln!(writer, "{}", format_summary_row(row))?;
    }
    Ok(())
}

/// Split CSV text into rows of unescaped fields.
///
/// Quoted fields may contain commas, doubled quotes, and line breaks.
/// A trailing newline does not produce an empty row.
#[must_use]
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Read a recent-records export back into records.
///
/// # Errors
///
/// Returns a validation error if the header does not match
/// [`RECORD_FIELDS`] or a value cannot be parsed.
pub fn read_records(text: &str) -> Result<Vec<ResolvedRecord>> {
    let mut rows = parse_rows(text).into_iter();
    let header = rows
        .next()
        .ok_or_else(|| CiFlakesError::validation("csv", "missing header row"))?;
    if header != RECORD_FIELDS {
        return Err(CiFlakesError::validation(
            "csv",
            format!("unexpected header: {}", header.join(",")),
        ));
    }

    rows.enumerate()
        .map(|(idx, row)| record_from_row(&row).map_err(|err| line_error(idx + 2, &err)))
        .collect()
}

fn line_error(line: usize, err: &CiFlakesError) -> CiFlakesError {
    CiFlakesError::validation("csv", format!("row {line}: {err}"))
}

fn record_from_row(row: &[String]) -> Result<ResolvedRecord> {
    if row.len() != RECORD_FIELDS.len() {
        return Err(CiFlakesError::validation(
            "csv",
            format!("expected {} fields, found {}", RECORD_FIELDS.len(), row.len()),
        ));
    }

    let opt = |idx: usize| Some(row[idx].clone()).filter(|s| !s.is_empty());

    let status = opt(1).map(|s| s.parse::<Status>()).transpose()?;
    let exit_code = opt(5)
        .map(|s| {
            s.parse::<u32>()
                .map_err(|_| CiFlakesError::validation("exit_code", format!("invalid value '{s}'")))
        })
        .transpose()?;
    let datetime = opt(7)
        .map(|s| {
            NaiveDateTime::parse_from_str(&s, DATETIME_FORMAT)
                .map_err(|_| CiFlakesError::validation("datetime", format!("invalid value '{s}'")))
        })
        .transpose()?;

    Ok(ResolvedRecord {
        record: TestResultRecord {
            timestamp: opt(0).map(Timestamp::new),
            status,
            link: opt(2),
            test_command: opt(3),
            duration: opt(4),
            exit_code,
            target: opt(6),
        },
        datetime,
    })
}
