//! Window and date-time parsing and formatting.

use crate::error::{CiFlakesError, Result};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Accepted layouts for an explicit local date-time.
const DATETIME_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a window specification into a positive `Duration`.
///
/// Supports:
/// - Unit suffix: `90m`, `48h`, `2d`, `1w`
/// - Bare integer: hours (`48`)
///
/// # Errors
///
/// Returns a validation error if the text is empty, the unit is unknown,
/// the amount is not a positive integer, or the result overflows.
pub fn parse_window(s: &str, field_name: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(CiFlakesError::validation(field_name, "empty duration"));
    }

    let (amount_str, unit) = match s.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => (&s[..s.len() - 1], c.to_ascii_lowercase()),
        _ => (s, 'h'),
    };

    let amount = amount_str.trim().parse::<i64>().map_err(|_| {
        CiFlakesError::validation(
            field_name,
            format!("invalid duration '{s}' (try: 48h, 2d, 90m, 1w)"),
        )
    })?;
    if amount <= 0 {
        return Err(CiFlakesError::validation(
            field_name,
            "duration must be greater than zero",
        ));
    }

    let duration = match unit {
        'm' => Duration::try_minutes(amount),
        'h' => Duration::try_hours(amount),
        'd' => Duration::try_days(amount),
        'w' => Duration::try_weeks(amount),
        _ => {
            return Err(CiFlakesError::validation(
                field_name,
                "invalid unit (use m, h, d, w)",
            ));
        }
    };

    // `now - window` must stay inside chrono's date range.
    duration
        .filter(|d| DateTime::<Utc>::UNIX_EPOCH.naive_utc().checked_sub_signed(*d).is_some())
        .ok_or_else(|| CiFlakesError::validation(field_name, "duration too large"))
}

/// Parse a local date-time such as `2025-07-03 12:00:00`.
///
/// # Errors
///
/// Returns a validation error if no accepted layout matches.
pub fn parse_local_datetime(s: &str, field_name: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(s, layout).ok())
        .ok_or_else(|| {
            CiFlakesError::validation(
                field_name,
                format!("invalid date-time '{s}' (try: 2025-07-03 12:00:00)"),
            )
        })
}

/// Compact form used in export file names: `48h`, or `90m` when the window
/// is not a whole number of hours.
#[must_use]
pub fn format_window_suffix(window: Duration) -> String {
    if window.num_minutes() % 60 == 0 {
        format!("{}h", window.num_hours())
    } else {
        format!("{}m", window.num_minutes())
    }
}

/// Long form used in report text: `48 hours`, `90 minutes`.
#[must_use]
pub fn format_window_label(window: Duration) -> String {
    if window.num_minutes() % 60 == 0 {
        format!("{} hours", window.num_hours())
    } else {
        format!("{} minutes", window.num_minutes())
    }
}
