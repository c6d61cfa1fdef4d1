//! Line parser for the CI dashboard's failure list.
//!
//! The dashboard prints one run per line, roughly:
//!
//! ```text
//! 07-01 12:00:00: <span>FAILED</span> (<a href="http://x/1">log</a></span>): some/test/cmd (30s) (code: 1) (target: next)
//! ```
//!
//! Extraction rules run in a fixed order and never fail; a rule that does
//! not match leaves its field as `None`.
//!
//! Markup is only used for two things: the status span and the first link.
//! Everything after the link is located with the literal [`REST_MARKER`],
//! which mirrors the dashboard's exact output. If the upstream markup
//! changes shape this marker has to change with it.

use crate::model::{Status, TestResultRecord, Timestamp};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::trace;

/// Closes the link and its status span; the test command follows it.
pub const REST_MARKER: &str = "</a></span>):";

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}):").expect("valid regex")
});
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([0-9]+s)\)").expect("valid regex"));
static EXIT_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(code: ([0-9]+)\)").expect("valid regex"));
static TARGET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(target: ([^)]+)\)").expect("valid regex"));

static SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span").expect("valid selector"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid selector"));

/// Suffix a line must end with to belong to `target`.
#[must_use]
pub fn target_suffix(target: &str) -> String {
    format!("(target: {target})")
}

/// Split a page body on `\n` and keep the lines ending in `(target: <target>)`.
///
/// Matching is against the raw line text; nothing is trimmed first.
#[must_use]
pub fn select_lines<'a>(body: &'a str, target: &str) -> Vec<&'a str> {
    let suffix = target_suffix(target);
    body.split('\n')
        .filter(|line| line.ends_with(&suffix))
        .collect()
}

/// Select the lines for `target` and parse each of them.
#[must_use]
pub fn parse_page(body: &str, target: &str) -> Vec<TestResultRecord> {
    select_lines(body, target)
        .into_iter()
        .map(parse_line)
        .collect()
}

/// Parse one dashboard line into a record.
///
/// Always returns a record, even if every field is `None`.
#[must_use]
pub fn parse_line(line: &str) -> TestResultRecord {
    let fragment = Html::parse_fragment(line);
    let rest = rest_of_line(line);

    // Duration gates the command: no `(Ns)` token, no command either.
    let (test_command, duration) = DURATION_RE.captures(rest).map_or((None, None), |caps| {
        let token = caps.get(0).expect("group 0 always present");
        (
            Some(rest[..token.start()].trim().to_string()),
            Some(caps[1].to_string()),
        )
    });

    let record = TestResultRecord {
        timestamp: extract_timestamp(line),
        status: extract_status(&fragment),
        link: extract_link(&fragment),
        test_command,
        duration,
        exit_code: EXIT_CODE_RE
            .captures(rest)
            .and_then(|caps| caps[1].parse().ok()),
        target: TARGET_RE
            .captures(rest)
            .map(|caps| caps[1].to_string()),
    };

    trace!(?record, "Parsed line");
    record
}

/// Everything after [`REST_MARKER`], trimmed; empty when the marker is absent.
#[must_use]
pub fn rest_of_line(line: &str) -> &str {
    line.find(REST_MARKER)
        .map_or("", |pos| line[pos + REST_MARKER.len()..].trim())
}

fn extract_timestamp(line: &str) -> Option<Timestamp> {
    TIMESTAMP_RE
        .captures(line)
        .map(|caps| Timestamp::new(&caps[1]))
}

/// First `<span>` whose whole text content, nested tags included, is a
/// status marker.
fn extract_status(fragment: &Html) -> Option<Status> {
    fragment
        .select(&SPAN)
        .find_map(|span| Status::from_marker(&span.text().collect::<String>()))
}

/// `href` of the first `<a>`, if it has one.
fn extract_link(fragment: &Html) -> Option<String> {
    fragment
        .select(&ANCHOR)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
}
