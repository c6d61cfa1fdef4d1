//! Parse command: run the line parser on one line.

use crate::cli::ParseArgs;
use crate::error::Result;
use crate::model::TestResultRecord;
use crate::output::OutputContext;
use crate::parse::parse_line;

/// Execute the parse command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(args: &ParseArgs, ctx: &OutputContext) -> Result<()> {
    let record = parse_line(&args.line);
    if ctx.is_json() {
        ctx.json(&record)?;
    } else {
        ctx.text(&format_record(&record));
    }
    Ok(())
}

/// One `field: value` line per field, `-` for missing values.
#[must_use]
pub fn format_record(record: &TestResultRecord) -> String {
    fn show<T: ToString>(value: Option<T>) -> String {
        value.map_or_else(|| "-".to_string(), |v| v.to_string())
    }

    let fields = [
        ("date-time", show(record.timestamp.as_ref())),
        ("status", show(record.status)),
        ("link", show(record.link.as_deref())),
        ("test_command", show(record.test_command.as_deref())),
        ("duration", show(record.duration.as_deref())),
        ("exit_code", show(record.exit_code)),
        ("target", show(record.target.as_deref())),
    ];

    fields
        .iter()
        .map(|(name, value)| format!("{name:<13}{value}\n"))
        .collect()
}
