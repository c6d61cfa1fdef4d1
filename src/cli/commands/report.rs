//! Report command implementation.
//!
//! fetch → select lines for the target → parse → resolve → summarize →
//! print → export. Exports are skipped when the recent window is empty.

use crate::cli::ReportArgs;
use crate::config::{self, ReportConfig};
use crate::error::{CiFlakesError, Result};
use crate::fetch::{FileSource, HttpSource, PageSource, dashboard_url};
use crate::format::{ReportOutput, csv};
use crate::output::OutputContext;
use crate::parse;
use crate::report::{self, Summary};
use crate::util::{format_window_suffix, parse_local_datetime};
use chrono::{Local, NaiveDateTime};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of one report run.
#[derive(Debug)]
pub struct ReportRun {
    pub summary: Summary,
    /// Files written, in order: records export, summary export.
    pub exports: Vec<PathBuf>,
}

/// Execute the report command.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the page cannot be
/// fetched, or an export cannot be written.
pub fn execute(args: &ReportArgs, config_path: Option<&Path>, ctx: &OutputContext) -> Result<()> {
    let config = config::load_config(config_path, &args.overrides())?;

    let source: Box<dyn PageSource> = match &args.input {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(HttpSource::new(
            dashboard_url(&config.url, &config.query)?,
            config.timeout,
        )?),
    };

    let now = match &args.as_of {
        Some(text) => parse_local_datetime(text, "as-of")?,
        None => Local::now().naive_local(),
    };
    let run = run(source.as_ref(), &config, now, !args.no_export)?;

    if ctx.is_json() {
        ctx.json(&ReportOutput::new(&run.summary, run.exports))?;
        return Ok(());
    }

    ctx.text(&run.summary.report);
    if let [records_path, summary_path] = run.exports.as_slice() {
        ctx.line(&format!(
            "\n\nRecent test data saved to {}",
            records_path.display()
        ));
        ctx.line(&format!("Test summary saved to {}", summary_path.display()));
    }
    Ok(())
}

/// Run the pipeline against `source` with an explicit clock.
///
/// # Errors
///
/// Returns an error if the source fails or an export cannot be written.
pub fn run(
    source: &dyn PageSource,
    config: &ReportConfig,
    now: NaiveDateTime,
    export: bool,
) -> Result<ReportRun> {
    let body = source.fetch()?;

    let records = parse::parse_page(&body, &config.target);
    info!(
        source = %source.describe(),
        selected = records.len(),
        target = %config.target,
        "Parsed dashboard lines"
    );
    if records.is_empty() {
        warn!(target = %config.target, "No lines matched the target suffix");
    }

    let resolved = report::resolve_records(records, now);
    let summary = report::summarize(&resolved, now, &config.summary_options());

    let exports = if export && !summary.is_empty() {
        write_exports(&summary, &config.output_dir)?
    } else {
        Vec::new()
    };

    Ok(ReportRun { summary, exports })
}

/// Export file names for a window: `failed_tests_48h.csv`, `test_summary_48h.csv`.
#[must_use]
pub fn export_paths(dir: &Path, window: chrono::Duration) -> (PathBuf, PathBuf) {
    let suffix = format_window_suffix(window);
    (
        dir.join(format!("failed_tests_{suffix}.csv")),
        dir.join(format!("test_summary_{suffix}.csv")),
    )
}

/// Write both CSV exports, overwriting existing files.
///
/// # Errors
///
/// Returns an export error naming the file that could not be written.
pub fn write_exports(summary: &Summary, dir: &Path) -> Result<Vec<PathBuf>> {
    let (records_path, summary_path) = export_paths(dir, summary.window);

    write_file(&records_path, |w| csv::write_records(w, &summary.recent))?;
    info!(path = %records_path.display(), rows = summary.recent.len(), "Wrote recent records");

    write_file(&summary_path, |w| csv::write_summary(w, &summary.rows))?;
    info!(path = %summary_path.display(), rows = summary.rows.len(), "Wrote command summary");

    Ok(vec![records_path, summary_path])
}

fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let to_error = |source: io::Error| CiFlakesError::Export {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_error)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).map_err(to_error)?;
    writer.flush().map_err(to_error)
}
