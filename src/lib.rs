//! `ci_flakes` - ranked report of recently failing and flaky CI test commands.
//!
//! One run fetches the CI dashboard's failure list, parses the lines that
//! belong to a target environment, keeps the runs inside a trailing time
//! window, and ranks test commands by how often they failed or flaked.
//!
//! - [`parse`] - line parser (timestamp, status, link, command, ...)
//! - [`report`] - time-window filter and per-command aggregation
//! - [`fetch`] - page sources (HTTP, saved file)
//! - [`format`] - console report, JSON output, CSV exports

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod logging;
pub mod model;
pub mod output;
pub mod parse;
pub mod report;
pub mod util;

pub use error::{CiFlakesError, ErrorCode, Result, StructuredError};
