//! Shared utilities for `ci_flakes`.
//!
//! - Window and date-time parsing and formatting
//! - Progress spinner for the network fetch

pub mod progress;
pub mod time;

pub use time::{format_window_label, format_window_suffix, parse_local_datetime, parse_window};
