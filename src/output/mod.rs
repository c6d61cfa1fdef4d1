//! Output coordination for stdout.
//!
//! Decides whether a command prints its text report, JSON, or nothing
//! (quiet). Errors and logs always go to stderr and are not affected.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text
    Plain,
    /// JSON output only
    Json,
    /// No stdout output
    Quiet,
}

/// Central output coordinator that respects json/quiet modes.
#[derive(Debug, Clone, Copy)]
pub struct OutputContext {
    mode: OutputMode,
}

impl OutputContext {
    /// Create from CLI-style flags; `--json` wins over `--quiet`.
    #[must_use]
    pub const fn from_flags(json: bool, quiet: bool) -> Self {
        let mode = if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Plain
        };
        Self { mode }
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Print text in plain mode; no-op otherwise.
    pub fn text(&self, text: &str) {
        if self.mode == OutputMode::Plain {
            print!("{text}");
        }
    }

    /// Print a line in plain mode; no-op otherwise.
    pub fn line(&self, line: &str) {
        if self.mode == OutputMode::Plain {
            println!("{line}");
        }
    }

    /// Print pretty JSON in json mode; no-op otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: Serialize>(&self, value: &T) -> serde_json::Result<()> {
        if self.mode == OutputMode::Json {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(())
    }
}
