//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::CliOverrides;

pub mod commands;

/// Ranked report of recently failing and flaky CI test commands
#[derive(Parser, Debug)]
#[command(name = "ci-flakes", author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand; runs `report` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: ./.ci-flakes.yaml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the dashboard, rank failing/flaky tests, write CSV exports
    Report(ReportArgs),

    /// Parse a single dashboard line and print the extracted fields
    Parse(ParseArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the report command.
#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Dashboard base URL
    #[arg(long)]
    pub url: Option<String>,

    /// Value of the `filter` query parameter
    #[arg(long)]
    pub filter: Option<String>,

    /// Value of the `filter_prop` query parameter
    #[arg(long)]
    pub filter_prop: Option<String>,

    /// Value of the `fail_list` query parameter
    #[arg(long)]
    pub fail_list: Option<String>,

    /// Target environment; keeps lines ending in `(target: <TARGET>)`
    #[arg(long, short = 't')]
    pub target: Option<String>,

    /// Recent window (48h, 2d, 90m, 1w; bare number = hours)
    #[arg(long, short = 'w')]
    pub window: Option<String>,

    /// Number of ranked commands to show
    #[arg(long)]
    pub top: Option<usize>,

    /// Directory for the CSV exports
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Read a saved page instead of fetching ('-' for stdin)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// HTTP timeout in seconds (default: wait indefinitely)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Evaluate the window as of this local time, e.g. "2025-07-03 12:00:00" (default: now)
    #[arg(long)]
    pub as_of: Option<String>,

    /// Skip writing CSV exports
    #[arg(long)]
    pub no_export: bool,
}

impl ReportArgs {
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            url: self.url.clone(),
            filter: self.filter.clone(),
            filter_prop: self.filter_prop.clone(),
            fail_list: self.fail_list.clone(),
            target: self.target.clone(),
            window: self.window.clone(),
            top: self.top,
            output_dir: self.output_dir.clone(),
            timeout: self.timeout,
        }
    }
}

/// Arguments for the parse command.
#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// Raw dashboard line (HTML fragment)
    pub line: String,
}

/// Arguments for the completions command.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    /// Elvish
    Elvish,
}
