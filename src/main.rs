use ci_flakes::cli::commands;
use ci_flakes::cli::{Cli, Commands, ReportArgs};
use ci_flakes::logging::init_logging;
use ci_flakes::output::OutputContext;
use ci_flakes::{CiFlakesError, StructuredError};
use clap::Parser;
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.json) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let ctx = OutputContext::from_flags(cli.json, cli.quiet);
    let config_path = cli.config.as_deref();

    let result = match &cli.command {
        None => commands::report::execute(&ReportArgs::default(), config_path, &ctx),
        Some(Commands::Report(args)) => commands::report::execute(args, config_path, &ctx),
        Some(Commands::Parse(args)) => commands::parse::execute(args, &ctx),
        Some(Commands::Version) => commands::version::execute(&ctx),
        Some(Commands::Completions(args)) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Handle errors with structured output support.
///
/// When --json is set or stdout is not a TTY, outputs structured JSON to stderr.
/// Otherwise, outputs human-readable error with optional color.
fn handle_error(err: &CiFlakesError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}
