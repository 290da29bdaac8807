//! revman CLI - Inspect RevMan systematic review files

mod cli;
mod colorizer;

use clap::error::ErrorKind;
use clap::Parser;
use std::io::{self, Write};
use tracing::debug;

use revman::core::logging::init_logging;

fn main() {
    let no_color = std::env::args_os().any(|arg| arg.to_str() == Some("--no-color"));

    let parsed = cli::Cli::try_parse();
    if let Err(e) = &parsed {
        if matches!(
            e.kind(),
            ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        ) {
            e.exit();
        }
    }

    let log_level = parsed.as_ref().ok().and_then(cli::Cli::log_directive);
    let log_format = parsed
        .as_ref()
        .ok()
        .and_then(|cli| cli.log_format)
        .map(|format| format.as_str());
    if let Err(e) = init_logging(log_level, log_format) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let app = cli::RevManApp::new(colorizer::styler_for(colorizer::should_colorize(no_color)));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match parsed {
        Ok(cli) => app.run(&cli, &mut out),
        Err(e) => Err(cli::usage_error(&e).into()),
    };

    let code = match result {
        Ok(()) => 0,
        Err(e) => {
            debug!(error = %e, "Run failed");
            if let Err(write_error) = app.report_failure(&e, &mut out) {
                eprintln!("Error {}", write_error);
            }
            1
        }
    };

    if let Err(e) = out.flush() {
        eprintln!("Error {}", e);
    }
    drop(out);
    std::process::exit(code);
}
