// thytom/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use clap::error::ErrorKind;
use miette::Diagnostic;
use std::process::ExitCode;
use thytom_core::error::{EXIT_ERR_PARAM, EXIT_NORMAL};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> ExitCode {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug thytom -f ids.txt to see the details
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    // 2. Command line. Help and version are successful runs.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_NORMAL,
                _ => EXIT_ERR_PARAM,
            };
            // Nothing sensible is left to do if stdout/stderr are gone
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    // 3. Run
    match commands::run::execute(cli) {
        Ok(()) => ExitCode::from(EXIT_NORMAL),
        Err(e) => {
            let code = e.exit_code();
            eprintln!("💥 {}", e);
            if let Some(help) = e.help() {
                eprintln!("   help: {}", help);
            }
            debug!("{:?}", miette::Report::new(e));
            ExitCode::from(code)
        }
    }
}
