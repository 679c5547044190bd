//! Slicewright CLI - contract-driven slice generation and boundary linting.
//!
//! Main entry point for the `slicewright` binary.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

mod cli;
mod commands;
mod error;
mod output;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(&cli);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to create async runtime: {e}");
            return ExitCode::from(error::Exit::GeneralError as u8);
        }
    };

    match runtime.block_on(cli.execute()) {
        Ok(()) => ExitCode::from(error::Exit::Success as u8),
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match cli.verbose {
        0 if cli.quiet => EnvFilter::new("error"),
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(cli.verbose >= 2))
        .init();
}
