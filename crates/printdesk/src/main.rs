mod bridge;
mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use printdesk_config::to_backend_config;
use printdesk_core::Backend;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::{Painter, StderrNotifier};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if let Command::Completions(ref args) = cli.command {
        use clap::CommandFactory;
        use clap_complete::generate;

        let mut cmd = Cli::command();
        generate(args.shell, &mut cmd, "printdesk", &mut std::io::stdout());
        return Ok(());
    }

    let settings = config::load(&cli.global)?;
    let painter = Painter::new(cli.global.color);
    let backend = Backend::new(
        to_backend_config(&settings.config),
        settings.override_store(),
        Arc::new(StderrNotifier::new(painter)),
    )?;

    tracing::debug!(command = ?cli.command, "dispatching command");
    commands::dispatch(cli.command, &backend, &settings, &cli.global).await
}
