//! Tabula - edit user-defined tables from the terminal

use clap::Parser;
use std::sync::Arc;
use tabula_app::{Cli, ConsoleHooks, bootstrap, commands, logging};
use tabula_settings::TabulaSettings;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(logging::LoggingConfig::for_cli(cli.verbose)) {
        // Logging is not up yet
        eprintln!("FATAL: Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Tabula");

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = TabulaSettings::load()?;
    if let Some(path) = cli.tables_file {
        settings.storage.tables_file = Some(path);
    }

    let hooks = Arc::new(ConsoleHooks::new(cli.yes));
    let state = bootstrap(settings, hooks).await?;
    commands::run(cli.command, &state).await
}
