//! dbmigrate CLI - Command-line interface for the dbmigrate runner.

use std::path::Path;

use clap::Parser;

use dbmigrate_cli::cli::{Cli, Command};
use dbmigrate_cli::commands;
use dbmigrate_cli::config::{CONFIG_FILE_NAME, Config};
use dbmigrate_cli::error::CliResult;
use dbmigrate_cli::output;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let Cli {
        config,
        verbose,
        command,
    } = Cli::parse();

    if verbose {
        dbmigrate_core::logging::init_with_level("debug");
    } else {
        dbmigrate_core::logging::init();
    }

    let load_config = || Config::resolve(config.as_deref(), Path::new(CONFIG_FILE_NAME));

    match command {
        Command::Up(args) => commands::up::run(&load_config()?, args).await,
        Command::Status(args) => commands::status::run(&load_config()?, args).await,
        Command::Version => commands::version::run().await,
    }
}
