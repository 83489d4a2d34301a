//! things-to-google-tasks
//!
//! Migrates areas, projects, headings and tasks from the Things 3 database
//! into Google Tasks.

use anyhow::{Context, Result};
use clap::Parser;
use things_to_google_tasks::cli::{self, Cli, Command};
use things_to_google_tasks::logging;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log, cli.verbose)?;

    let command = cli.command.clone().unwrap_or_default();
    let config = cli.load_config()?;
    let settings = config
        .validate_for(command.requirements())
        .context("invalid configuration")?;
    debug!(?settings, "Configuration resolved");

    match &command {
        Command::Migrate(args) => cli::migrate::run(args, &settings),
        Command::Clear(args) => cli::clear::run(args, &settings),
        Command::Inspect(args) => cli::inspect::run(args, &settings),
        Command::Lists(args) => cli::lists::run(args, &settings),
    }
}
