//! CLI command definitions for things-to-google-tasks
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod clear;
pub mod inspect;
pub mod lists;
pub mod migrate;

use crate::config::{Config, ConfigLoader, ConfigPaths, Overrides, Requirements};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clear::ClearArgs;
use inspect::InspectArgs;
use lists::ListsArgs;
use migrate::MigrateArgs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Migrate areas, projects, headings and tasks from Things 3 into Google Tasks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a YAML configuration file (replaces the project and user config files)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the Things 3 database (main.sqlite)
    #[arg(short, long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Path to the Google API OAuth client secrets JSON
    #[arg(long, global = true)]
    pub creds_path: Option<PathBuf>,

    /// Path of the cached OAuth token (default: token.json)
    #[arg(long, global = true)]
    pub token_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Migrate Things into Google Tasks (default if no subcommand given)
    Migrate(MigrateArgs),

    /// Delete every task list and task from the Google account
    Clear(ClearArgs),

    /// Print the Things hierarchy without touching Google
    Inspect(InspectArgs),

    /// Print the Google task lists and their tasks
    Lists(ListsArgs),
}

impl Default for Command {
    fn default() -> Self {
        Command::Migrate(MigrateArgs::default())
    }
}

impl Command {
    /// Which parts of the configuration the command needs.
    pub fn requirements(&self) -> Requirements {
        match self {
            Command::Migrate(args) if args.dry_run => Requirements::SOURCE_ONLY,
            Command::Migrate(_) => Requirements::BOTH,
            Command::Clear(_) | Command::Lists(_) => Requirements::GOOGLE_ONLY,
            Command::Inspect(_) => Requirements::SOURCE_ONLY,
        }
    }
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            db_path: self.db_path.clone(),
            credentials_path: self.creds_path.clone(),
            token_path: self.token_path.clone(),
        }
    }

    /// Load every configuration tier, the flags of this invocation last.
    pub fn load_config(&self) -> Result<Config> {
        let paths = match &self.config {
            Some(path) => ConfigPaths::explicit(path),
            None => ConfigPaths::discover(),
        };
        let mut loader = ConfigLoader::load_with_paths(paths).context("loading configuration")?;
        loader.apply_overrides(&self.overrides());
        Ok(loader.into_config())
    }
}

/// Ask a yes/no question on the terminal. Only `y` or `Y` confirms.
pub fn confirm(question: &str) -> Result<bool> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    confirm_with(question, &mut stdin.lock(), &mut stdout.lock())
}

pub fn confirm_with<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    write!(output, "{} [y/N] ", question)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
