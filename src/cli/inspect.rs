//! The `inspect` command: print what would be migrated.

use crate::config::Settings;
use crate::format::format_source_tree;
use crate::things::ThingsDatabase;
use anyhow::{Context, Result};
use clap::Args;

#[derive(Args, Debug, Clone, Default)]
pub struct InspectArgs {
    /// Print the hierarchy as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &InspectArgs, settings: &Settings) -> Result<()> {
    let source = ThingsDatabase::open(&settings.db_path).context("opening Things database")?;
    let tree = source.read_tree().context("reading Things database")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print!("{}", format_source_tree(&tree));
    }
    source.close()?;
    Ok(())
}
