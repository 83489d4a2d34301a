//! The `clear` command: delete everything in the Google account.

use super::confirm;
use crate::config::Settings;
use crate::format::format_clear_report;
use crate::google::{GoogleTasksClient, TaskService};
use anyhow::{Context, Result, anyhow};
use clap::Args;

#[derive(Args, Debug, Clone, Default)]
pub struct ClearArgs {
    /// Delete without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

pub fn run(args: &ClearArgs, settings: &Settings) -> Result<()> {
    let credentials = settings
        .credentials_path
        .as_deref()
        .ok_or_else(|| anyhow!("Google API credentials path was not provided"))?;
    let mut service = GoogleTasksClient::connect(credentials, &settings.token_path)
        .context("authorizing with Google Tasks")?;

    println!("WARNING: this deletes ALL task lists and tasks from your Google account.");
    if !args.yes && !confirm("This cannot be undone. Are you absolutely sure?")? {
        println!("Cancelled. Nothing was changed.");
        return Ok(());
    }

    let report = service
        .clear_everything()
        .context("clearing Google Tasks")?;
    print!("{}", format_clear_report(&report));
    Ok(())
}
