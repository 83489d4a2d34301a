//! The `migrate` command.

use super::{confirm_with, lists};
use crate::config::Settings;
use crate::format::{format_clear_report, format_migration_report, format_task_lists};
use crate::google::{GoogleTasksClient, InMemoryTaskService, TaskService};
use crate::migrate::{MigrationOptions, MigrationReport, Migrator};
use crate::things::ThingsDatabase;
use anyhow::{Context, Result, anyhow};
use clap::Args;
use std::io::{BufRead, Write};

/// Arguments for the migrate command.
#[derive(Args, Debug, Clone, Default)]
pub struct MigrateArgs {
    /// Delete ALL existing Google task lists and tasks before migrating
    #[arg(long)]
    pub clean_slate: bool,

    /// Skip the confirmation for --clean-slate
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Migrate into an in-memory task service and print the result
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the migration command.
pub fn run(args: &MigrateArgs, settings: &Settings) -> Result<()> {
    println!("Things database:  {}", settings.db_path.display());
    if let Some(creds) = &settings.credentials_path {
        println!("Credentials:      {}", creds.display());
    }
    println!(
        "Clean slate:      {}",
        if args.clean_slate { "enabled" } else { "disabled" }
    );
    println!();

    let source = ThingsDatabase::open(&settings.db_path).context("opening Things database")?;

    if args.dry_run {
        let mut service = InMemoryTaskService::new();
        let report = Migrator::new(&source, &mut service, &settings.migration).run();
        println!("Dry run: nothing was sent to Google Tasks.");
        println!();
        print!("{}", format_task_lists(&lists::collect(&service, true, true)?));
        println!();
        print!("{}", format_migration_report(&report));
        source.close()?;
        return Ok(());
    }

    let credentials = settings
        .credentials_path
        .as_deref()
        .ok_or_else(|| anyhow!("Google API credentials path was not provided"))?;
    let mut service = GoogleTasksClient::connect(credentials, &settings.token_path)
        .context("authorizing with Google Tasks")?;

    let outcome = clear_and_migrate(
        args,
        &source,
        &mut service,
        &settings.migration,
        &mut std::io::stdin().lock(),
        &mut std::io::stdout(),
    );
    source.close()?;

    if let Some(report) = outcome? {
        print!("{}", format_migration_report(&report));
    }
    Ok(())
}

/// Clear the destination when `--clean-slate` asks for it, then migrate.
///
/// Returns `None` when the clean slate is declined; nothing is sent to the
/// service in that case. A failed clear is an error and no migration runs.
pub fn clear_and_migrate<S, R, W>(
    args: &MigrateArgs,
    source: &ThingsDatabase,
    service: &mut S,
    options: &MigrationOptions,
    input: &mut R,
    output: &mut W,
) -> Result<Option<MigrationReport>>
where
    S: TaskService,
    R: BufRead,
    W: Write,
{
    if args.clean_slate {
        writeln!(
            output,
            "WARNING: --clean-slate deletes ALL task lists and tasks from your Google account."
        )?;
        if !args.yes
            && !confirm_with("This cannot be undone. Are you absolutely sure?", input, output)?
        {
            writeln!(output, "Clean slate cancelled. Nothing was changed.")?;
            return Ok(None);
        }
        let cleared = service
            .clear_everything()
            .context("clearing Google Tasks")?;
        write!(output, "{}", format_clear_report(&cleared))?;
        writeln!(output)?;
    }

    Ok(Some(Migrator::new(source, service, options).run()))
}
