//! The `lists` command: print the Google task lists.

use crate::config::Settings;
use crate::error::TasksError;
use crate::format::format_task_lists;
use crate::google::{GoogleTasksClient, RemoteTask, TaskList, TaskService};
use anyhow::{Context, Result, anyhow};
use clap::Args;

#[derive(Args, Debug, Clone, Default)]
pub struct ListsArgs {
    /// Include completed tasks
    #[arg(long)]
    pub show_completed: bool,

    /// Include hidden tasks
    #[arg(long)]
    pub show_hidden: bool,
}

pub fn run(args: &ListsArgs, settings: &Settings) -> Result<()> {
    let credentials = settings
        .credentials_path
        .as_deref()
        .ok_or_else(|| anyhow!("Google API credentials path was not provided"))?;
    let service = GoogleTasksClient::connect(credentials, &settings.token_path)
        .context("authorizing with Google Tasks")?;

    let lists = collect(&service, args.show_completed, args.show_hidden)?;
    print!("{}", format_task_lists(&lists));
    Ok(())
}

/// Every list with its tasks.
pub fn collect<S: TaskService>(
    service: &S,
    show_completed: bool,
    show_hidden: bool,
) -> Result<Vec<(TaskList, Vec<RemoteTask>)>, TasksError> {
    service
        .list_all_lists()?
        .into_iter()
        .map(|list| {
            let tasks = service.list_tasks(&list.id, show_completed, show_hidden)?;
            Ok((list, tasks))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::{InMemoryTaskService, NewTask};

    #[test]
    fn test_collect_pairs_lists_with_tasks() {
        let mut service = InMemoryTaskService::new().with_list("Work").with_list("Home");
        service.create_task("list-2", &NewTask::new("Buy milk")).unwrap();

        let lists = collect(&service, false, false).unwrap();
        assert_eq!(lists.len(), 2);
        assert!(lists[0].1.is_empty());
        assert_eq!(lists[1].0.title, "Home");
        assert_eq!(lists[1].1[0].title, "Buy milk");
    }

    #[test]
    fn test_collect_propagates_listing_failure() {
        let service = InMemoryTaskService::new().fail_listing();
        assert!(collect(&service, false, false).is_err());
    }
}
