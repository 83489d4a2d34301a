//! Destination side: the Google Tasks service.
//!
//! [`TaskService`] is the seam the migration driver talks to.
//! [`GoogleTasksClient`] implements it over the REST API and
//! [`InMemoryTaskService`] implements it in process for dry runs.

pub mod auth;
pub mod client;
pub mod memory;
pub mod types;

pub use client::GoogleTasksClient;
pub use memory::InMemoryTaskService;
pub use types::{NewTask, RemoteTask, TaskInsert, TaskList, normalize_due_date};

use crate::error::TasksError;
use tracing::{info, warn};

/// Operations the migration needs from a hierarchical task-list service.
pub trait TaskService {
    /// Every task list on the account.
    fn list_all_lists(&self) -> Result<Vec<TaskList>, TasksError>;

    /// First list whose title matches exactly (case-sensitive).
    fn find_list_by_title(&self, title: &str) -> Result<Option<TaskList>, TasksError> {
        Ok(self
            .list_all_lists()?
            .into_iter()
            .find(|list| list.title == title))
    }

    fn create_list(&mut self, title: &str) -> Result<TaskList, TasksError>;

    /// Create a task. An unparseable due date is dropped, not fatal; the
    /// returned task then has no `due`.
    fn create_task(&mut self, list_id: &str, task: &NewTask) -> Result<RemoteTask, TasksError>;

    /// Tasks of one list, in service order.
    fn list_tasks(
        &self,
        list_id: &str,
        show_completed: bool,
        show_hidden: bool,
    ) -> Result<Vec<RemoteTask>, TasksError>;

    fn delete_list(&mut self, list_id: &str) -> Result<(), TasksError>;

    /// Delete every list and, with them, every task.
    ///
    /// Individual delete failures are logged and counted; only failing to
    /// enumerate the lists is an error.
    fn clear_everything(&mut self) -> Result<ClearReport, TasksError> {
        let lists = self.list_all_lists()?;
        let mut report = ClearReport::default();
        if lists.is_empty() {
            info!("No task lists found to delete");
            return Ok(report);
        }

        for list in lists {
            info!(list_id = %list.id, title = %list.title, "Deleting task list");
            match self.delete_list(&list.id) {
                Ok(()) => report.deleted += 1,
                Err(TasksError::NotFound(_)) => {
                    warn!(list_id = %list.id, "Task list already gone");
                    report.failed.push(list.title);
                }
                Err(e) => {
                    warn!(list_id = %list.id, title = %list.title, error = %e, "Failed to delete task list");
                    report.failed.push(list.title);
                }
            }
        }
        Ok(report)
    }
}

/// Outcome of [`TaskService::clear_everything`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClearReport {
    pub deleted: usize,
    /// Titles of lists that could not be deleted.
    pub failed: Vec<String>,
}
