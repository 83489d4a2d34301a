//! In-process [`TaskService`] used for dry runs and tests.

use super::TaskService;
use super::types::{NewTask, RemoteTask, TaskInsert, TaskList};
use crate::error::TasksError;
use std::cell::Cell;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredList {
    list: TaskList,
    tasks: Vec<RemoteTask>,
}

/// Task lists and tasks kept in memory, in insertion order.
///
/// Ids are deterministic (`list-1`, `task-1`, ...). Creation of particular
/// titles can be made to fail to exercise the migration's failure paths.
#[derive(Debug, Default)]
pub struct InMemoryTaskService {
    lists: Vec<StoredList>,
    next_list: usize,
    next_task: usize,
    fail_list_titles: HashSet<String>,
    fail_task_titles: HashSet<String>,
    fail_listing: bool,
    list_calls: Cell<usize>,
    create_list_calls: usize,
    create_task_calls: usize,
}

impl InMemoryTaskService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing list, as if created by an earlier run.
    pub fn with_list(mut self, title: &str) -> Self {
        self.insert_list(title);
        self
    }

    /// Make `create_list` fail for this title.
    pub fn fail_list_creation(mut self, title: &str) -> Self {
        self.fail_list_titles.insert(title.to_string());
        self
    }

    /// Make `create_task` fail for this title.
    pub fn fail_task_creation(mut self, title: &str) -> Self {
        self.fail_task_titles.insert(title.to_string());
        self
    }

    /// Make `list_all_lists` fail.
    pub fn fail_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn lists(&self) -> Vec<TaskList> {
        self.lists.iter().map(|s| s.list.clone()).collect()
    }

    pub fn list_by_title(&self, title: &str) -> Option<&TaskList> {
        self.lists
            .iter()
            .map(|s| &s.list)
            .find(|list| list.title == title)
    }

    /// Tasks of one list; empty if the list does not exist.
    pub fn tasks_in(&self, list_id: &str) -> &[RemoteTask] {
        self.lists
            .iter()
            .find(|s| s.list.id == list_id)
            .map(|s| s.tasks.as_slice())
            .unwrap_or(&[])
    }

    /// Every task with this title across all lists, with its list id.
    pub fn tasks_titled(&self, title: &str) -> Vec<(String, RemoteTask)> {
        self.lists
            .iter()
            .flat_map(|s| {
                s.tasks
                    .iter()
                    .filter(|t| t.title == title)
                    .map(|t| (s.list.id.clone(), t.clone()))
            })
            .collect()
    }

    pub fn task_count(&self) -> usize {
        self.lists.iter().map(|s| s.tasks.len()).sum()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.get()
    }

    pub fn create_list_calls(&self) -> usize {
        self.create_list_calls
    }

    pub fn create_task_calls(&self) -> usize {
        self.create_task_calls
    }

    fn insert_list(&mut self, title: &str) -> TaskList {
        self.next_list += 1;
        let list = TaskList {
            id: format!("list-{}", self.next_list),
            title: title.to_string(),
        };
        self.lists.push(StoredList {
            list: list.clone(),
            tasks: Vec::new(),
        });
        list
    }
}

impl TaskService for InMemoryTaskService {
    fn list_all_lists(&self) -> Result<Vec<TaskList>, TasksError> {
        self.list_calls.set(self.list_calls.get() + 1);
        if self.fail_listing {
            return Err(TasksError::Simulated("listing task lists".to_string()));
        }
        Ok(self.lists())
    }

    fn create_list(&mut self, title: &str) -> Result<TaskList, TasksError> {
        self.create_list_calls += 1;
        if self.fail_list_titles.contains(title) {
            return Err(TasksError::Simulated(format!("creating list '{}'", title)));
        }
        let list = self.insert_list(title);
        debug!(list_id = %list.id, title, "Task list created");
        Ok(list)
    }

    fn create_task(&mut self, list_id: &str, task: &NewTask) -> Result<RemoteTask, TasksError> {
        self.create_task_calls += 1;
        if self.fail_task_titles.contains(&task.title) {
            return Err(TasksError::Simulated(format!(
                "creating task '{}'",
                task.title
            )));
        }

        let body = TaskInsert::from_new_task(task);
        let next_id = format!("task-{}", self.next_task + 1);
        let stored = self
            .lists
            .iter_mut()
            .find(|s| s.list.id == list_id)
            .ok_or_else(|| TasksError::NotFound(format!("task list {}", list_id)))?;

        if let Some(parent) = &task.parent
            && !stored.tasks.iter().any(|t| &t.id == parent)
        {
            return Err(TasksError::NotFound(format!("parent task {}", parent)));
        }

        self.next_task += 1;
        let created = RemoteTask {
            id: next_id,
            title: body.title,
            notes: body.notes,
            due: body.due,
            parent: task.parent.clone(),
            status: Some("needsAction".to_string()),
        };
        stored.tasks.push(created.clone());
        Ok(created)
    }

    fn list_tasks(
        &self,
        list_id: &str,
        _show_completed: bool,
        _show_hidden: bool,
    ) -> Result<Vec<RemoteTask>, TasksError> {
        self.lists
            .iter()
            .find(|s| s.list.id == list_id)
            .map(|s| s.tasks.clone())
            .ok_or_else(|| TasksError::NotFound(format!("task list {}", list_id)))
    }

    fn delete_list(&mut self, list_id: &str) -> Result<(), TasksError> {
        let before = self.lists.len();
        self.lists.retain(|s| s.list.id != list_id);
        if self.lists.len() == before {
            return Err(TasksError::NotFound(format!("task list {}", list_id)));
        }
        Ok(())
    }
}
