//! Row types read from the Things database.

use serde::Serialize;

/// `TMTask.type` value for a to-do.
pub const TYPE_TASK: i64 = 0;
/// `TMTask.type` value for a project.
pub const TYPE_PROJECT: i64 = 1;
/// `TMTask.type` value for a heading inside a project.
pub const TYPE_HEADING: i64 = 2;

/// Top-level grouping. Becomes one Google task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub id: String,
    pub title: String,
}

/// A project, optionally filed under an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub notes: Option<String>,
    pub area_id: Option<String>,
}

/// A heading inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub id: String,
    pub title: String,
    pub project_id: String,
}

/// A to-do.
///
/// At most one of the owner ids is meaningful: tasks inside a project carry
/// `project_id` (and `heading_id` when nested under a heading); a task with
/// no project is standalone and may carry `area_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub notes: Option<String>,
    pub status: Option<String>,
    /// Due date as stored, usually `YYYY-MM-DD`. Not validated here.
    pub due_date: Option<String>,
    pub area_id: Option<String>,
    pub project_id: Option<String>,
    pub heading_id: Option<String>,
}

impl Task {
    /// A task with no owning project.
    pub fn is_standalone(&self) -> bool {
        self.project_id.is_none()
    }
}

/// A project with everything nested under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectTree {
    pub project: Project,
    pub headings: Vec<(Heading, Vec<Task>)>,
    /// Tasks directly in the project, outside any heading.
    pub tasks: Vec<Task>,
}

/// The full source hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceTree {
    pub areas: Vec<Area>,
    pub projects: Vec<ProjectTree>,
    /// Tasks outside any project or heading.
    pub standalone: Vec<Task>,
}

impl SourceTree {
    pub fn task_count(&self) -> usize {
        let nested: usize = self
            .projects
            .iter()
            .map(|p| p.tasks.len() + p.headings.iter().map(|(_, t)| t.len()).sum::<usize>())
            .sum();
        nested + self.standalone.len()
    }
}

/// Map a numeric Things status to its name.
pub fn status_name(code: i64) -> String {
    match code {
        0 => "incomplete".to_string(),
        2 => "canceled".to_string(),
        3 => "completed".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_name() {
        assert_eq!(status_name(0), "incomplete");
        assert_eq!(status_name(2), "canceled");
        assert_eq!(status_name(3), "completed");
        assert_eq!(status_name(7), "7");
    }
}
