//! Counters collected during one migration run.

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Lists created for areas, plus the default list if it was created.
    pub lists_created: usize,
    /// Lists that already existed and were reused by title.
    pub lists_reused: usize,
    pub projects: usize,
    pub headings: usize,
    /// Tasks placed under a project or one of its headings.
    pub project_tasks: usize,
    pub standalone_tasks: usize,
    /// Items that could not be created, including skipped subtrees' roots.
    pub failures: usize,
    /// Tasks created without the due date they carried in Things.
    pub due_dates_dropped: usize,
}

impl MigrationReport {
    /// Tasks of any kind created in the destination.
    pub fn tasks_created(&self) -> usize {
        self.projects + self.headings + self.project_tasks + self.standalone_tasks
    }

    pub fn is_clean(&self) -> bool {
        self.failures == 0 && self.due_dates_dropped == 0
    }
}
