//! Migration driver: maps the Things hierarchy onto Google Tasks.
//!
//! Things nests area → project → heading → to-do; Google Tasks only has
//! list → task → subtask. The run is split in three phases:
//!
//! 1. every area becomes a task list, reused by title when it already exists;
//! 2. every project becomes a top-level task, its headings become placeholder
//!    subtasks and its to-dos hang off the project or the placeholder;
//! 3. every to-do not placed in phase 2 and not part of a project is added
//!    at the top level of its area's list.
//!
//! Items without a usable list go to a single default list. Each item's
//! failure is logged and skipped; a phase that fails as a whole is logged and
//! the next phase still runs.

pub mod default_list;
pub mod report;

pub use default_list::{DefaultList, Resolution};
pub use report::MigrationReport;

use crate::error::TasksError;
use crate::google::{NewTask, RemoteTask, TaskList, TaskService};
use crate::things::{Heading, Project, Task, ThingsDatabase};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info, warn};

pub const DEFAULT_LIST_TITLE: &str = "Things Imported Tasks";
pub const DEFAULT_HEADING_FORMAT: &str = "--- {} ---";

/// Knobs for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationOptions {
    /// Title of the list that receives items without an area list.
    pub default_list_title: String,
    /// Title template for heading placeholders; `{}` is the heading title.
    pub heading_format: String,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            default_list_title: DEFAULT_LIST_TITLE.to_string(),
            heading_format: DEFAULT_HEADING_FORMAT.to_string(),
        }
    }
}

/// Title of the placeholder task standing in for a heading.
pub fn heading_title(format: &str, heading: &str) -> String {
    format.replacen("{}", heading, 1)
}

/// State of a single migration run. Nothing is persisted between runs.
pub struct Migrator<'a, S: TaskService> {
    source: &'a ThingsDatabase,
    service: &'a mut S,
    heading_format: String,
    list_cache: HashMap<String, TaskList>,
    default_list: DefaultList,
    placed: HashSet<String>,
    /// Headings and tasks phase 2 gave up on; kept out of the sweep.
    skipped: HashSet<String>,
    report: MigrationReport,
}

impl<'a, S: TaskService> Migrator<'a, S> {
    pub fn new(source: &'a ThingsDatabase, service: &'a mut S, options: &MigrationOptions) -> Self {
        Self {
            source,
            service,
            heading_format: options.heading_format.clone(),
            list_cache: HashMap::new(),
            default_list: DefaultList::new(options.default_list_title.clone()),
            placed: HashSet::new(),
            skipped: HashSet::new(),
            report: MigrationReport::default(),
        }
    }

    /// Run all three phases in order and return the counters.
    pub fn run(mut self) -> MigrationReport {
        info!(source = %self.source.path().display(), "Starting migration");

        if let Err(e) = self.migrate_areas() {
            error!("Area migration aborted: {:?}", e);
        }
        if let Err(e) = self.migrate_projects() {
            error!("Project migration aborted: {:?}", e);
        }
        if let Err(e) = self.migrate_standalone_tasks() {
            error!("Standalone task migration aborted: {:?}", e);
        }

        info!(
            lists_created = self.report.lists_created,
            tasks_created = self.report.tasks_created(),
            failures = self.report.failures,
            "Migration finished"
        );
        self.report
    }

    /// Phase 1: one list per area.
    pub fn migrate_areas(&mut self) -> Result<()> {
        let areas = self.source.list_areas().context("reading areas")?;
        info!(count = areas.len(), "Migrating areas to task lists");

        for area in areas {
            let existing = match self.service.find_list_by_title(&area.title) {
                Ok(found) => found,
                Err(e) => {
                    warn!(area_id = %area.id, title = %area.title, error = %e, "List lookup failed, creating list");
                    None
                }
            };

            let list = match existing {
                Some(list) => {
                    info!(area_id = %area.id, list_id = %list.id, title = %list.title, "Reusing existing list");
                    self.report.lists_reused += 1;
                    list
                }
                None => match self.service.create_list(&area.title) {
                    Ok(list) => {
                        info!(area_id = %area.id, list_id = %list.id, title = %list.title, "Created list for area");
                        self.report.lists_created += 1;
                        list
                    }
                    Err(e) => {
                        warn!(area_id = %area.id, title = %area.title, error = %e, "Failed to create list for area");
                        self.report.failures += 1;
                        continue;
                    }
                },
            };
            self.list_cache.insert(area.id, list);
        }
        Ok(())
    }

    /// Phase 2: projects with their headings and to-dos, depth first.
    pub fn migrate_projects(&mut self) -> Result<()> {
        let projects = self.source.list_projects().context("reading projects")?;
        info!(count = projects.len(), "Migrating projects");

        for project in &projects {
            self.migrate_project(project)
                .with_context(|| format!("migrating project '{}' ({})", project.title, project.id))?;
        }
        Ok(())
    }

    fn migrate_project(&mut self, project: &Project) -> Result<()> {
        let Some(list) = self.resolve_list(project.area_id.as_deref()) else {
            warn!(project_id = %project.id, title = %project.title, "No list available, skipping project");
            self.report.failures += 1;
            return self.skip_headings_of(&project.id);
        };

        let new = NewTask::new(&project.title).with_notes(project.notes.clone());
        let parent = match self.create(&list.id, &new) {
            Ok(task) => task,
            Err(e) => {
                warn!(project_id = %project.id, title = %project.title, list_id = %list.id, error = %e, "Failed to create project task, skipping project");
                self.report.failures += 1;
                return self.skip_headings_of(&project.id);
            }
        };
        self.placed.insert(project.id.clone());
        self.report.projects += 1;
        debug!(project_id = %project.id, task_id = %parent.id, "Project placed");

        let headings = self
            .source
            .list_headings_of(&project.id)
            .context("reading headings")?;
        for heading in &headings {
            self.migrate_heading(heading, &list, &parent)?;
        }

        let tasks = self
            .source
            .list_direct_tasks_of(&project.id)
            .context("reading project tasks")?;
        for task in &tasks {
            self.migrate_child(task, &list, &parent);
        }
        Ok(())
    }

    fn migrate_heading(&mut self, heading: &Heading, list: &TaskList, project: &RemoteTask) -> Result<()> {
        let title = heading_title(&self.heading_format, &heading.title);
        let new = NewTask::new(title).with_parent(&project.id);
        let placeholder = match self.create(&list.id, &new) {
            Ok(task) => task,
            Err(e) => {
                warn!(heading_id = %heading.id, title = %heading.title, error = %e, "Failed to create heading placeholder, skipping its tasks");
                self.report.failures += 1;
                self.skipped.insert(heading.id.clone());
                return Ok(());
            }
        };
        self.placed.insert(heading.id.clone());
        self.report.headings += 1;

        let tasks = self
            .source
            .list_tasks_of(&heading.id)
            .context("reading heading tasks")?;
        for task in &tasks {
            self.migrate_child(task, list, &placeholder);
        }
        Ok(())
    }

    fn migrate_child(&mut self, task: &Task, list: &TaskList, parent: &RemoteTask) {
        let new = NewTask::new(&task.title)
            .with_notes(task.notes.clone())
            .with_due(task.due_date.clone())
            .with_parent(&parent.id);
        match self.create(&list.id, &new) {
            Ok(created) => {
                self.placed.insert(task.id.clone());
                self.report.project_tasks += 1;
                debug!(task_id = %task.id, remote_id = %created.id, parent = %parent.id, "Task placed");
            }
            Err(e) => {
                warn!(task_id = %task.id, title = %task.title, error = %e, "Failed to create task");
                self.report.failures += 1;
                self.skipped.insert(task.id.clone());
            }
        }
    }

    /// Phase 3: to-dos outside any project that phase 2 did not place.
    pub fn migrate_standalone_tasks(&mut self) -> Result<()> {
        let tasks = self.source.list_all_tasks().context("reading tasks")?;
        let pending: Vec<Task> = tasks
            .into_iter()
            .filter(|t| !self.placed.contains(&t.id) && t.is_standalone())
            .filter(|t| !self.skipped.contains(&t.id))
            .filter(|t| {
                t.heading_id
                    .as_ref()
                    .is_none_or(|h| !self.skipped.contains(h))
            })
            .collect();
        info!(count = pending.len(), "Migrating standalone tasks");

        for task in &pending {
            if let Some(heading_id) = &task.heading_id {
                warn!(task_id = %task.id, heading_id = %heading_id, "Task has a heading but no project, migrating it as standalone");
            }

            let Some(list) = self.resolve_list(task.area_id.as_deref()) else {
                warn!(task_id = %task.id, title = %task.title, "No list available, skipping task");
                self.report.failures += 1;
                continue;
            };

            let new = NewTask::new(&task.title)
                .with_notes(task.notes.clone())
                .with_due(task.due_date.clone());
            match self.create(&list.id, &new) {
                Ok(created) => {
                    self.report.standalone_tasks += 1;
                    debug!(task_id = %task.id, remote_id = %created.id, list_id = %list.id, "Standalone task placed");
                }
                Err(e) => {
                    warn!(task_id = %task.id, title = %task.title, list_id = %list.id, error = %e, "Failed to create standalone task");
                    self.report.failures += 1;
                }
            }
        }
        Ok(())
    }

    /// The area's list, or the default list when the area has none.
    fn resolve_list(&mut self, area_id: Option<&str>) -> Option<TaskList> {
        if let Some(list) = area_id.and_then(|id| self.list_cache.get(id)) {
            return Some(list.clone());
        }
        let (list, resolution) = self.default_list.get_or_create(&mut *self.service)?;
        match resolution {
            Resolution::Created => self.report.lists_created += 1,
            Resolution::Reused => self.report.lists_reused += 1,
            Resolution::Cached => {}
        }
        Some(list)
    }

    fn create(&mut self, list_id: &str, new: &NewTask) -> Result<RemoteTask, TasksError> {
        let created = self.service.create_task(list_id, new)?;
        if new.due.as_deref().is_some_and(|d| !d.is_empty()) && created.due.is_none() {
            self.report.due_dates_dropped += 1;
        }
        Ok(created)
    }

    /// Keep a skipped project's heading tasks out of the standalone sweep.
    fn skip_headings_of(&mut self, project_id: &str) -> Result<()> {
        let headings = self
            .source
            .list_headings_of(project_id)
            .context("reading headings of skipped project")?;
        self.skipped.extend(headings.into_iter().map(|h| h.id));
        Ok(())
    }

    /// Ids placed by the project phase.
    pub fn placed(&self) -> &HashSet<String> {
        &self.placed
    }

    /// The list resolved for an area in phase 1.
    pub fn list_for_area(&self, area_id: &str) -> Option<&TaskList> {
        self.list_cache.get(area_id)
    }

    /// The default list, if it has been resolved.
    pub fn default_list(&self) -> Option<&TaskList> {
        self.default_list.cached()
    }

    pub fn report(&self) -> &MigrationReport {
        &self.report
    }
}
