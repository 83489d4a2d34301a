//! Plain-text rendering for the command output.

use crate::google::{ClearReport, RemoteTask, TaskList};
use crate::migrate::MigrationReport;
use crate::things::{Area, SourceTree, Task};
use std::collections::HashMap;

/// Render the Things hierarchy, grouped by area.
pub fn format_source_tree(tree: &SourceTree) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Things: {} areas, {} projects, {} tasks\n",
        tree.areas.len(),
        tree.projects.len(),
        tree.task_count()
    ));

    let area_titles: HashMap<&str, &str> = tree
        .areas
        .iter()
        .map(|a| (a.id.as_str(), a.title.as_str()))
        .collect();

    let mut sections: Vec<(Option<&Area>, Option<&str>)> =
        tree.areas.iter().map(|a| (Some(a), Some(a.id.as_str()))).collect();
    sections.push((None, None));

    for (area, area_id) in sections {
        let projects: Vec<_> = tree
            .projects
            .iter()
            .filter(|p| owner(p.project.area_id.as_deref(), &area_titles) == area_id)
            .collect();
        let standalone: Vec<_> = tree
            .standalone
            .iter()
            .filter(|t| owner(t.area_id.as_deref(), &area_titles) == area_id)
            .collect();
        if area.is_none() && projects.is_empty() && standalone.is_empty() {
            continue;
        }

        out.push('\n');
        match area {
            Some(area) => out.push_str(&format!("Area: {}\n", area.title)),
            None => out.push_str("No area\n"),
        }

        for entry in projects {
            out.push_str(&format!("  Project: {}\n", entry.project.title));
            for (heading, tasks) in &entry.headings {
                out.push_str(&format!("    Heading: {}\n", heading.title));
                for task in tasks {
                    out.push_str(&format!("      {}\n", task_line(task)));
                }
            }
            for task in &entry.tasks {
                out.push_str(&format!("    {}\n", task_line(task)));
            }
        }
        for task in standalone {
            out.push_str(&format!("  {}\n", task_line(task)));
        }
    }
    out
}

/// Area id if it names a known area, `None` otherwise.
fn owner<'a>(area_id: Option<&'a str>, known: &HashMap<&str, &str>) -> Option<&'a str> {
    area_id.filter(|id| known.contains_key(id))
}

fn task_line(task: &Task) -> String {
    let mark = match task.status.as_deref() {
        Some("completed") => "[x]",
        Some("canceled") => "[-]",
        _ => "[ ]",
    };
    match &task.due_date {
        Some(due) => format!("{} {} (due {})", mark, task.title, due),
        None => format!("{} {}", mark, task.title),
    }
}

/// Render task lists with their tasks, subtasks indented under parents.
pub fn format_task_lists(lists: &[(TaskList, Vec<RemoteTask>)]) -> String {
    if lists.is_empty() {
        return "No task lists found.\n".to_string();
    }

    let mut out = String::new();
    for (list, tasks) in lists {
        out.push_str(&format!("{} ({} tasks)\n", list.title, tasks.len()));

        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        let mut children: HashMap<&str, Vec<&RemoteTask>> = HashMap::new();
        let mut roots = Vec::new();
        for task in tasks {
            match task.parent.as_deref() {
                Some(parent) if ids.contains(&parent) => {
                    children.entry(parent).or_default().push(task)
                }
                _ => roots.push(task),
            }
        }

        for task in roots {
            out.push_str(&format!("  {}\n", remote_line(task)));
            for child in children.get(task.id.as_str()).into_iter().flatten() {
                out.push_str(&format!("    {}\n", remote_line(child)));
            }
        }
    }
    out
}

fn remote_line(task: &RemoteTask) -> String {
    let mark = if task.status.as_deref() == Some("completed") {
        "[x]"
    } else {
        "[ ]"
    };
    match task.due.as_deref() {
        Some(due) => format!(
            "{} {} (due {})",
            mark,
            task.title,
            due.split('T').next().unwrap_or(due)
        ),
        None => format!("{} {}", mark, task.title),
    }
}

/// Summary printed after a migration run.
pub fn format_migration_report(report: &MigrationReport) -> String {
    let mut out = String::new();
    out.push_str("Migration summary:\n");
    out.push_str(&format!("  Lists created:     {}\n", report.lists_created));
    out.push_str(&format!("  Lists reused:      {}\n", report.lists_reused));
    out.push_str(&format!("  Projects:          {}\n", report.projects));
    out.push_str(&format!("  Headings:          {}\n", report.headings));
    out.push_str(&format!("  Project tasks:     {}\n", report.project_tasks));
    out.push_str(&format!("  Standalone tasks:  {}\n", report.standalone_tasks));
    if report.due_dates_dropped > 0 {
        out.push_str(&format!(
            "  Due dates dropped: {} (invalid format, see log)\n",
            report.due_dates_dropped
        ));
    }
    if report.failures > 0 {
        out.push_str(&format!("  Failures:          {} (see log)\n", report.failures));
    }
    out
}

pub fn format_clear_report(report: &ClearReport) -> String {
    let mut out = format!("Deleted {} task lists.\n", report.deleted);
    if !report.failed.is_empty() {
        out.push_str(&format!("Could not delete {} lists:\n", report.failed.len()));
        for title in &report.failed {
            out.push_str(&format!("  {}\n", title));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::things::{Heading, Project, ProjectTree};

    fn task(id: &str, title: &str, area: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            notes: None,
            status: Some("incomplete".to_string()),
            due_date: None,
            area_id: area.map(str::to_string),
            project_id: None,
            heading_id: None,
        }
    }

    fn remote(id: &str, title: &str, parent: Option<&str>) -> RemoteTask {
        RemoteTask {
            id: id.to_string(),
            title: title.to_string(),
            notes: None,
            due: None,
            parent: parent.map(str::to_string),
            status: Some("needsAction".to_string()),
        }
    }

    #[test]
    fn test_source_tree_groups_by_area() {
        let mut write_docs = task("t1", "Write docs", None);
        write_docs.due_date = Some("2024-07-20".to_string());
        let tree = SourceTree {
            areas: vec![Area {
                id: "a1".to_string(),
                title: "Work".to_string(),
            }],
            projects: vec![ProjectTree {
                project: Project {
                    id: "p1".to_string(),
                    title: "Launch".to_string(),
                    notes: None,
                    area_id: Some("a1".to_string()),
                },
                headings: vec![(
                    Heading {
                        id: "h1".to_string(),
                        title: "Prep".to_string(),
                        project_id: "p1".to_string(),
                    },
                    vec![write_docs],
                )],
                tasks: vec![],
            }],
            standalone: vec![task("t2", "Buy milk", None)],
        };

        let text = format_source_tree(&tree);
        assert!(text.starts_with("Things: 1 areas, 1 projects, 2 tasks"));
        assert!(text.contains("Area: Work\n  Project: Launch\n    Heading: Prep\n      [ ] Write docs (due 2024-07-20)"));
        assert!(text.contains("No area\n  [ ] Buy milk"));
    }

    #[test]
    fn test_task_lists_nest_subtasks() {
        let lists = vec![(
            TaskList {
                id: "L1".to_string(),
                title: "Work".to_string(),
            },
            vec![
                remote("1", "Launch", None),
                remote("2", "--- Prep ---", Some("1")),
                remote("3", "Standalone", None),
            ],
        )];
        let text = format_task_lists(&lists);
        assert_eq!(
            text,
            "Work (3 tasks)\n  [ ] Launch\n    [ ] --- Prep ---\n  [ ] Standalone\n"
        );
    }

    #[test]
    fn test_task_lists_empty() {
        assert_eq!(format_task_lists(&[]), "No task lists found.\n");
    }

    #[test]
    fn test_remote_line_shows_date_part() {
        let mut t = remote("1", "Pay rent", None);
        t.due = Some("2024-07-20T00:00:00.000Z".to_string());
        assert_eq!(remote_line(&t), "[ ] Pay rent (due 2024-07-20)");
    }

    #[test]
    fn test_migration_report_mentions_failures_only_when_present() {
        let clean = format_migration_report(&MigrationReport::default());
        assert!(!clean.contains("Failures"));

        let report = MigrationReport {
            failures: 2,
            due_dates_dropped: 1,
            ..Default::default()
        };
        let text = format_migration_report(&report);
        assert!(text.contains("Failures:          2"));
        assert!(text.contains("Due dates dropped: 1"));
    }

    #[test]
    fn test_clear_report_lists_failures() {
        let report = ClearReport {
            deleted: 3,
            failed: vec!["Work".to_string()],
        };
        assert_eq!(
            format_clear_report(&report),
            "Deleted 3 task lists.\nCould not delete 1 lists:\n  Work\n"
        );
    }
}
