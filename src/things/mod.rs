//! Read-only access to the Things 3 SQLite database.
//!
//! Areas live in `TMArea`; projects, headings and to-dos all live in `TMTask`
//! distinguished by the `type` column. Every accessor skips trashed rows and
//! returns a fully materialized `Vec`.

pub mod types;

pub use types::{Area, Heading, Project, ProjectTree, SourceTree, Task};

use crate::error::SourceError;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Params, Row, params};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use types::{TYPE_HEADING, TYPE_PROJECT, TYPE_TASK, status_name};

const TASK_COLUMNS: &str = "uuid, title, notes, status, dueDate, area, project, heading";

/// Handle over one Things database file.
///
/// The connection is opened read-only and released when the handle is
/// closed or dropped.
pub struct ThingsDatabase {
    conn: Connection,
    path: PathBuf,
    /// Some Things versions have no `TMArea.trashed` column.
    areas_trashable: bool,
}

impl ThingsDatabase {
    /// Open the database at `path`.
    ///
    /// Fails with [`SourceError::NotFound`] when the file is missing and
    /// [`SourceError::Schema`] when it lacks the Things tables.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(SourceError::NotFound(path));
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        for table in ["TMArea", "TMTask"] {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    params![table],
                    |row| row.get(0),
                )
                .optional()?;
            if found.is_none() {
                return Err(SourceError::Schema {
                    path,
                    table: table.to_string(),
                });
            }
        }

        let areas_trashable = conn
            .query_row(
                "SELECT 1 FROM pragma_table_info('TMArea') WHERE name = 'trashed'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .is_some();

        debug!(path = %path.display(), areas_trashable, "Opened Things database");
        Ok(Self {
            conn,
            path,
            areas_trashable,
        })
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the connection, reporting any error SQLite returns on close.
    pub fn close(self) -> Result<(), SourceError> {
        let path = self.path;
        self.conn.close().map_err(|(_, e)| SourceError::Query(e))?;
        debug!(path = %path.display(), "Closed Things database");
        Ok(())
    }

    /// All areas.
    pub fn list_areas(&self) -> Result<Vec<Area>, SourceError> {
        let filter = if self.areas_trashable {
            "WHERE trashed = 0 "
        } else {
            ""
        };
        let sql = format!("SELECT uuid, title FROM TMArea {filter}ORDER BY \"index\", uuid");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(Area {
                id: row.get("uuid")?,
                title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// All projects, each with its owning area id if any.
    pub fn list_projects(&self) -> Result<Vec<Project>, SourceError> {
        let sql = format!(
            "SELECT uuid, title, notes, area FROM TMTask \
             WHERE type = {TYPE_PROJECT} AND trashed = 0 ORDER BY \"index\", uuid"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(Project {
                id: row.get("uuid")?,
                title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
                notes: row.get("notes")?,
                area_id: row.get("area")?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Headings of one project.
    pub fn list_headings_of(&self, project_id: &str) -> Result<Vec<Heading>, SourceError> {
        let sql = format!(
            "SELECT uuid, title, project FROM TMTask \
             WHERE type = {TYPE_HEADING} AND trashed = 0 AND project = ?1 \
             ORDER BY \"index\", uuid"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(Heading {
                id: row.get("uuid")?,
                title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
                project_id: row.get("project")?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Tasks placed directly in a project, outside any heading.
    pub fn list_direct_tasks_of(&self, project_id: &str) -> Result<Vec<Task>, SourceError> {
        self.query_tasks(" AND project = ?1 AND heading IS NULL", params![project_id])
    }

    /// Tasks under one heading.
    pub fn list_tasks_of(&self, heading_id: &str) -> Result<Vec<Task>, SourceError> {
        self.query_tasks(" AND heading = ?1", params![heading_id])
    }

    /// Every task regardless of ownership.
    pub fn list_all_tasks(&self) -> Result<Vec<Task>, SourceError> {
        self.query_tasks("", params![])
    }

    /// Read the whole hierarchy in one go, for display.
    pub fn read_tree(&self) -> Result<SourceTree, SourceError> {
        let mut projects = Vec::new();
        let mut nested = HashSet::new();
        for project in self.list_projects()? {
            let mut headings = Vec::new();
            for heading in self.list_headings_of(&project.id)? {
                let tasks = self.list_tasks_of(&heading.id)?;
                nested.extend(tasks.iter().map(|t| t.id.clone()));
                headings.push((heading, tasks));
            }
            let tasks = self.list_direct_tasks_of(&project.id)?;
            projects.push(ProjectTree {
                project,
                headings,
                tasks,
            });
        }

        // Heading tasks carry no project; those whose heading is gone are
        // migrated as standalone, so they are listed here too.
        let standalone = self
            .list_all_tasks()?
            .into_iter()
            .filter(|t| t.is_standalone() && !nested.contains(&t.id))
            .collect();

        Ok(SourceTree {
            areas: self.list_areas()?,
            projects,
            standalone,
        })
    }

    fn query_tasks<P: Params>(&self, filter: &str, params: P) -> Result<Vec<Task>, SourceError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM TMTask \
             WHERE type = {TYPE_TASK} AND trashed = 0{filter} ORDER BY \"index\", uuid"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, parse_task_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("uuid")?,
        title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
        notes: row.get("notes")?,
        status: decode_status(row.get_ref("status")?),
        due_date: decode_due_date(row.get_ref("dueDate")?),
        area_id: row.get("area")?,
        project_id: row.get("project")?,
        heading_id: row.get("heading")?,
    })
}

/// Status is an integer code in Things itself but free text in some exports.
fn decode_status(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Integer(code) => Some(status_name(code)),
        ValueRef::Real(code) => Some(status_name(code as i64)),
        ValueRef::Text(text) => Some(String::from_utf8_lossy(text).into_owned()),
    }
}

/// Text dates pass through untouched; numeric dates are Unix seconds.
fn decode_due_date(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Integer(secs) => epoch_to_date(secs),
        ValueRef::Real(secs) => epoch_to_date(secs as i64),
        ValueRef::Text(text) => Some(String::from_utf8_lossy(text).into_owned()),
    }
}

fn epoch_to_date(secs: i64) -> Option<String> {
    chrono::DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_due_date_variants() {
        assert_eq!(decode_due_date(ValueRef::Null), None);
        assert_eq!(
            decode_due_date(ValueRef::Text(b"2024-07-20")),
            Some("2024-07-20".to_string())
        );
        // 2024-07-20T00:00:00Z
        assert_eq!(
            decode_due_date(ValueRef::Integer(1_721_433_600)),
            Some("2024-07-20".to_string())
        );
        assert_eq!(
            decode_due_date(ValueRef::Real(1_721_433_600.5)),
            Some("2024-07-20".to_string())
        );
    }

    #[test]
    fn test_decode_status_variants() {
        assert_eq!(decode_status(ValueRef::Integer(3)), Some("completed".to_string()));
        assert_eq!(decode_status(ValueRef::Text(b"incomplete")), Some("incomplete".to_string()));
        assert_eq!(decode_status(ValueRef::Null), None);
    }

    #[test]
    fn test_open_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("main.sqlite");
        match ThingsDatabase::open(&missing) {
            Err(SourceError::NotFound(path)) => assert_eq!(path, missing),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opening a missing file must fail"),
        }
    }
}
