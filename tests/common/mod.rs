//! Things database fixtures for the integration tests.
#![allow(dead_code)]

use rusqlite::{Connection, params};
use std::path::PathBuf;
use tempfile::TempDir;
use things_to_google_tasks::things::ThingsDatabase;

const SCHEMA: &str = include_str!("../fixtures/things_schema.sql");

/// A to-do row; unset fields are NULL.
#[derive(Default)]
pub struct TaskRow<'a> {
    pub uuid: &'a str,
    pub title: &'a str,
    pub notes: Option<&'a str>,
    pub area: Option<&'a str>,
    pub project: Option<&'a str>,
    pub heading: Option<&'a str>,
    pub due: Option<&'a str>,
    pub status: i64,
    pub trashed: bool,
}

/// A Things database written to a temporary directory.
pub struct ThingsFixture {
    dir: TempDir,
    conn: Connection,
    next_index: i64,
}

impl ThingsFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let conn = Connection::open(dir.path().join("main.sqlite")).expect("Failed to create db");
        conn.execute_batch(SCHEMA).expect("Failed to create schema");
        Self {
            dir,
            conn,
            next_index: 0,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("main.sqlite")
    }

    pub fn open(&self) -> ThingsDatabase {
        ThingsDatabase::open(self.path()).expect("Failed to open fixture")
    }

    fn index(&mut self) -> i64 {
        self.next_index += 1;
        self.next_index
    }

    pub fn area(&mut self, uuid: &str, title: &str) -> &mut Self {
        self.insert_area(uuid, title, false)
    }

    pub fn trashed_area(&mut self, uuid: &str, title: &str) -> &mut Self {
        self.insert_area(uuid, title, true)
    }

    fn insert_area(&mut self, uuid: &str, title: &str, trashed: bool) -> &mut Self {
        let index = self.index();
        self.conn
            .execute(
                "INSERT INTO TMArea (uuid, title, \"index\", trashed) VALUES (?1, ?2, ?3, ?4)",
                params![uuid, title, index, trashed as i64],
            )
            .expect("Failed to insert area");
        self
    }

    pub fn project(&mut self, uuid: &str, title: &str, area: Option<&str>) -> &mut Self {
        self.insert(1, uuid, title, None, area, None, false)
    }

    pub fn project_with_notes(
        &mut self,
        uuid: &str,
        title: &str,
        notes: &str,
        area: Option<&str>,
    ) -> &mut Self {
        self.insert(1, uuid, title, Some(notes), area, None, false)
    }

    pub fn trashed_project(&mut self, uuid: &str, title: &str) -> &mut Self {
        self.insert(1, uuid, title, None, None, None, true)
    }

    pub fn heading(&mut self, uuid: &str, title: &str, project: &str) -> &mut Self {
        self.insert(2, uuid, title, None, None, Some(project), false)
    }

    #[allow(clippy::too_many_arguments)]
    fn insert(
        &mut self,
        kind: i64,
        uuid: &str,
        title: &str,
        notes: Option<&str>,
        area: Option<&str>,
        project: Option<&str>,
        trashed: bool,
    ) -> &mut Self {
        let index = self.index();
        self.conn
            .execute(
                "INSERT INTO TMTask (uuid, type, title, notes, area, project, trashed, \"index\") \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![uuid, kind, title, notes, area, project, trashed as i64, index],
            )
            .expect("Failed to insert row");
        self
    }

    pub fn task(&mut self, row: TaskRow<'_>) -> &mut Self {
        let index = self.index();
        self.conn
            .execute(
                "INSERT INTO TMTask \
                 (uuid, type, title, notes, area, project, heading, status, dueDate, trashed, \"index\") \
                 VALUES (?1, 0, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    row.uuid,
                    row.title,
                    row.notes,
                    row.area,
                    row.project,
                    row.heading,
                    row.status,
                    row.due,
                    row.trashed as i64,
                    index
                ],
            )
            .expect("Failed to insert task");
        self
    }

    /// Run raw SQL against the fixture.
    pub fn execute(&mut self, sql: &str) -> &mut Self {
        self.conn.execute_batch(sql).expect("Failed to execute SQL");
        self
    }
}

/// Work / Launch / Prep / Write docs, plus a standalone Buy milk.
pub fn launch_fixture() -> ThingsFixture {
    let mut fixture = ThingsFixture::new();
    fixture
        .area("A1", "Work")
        .project("P1", "Launch", Some("A1"))
        .heading("H1", "Prep", "P1")
        .task(TaskRow {
            uuid: "T1",
            title: "Write docs",
            heading: Some("H1"),
            due: Some("2024-07-20"),
            ..Default::default()
        })
        .task(TaskRow {
            uuid: "T2",
            title: "Buy milk",
            ..Default::default()
        });
    fixture
}
