//! Google Tasks resources and request bodies.

use chrono::{NaiveDate, NaiveTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A task list (`tasks#taskList`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// A task (`tasks#task`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTask {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// RFC 3339 timestamp; Google only keeps the date part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    /// Parent task id, absent for top-level tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A task to create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub notes: Option<String>,
    /// Due date text as read from the source, expected as `YYYY-MM-DD`.
    pub due: Option<String>,
    pub parent: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_due(mut self, due: Option<String>) -> Self {
        self.due = due;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// JSON body of a `tasks.insert` call.
///
/// The parent is not part of the body; it travels as a query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskInsert {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

impl TaskInsert {
    /// Build the request body, normalizing the due date.
    ///
    /// Empty notes and empty due text are dropped. Due text that is not a
    /// `YYYY-MM-DD` date is dropped with a warning; the task is still created.
    pub fn from_new_task(task: &NewTask) -> Self {
        let notes = task.notes.clone().filter(|n| !n.is_empty());
        let due = match task.due.as_deref() {
            None | Some("") => None,
            Some(text) => match normalize_due_date(text) {
                Ok(due) => Some(due),
                Err(err) => {
                    warn!(
                        title = %task.title,
                        due = %text,
                        error = %err,
                        "Invalid due date format, expected YYYY-MM-DD; creating task without a due date"
                    );
                    None
                }
            },
        };

        Self {
            title: task.title.clone(),
            notes,
            due,
        }
    }
}

/// Convert `YYYY-MM-DD` into the RFC 3339 timestamp Google Tasks expects,
/// pinned to midnight UTC (`2024-07-20` → `2024-07-20T00:00:00.000Z`).
pub fn normalize_due_date(text: &str) -> Result<String, chrono::ParseError> {
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")?;
    Ok(date
        .and_time(NaiveTime::MIN)
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Millis, true))
}
