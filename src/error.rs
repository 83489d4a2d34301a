//! Structured error types for the source store, the Google Tasks service,
//! and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the Things database.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Things database not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{} is not a Things database: missing table {table}", .path.display())]
    Schema { path: PathBuf, table: String },

    #[error("Things database query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Errors raised by a [`TaskService`](crate::google::TaskService) call.
#[derive(Debug, Error)]
pub enum TasksError {
    /// The addressed list or task does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The service answered with a non-success status.
    #[error("Google Tasks API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("authorization failed: {0}")]
    Auth(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure injected by the in-memory service.
    #[error("simulated failure: {0}")]
    Simulated(String),
}

impl TasksError {
    /// Build an API error from a status code and raw response body,
    /// pulling `error.message` out of Google's JSON error envelope when present.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| truncate(body.trim(), 240));

        if status == 404 {
            TasksError::NotFound(message)
        } else {
            TasksError::Api { status, message }
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Things database path was not provided; use --db-path, THINGS_DB_PATH, or things.db_path in the config file"
    )]
    MissingDbPath,

    #[error(
        "Google API credentials path was not provided; use --creds-path, GOOGLE_API_CREDENTIALS_PATH, or google.credentials_path in the config file"
    )]
    MissingCredentialsPath,

    #[error("{what} does not exist: {}", .path.display())]
    PathNotFound { what: &'static str, path: PathBuf },

    #[error("migration.heading_format must contain '{{}}', got {0:?}")]
    InvalidHeadingFormat(String),

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),
}

fn truncate(message: &str, max: usize) -> String {
    let mut out = message.replace(['\n', '\r'], " ");
    if out.len() > max {
        let mut cut = max;
        while !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
        out.push_str("...");
    }
    out
}
