//! Blocking REST client for the Google Tasks API v1.

use super::auth::{self, ClientSecrets};
use super::types::{NewTask, RemoteTask, TaskInsert, TaskList};
use super::TaskService;
use crate::error::TasksError;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

pub const TASKS_API: &str = "https://tasks.googleapis.com/tasks/v1";

/// Largest page the API serves.
const PAGE_SIZE: &str = "100";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    items: Option<Vec<T>>,
    next_page_token: Option<String>,
}

/// Authenticated Google Tasks client.
pub struct GoogleTasksClient {
    http: Client,
    access_token: String,
    base_url: String,
}

impl GoogleTasksClient {
    /// Build a client around an already obtained access token.
    pub fn new(access_token: impl Into<String>) -> Result<Self, TasksError> {
        let http = Client::builder()
            .user_agent(concat!("things-to-google-tasks/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            access_token: access_token.into(),
            base_url: TASKS_API.to_string(),
        })
    }

    /// Authorize with the client secrets at `credentials_path`, reusing or
    /// refreshing the token cached at `token_path`, and build a client.
    pub fn connect(credentials_path: &Path, token_path: &Path) -> Result<Self, TasksError> {
        let secrets = ClientSecrets::load(credentials_path)?;
        let access_token = auth::authorize(&secrets, token_path)?;
        let client = Self::new(access_token)?;
        info!("Google Tasks client ready");
        Ok(client)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.access_token)
    }

    /// Follow `nextPageToken` until the collection is exhausted.
    fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, TasksError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .get(path)
                .query(query)
                .query(&[("maxResults", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: Page<T> = check(request.send()?)?.json()?;
            items.extend(page.items.unwrap_or_default());

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(items)
    }
}

/// Turn a non-success response into a [`TasksError`].
fn check(response: Response) -> Result<Response, TasksError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(TasksError::from_response(status.as_u16(), &body))
}

fn encode(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

impl TaskService for GoogleTasksClient {
    fn list_all_lists(&self) -> Result<Vec<TaskList>, TasksError> {
        self.get_all("/users/@me/lists", &[])
    }

    fn create_list(&mut self, title: &str) -> Result<TaskList, TasksError> {
        let response = self
            .http
            .post(format!("{}/users/@me/lists", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "title": title }))
            .send()?;
        let list: TaskList = check(response)?.json()?;
        info!(list_id = %list.id, title = %list.title, "Task list created");
        Ok(list)
    }

    fn create_task(&mut self, list_id: &str, task: &NewTask) -> Result<RemoteTask, TasksError> {
        let body = TaskInsert::from_new_task(task);
        let mut request = self
            .http
            .post(format!("{}/lists/{}/tasks", self.base_url, encode(list_id)))
            .bearer_auth(&self.access_token)
            .json(&body);
        if let Some(parent) = &task.parent {
            request = request.query(&[("parent", parent.as_str())]);
        }

        let created: RemoteTask = check(request.send()?)?.json()?;
        debug!(list_id, task_id = %created.id, title = %created.title, "Task created");
        Ok(created)
    }

    fn list_tasks(
        &self,
        list_id: &str,
        show_completed: bool,
        show_hidden: bool,
    ) -> Result<Vec<RemoteTask>, TasksError> {
        let show_completed = show_completed.to_string();
        let show_hidden = show_hidden.to_string();
        self.get_all(
            &format!("/lists/{}/tasks", encode(list_id)),
            &[
                ("showCompleted", show_completed.as_str()),
                ("showHidden", show_hidden.as_str()),
            ],
        )
    }

    fn delete_list(&mut self, list_id: &str) -> Result<(), TasksError> {
        let response = self
            .http
            .delete(format!("{}/users/@me/lists/{}", self.base_url, encode(list_id)))
            .bearer_auth(&self.access_token)
            .send()?;
        check(response)?;
        info!(list_id, "Task list deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_parses_items_and_token() {
        let body = r#"{
            "kind": "tasks#taskLists",
            "nextPageToken": "CgYI",
            "items": [{"kind": "tasks#taskList", "id": "L1", "title": "Work"}]
        }"#;
        let page: Page<TaskList> = serde_json::from_str(body).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("CgYI"));
        assert_eq!(page.items.unwrap()[0].title, "Work");
    }

    #[test]
    fn test_page_without_items() {
        let page: Page<RemoteTask> = serde_json::from_str(r#"{"kind": "tasks#tasks"}"#).unwrap();
        assert!(page.items.is_none());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_encode_list_id() {
        assert_eq!(encode("MTA2Nz/k"), "MTA2Nz%2Fk");
    }
}
