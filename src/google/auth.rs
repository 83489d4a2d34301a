//! OAuth 2.0 for installed applications.
//!
//! The access token is cached as JSON next to the user's other files. A
//! cached token is reused while it has more than a minute left, refreshed
//! when it has a refresh token, and otherwise replaced by running the
//! loopback consent flow in the user's browser.

use crate::error::TasksError;
use chrono::Utc;
use reqwest::Url;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use tracing::{debug, info, warn};

/// Read/write access to task lists and tasks.
pub const TASKS_SCOPE: &str = "https://www.googleapis.com/auth/tasks";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Seconds of remaining validity below which a token is refreshed.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth client as downloaded from the Google Cloud console.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn load(path: &Path) -> Result<Self, TasksError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TasksError::Auth(format!(
                "cannot read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parse either the `installed` or the `web` client layout.
    pub fn from_json(content: &str) -> Result<Self, TasksError> {
        let file: SecretsFile = serde_json::from_str(content)?;
        file.installed.or(file.web).ok_or_else(|| {
            TasksError::Auth(
                "credentials file has neither an 'installed' nor a 'web' client".to_string(),
            )
        })
    }
}

/// Token cache persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds.
    pub expires_at: i64,
}

impl StoredToken {
    /// Load the cache; a missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>, TasksError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, path: &Path) -> Result<(), TasksError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "Token saved");
        Ok(())
    }

    pub fn is_fresh(&self, now: i64) -> bool {
        self.expires_at > now + EXPIRY_MARGIN_SECS
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

/// Return a usable access token, persisting any new one to `token_path`.
pub fn authorize(secrets: &ClientSecrets, token_path: &Path) -> Result<String, TasksError> {
    let http = Client::new();
    let now = Utc::now().timestamp();

    let cached = match StoredToken::load(token_path) {
        Ok(token) => token,
        Err(e) => {
            warn!(path = %token_path.display(), error = %e, "Ignoring unreadable token cache");
            None
        }
    };

    if let Some(token) = &cached
        && token.is_fresh(now)
    {
        debug!("Using cached access token");
        return Ok(token.access_token.clone());
    }

    let mut fresh = None;
    if let Some(refresh_token) = cached.as_ref().and_then(|t| t.refresh_token.as_deref()) {
        info!("Access token expired, refreshing");
        match refresh(&http, secrets, refresh_token) {
            Ok(token) => fresh = Some(token),
            Err(e) => warn!(error = %e, "Token refresh failed, re-authorizing"),
        }
    }

    let token = match fresh {
        Some(token) => token,
        None => {
            info!("No valid credentials found, starting OAuth consent flow");
            run_installed_flow(&http, secrets)?
        }
    };

    token.save(token_path)?;
    info!(path = %token_path.display(), "Credentials saved");
    Ok(token.access_token)
}

fn refresh(
    http: &Client,
    secrets: &ClientSecrets,
    refresh_token: &str,
) -> Result<StoredToken, TasksError> {
    let response = http
        .post(&secrets.token_uri)
        .form(&[
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .send()?;
    let token = token_from_response(response)?;
    Ok(StoredToken {
        refresh_token: token
            .refresh_token
            .or_else(|| Some(refresh_token.to_string())),
        ..token
    })
}

fn token_from_response(
    response: reqwest::blocking::Response,
) -> Result<StoredToken, TasksError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(TasksError::Auth(format!(
            "token endpoint returned HTTP {}: {}",
            status.as_u16(),
            body.trim()
        )));
    }
    let token: TokenResponse = response.json()?;
    Ok(StoredToken {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: Utc::now().timestamp() + token.expires_in,
    })
}

/// Consent flow with a loopback redirect on an ephemeral port.
fn run_installed_flow(http: &Client, secrets: &ClientSecrets) -> Result<StoredToken, TasksError> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let redirect_uri = format!("http://{}", listener.local_addr()?);
    let state = generate_state()?;
    let url = consent_url(secrets, &redirect_uri, &state)?;

    eprintln!();
    eprintln!("Open this URL in your browser to authorize access to Google Tasks:");
    eprintln!();
    eprintln!("  {}", url);
    eprintln!();
    eprintln!("Waiting for authorization on {} ...", redirect_uri);

    let code = wait_for_code(&listener, &state)?;

    let response = http
        .post(&secrets.token_uri)
        .form(&[
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("code", code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()?;
    let token = token_from_response(response)?;
    info!("OAuth consent flow completed");
    Ok(token)
}

/// The URL the user visits to grant access.
pub fn consent_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    state: &str,
) -> Result<String, TasksError> {
    let url = Url::parse_with_params(
        &secrets.auth_uri,
        [
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", TASKS_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
    .map_err(|e| TasksError::Auth(format!("invalid auth_uri: {}", e)))?;
    Ok(url.to_string())
}

/// Accept redirects until one carries a code or an error.
///
/// Browsers also ask for things like `/favicon.ico`; those are answered and
/// ignored.
fn wait_for_code(listener: &TcpListener, expected_state: &str) -> Result<String, TasksError> {
    loop {
        let (mut stream, _) = listener.accept()?;
        let mut request_line = String::new();
        BufReader::new(&stream).read_line(&mut request_line)?;

        let target = request_line.split_whitespace().nth(1).unwrap_or("/");
        let params = parse_query(target.split_once('?').map(|(_, q)| q).unwrap_or(""));

        if let Some(error) = params.get("error") {
            respond(&mut stream, &format!("Authorization failed: {}", error))?;
            return Err(TasksError::Auth(format!("consent was not granted: {}", error)));
        }

        let Some(code) = params.get("code") else {
            respond(&mut stream, "Waiting for authorization.")?;
            continue;
        };

        if params.get("state").map(String::as_str) != Some(expected_state) {
            respond(&mut stream, "Invalid state.")?;
            return Err(TasksError::Auth("OAuth state mismatch".to_string()));
        }

        respond(
            &mut stream,
            "Authorization complete. You can close this window.",
        )?;
        return Ok(code.clone());
    }
}

fn respond(stream: &mut TcpStream, message: &str) -> std::io::Result<()> {
    let body = format!("{}\n", message);
    write!(
        stream,
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

/// Decode an `application/x-www-form-urlencoded` query string.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw)
        .map(|s| s.into_owned())
        .unwrap_or(raw)
}

/// Unguessable value tying the redirect to this run: 32 random bytes, hex.
fn generate_state() -> Result<String, TasksError> {
    let mut bytes = [0_u8; 32];
    getrandom::fill(&mut bytes)
        .map_err(|e| TasksError::Auth(format!("no random source for OAuth state: {e}")))?;
    Ok(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const INSTALLED: &str = r#"{
        "installed": {
            "client_id": "123.apps.googleusercontent.com",
            "project_id": "things-migration",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_secret": "shh",
            "redirect_uris": ["http://localhost"]
        }
    }"#;

    #[test]
    fn test_client_secrets_installed_layout() {
        let secrets = ClientSecrets::from_json(INSTALLED).unwrap();
        assert_eq!(secrets.client_id, "123.apps.googleusercontent.com");
        assert_eq!(secrets.client_secret, "shh");
        assert_eq!(secrets.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_client_secrets_web_layout_uses_default_uris() {
        let secrets =
            ClientSecrets::from_json(r#"{"web": {"client_id": "a", "client_secret": "b"}}"#)
                .unwrap();
        assert_eq!(secrets.auth_uri, DEFAULT_AUTH_URI);
        assert_eq!(secrets.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_client_secrets_rejects_unknown_layout() {
        let err = ClientSecrets::from_json(r#"{"service_account": {}}"#).unwrap_err();
        assert!(matches!(err, TasksError::Auth(_)));
    }

    #[test]
    fn test_stored_token_roundtrip_and_freshness() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("token.json");
        assert!(StoredToken::load(&path).unwrap().is_none());

        let token = StoredToken {
            access_token: "ya29".to_string(),
            refresh_token: Some("1//r".to_string()),
            expires_at: 1_000,
        };
        token.save(&path).unwrap();
        assert_eq!(StoredToken::load(&path).unwrap(), Some(token.clone()));

        assert!(token.is_fresh(900));
        assert!(!token.is_fresh(940));
        assert!(!token.is_fresh(2_000));
    }

    #[test]
    fn test_consent_url_carries_scope_and_state() {
        let secrets = ClientSecrets::from_json(INSTALLED).unwrap();
        let url = consent_url(&secrets, "http://127.0.0.1:8080", "brave-otter").unwrap();
        let parsed = Url::parse(&url).unwrap();
        let params: HashMap<String, String> = parsed.query_pairs().into_owned().collect();
        assert_eq!(params["scope"], TASKS_SCOPE);
        assert_eq!(params["state"], "brave-otter");
        assert_eq!(params["redirect_uri"], "http://127.0.0.1:8080");
        assert_eq!(params["access_type"], "offline");
    }

    #[test]
    fn test_parse_query_decodes_components() {
        let params = parse_query("code=4%2F0Ad&state=a-b&scope=x+y&flag");
        assert_eq!(params["code"], "4/0Ad");
        assert_eq!(params["state"], "a-b");
        assert_eq!(params["scope"], "x y");
        assert_eq!(params["flag"], "");
    }

    #[test]
    fn test_generate_state_is_long_and_random() {
        let first = generate_state().unwrap();
        let second = generate_state().unwrap();
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }
}
