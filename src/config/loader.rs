//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Config;
use crate::error::ConfigError;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project-level config file, relative to the working directory.
pub const PROJECT_CONFIG_FILE: &str = "things-to-google-tasks.yaml";
/// User-level config directory under the home directory.
pub const USER_CONFIG_DIR: &str = ".things-to-google-tasks";

pub const ENV_DB_PATH: &str = "THINGS_DB_PATH";
pub const ENV_CREDENTIALS_PATH: &str = "GOOGLE_API_CREDENTIALS_PATH";
pub const ENV_TOKEN_PATH: &str = "GOOGLE_API_TOKEN_PATH";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    Project = 1,
    User = 2,
    Environment = 3,
    CommandLine = 4,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
            ConfigTier::CommandLine => write!(f, "command line"),
        }
    }
}

/// Config files to consult.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub project_file: Option<PathBuf>,
    pub user_file: Option<PathBuf>,
    /// `--config FILE`: replaces both file tiers and must exist.
    pub explicit_file: Option<PathBuf>,
}

impl ConfigPaths {
    /// `./things-to-google-tasks.yaml` and `~/.things-to-google-tasks/config.yaml`.
    pub fn discover() -> Self {
        Self {
            project_file: Some(PathBuf::from(PROJECT_CONFIG_FILE)),
            user_file: dirs::home_dir().map(|h| h.join(USER_CONFIG_DIR).join("config.yaml")),
            explicit_file: None,
        }
    }

    /// Create paths with explicit files.
    pub fn with_files(project_file: Option<PathBuf>, user_file: Option<PathBuf>) -> Self {
        Self {
            project_file,
            user_file,
            explicit_file: None,
        }
    }

    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            explicit_file: Some(path.into()),
            ..Default::default()
        }
    }
}

/// Values given on the command line, the highest tier.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub db_path: Option<PathBuf>,
    pub credentials_path: Option<PathBuf>,
    pub token_path: Option<PathBuf>,
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: Config,
    /// Files that contributed, with their tier.
    sources: Vec<(ConfigTier, PathBuf)>,
}

impl ConfigLoader {
    /// Load with explicit paths, reading the real environment.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self, ConfigError> {
        Self::load_with(paths, |key| std::env::var(key).ok())
    }

    /// Load with explicit paths and an environment lookup.
    pub fn load_with(
        paths: ConfigPaths,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut tiers: Vec<Value> = vec![to_value(&Config::default())?];
        let mut sources = Vec::new();

        if let Some(explicit) = &paths.explicit_file {
            if !explicit.is_file() {
                return Err(ConfigError::PathNotFound {
                    what: "config file",
                    path: explicit.clone(),
                });
            }
            tiers.push(read_tier(explicit)?);
            sources.push((ConfigTier::Project, explicit.clone()));
        } else {
            for (tier, file) in [
                (ConfigTier::Project, &paths.project_file),
                (ConfigTier::User, &paths.user_file),
            ] {
                if let Some(file) = file
                    && file.is_file()
                {
                    tiers.push(read_tier(file)?);
                    sources.push((tier, file.clone()));
                }
            }
        }

        let merged = deep_merge_all(tiers);
        let mut config: Config =
            serde_json::from_value(merged).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Self::apply_env_overrides(&mut config, env);

        for (tier, path) in &sources {
            debug!(tier = %tier, path = %path.display(), "Loaded config file");
        }
        Ok(Self { config, sources })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
        if let Some(db_path) = env(ENV_DB_PATH).filter(|v| !v.is_empty()) {
            config.things.db_path = Some(PathBuf::from(db_path));
        }

        if let Some(creds) = env(ENV_CREDENTIALS_PATH).filter(|v| !v.is_empty()) {
            config.google.credentials_path = Some(PathBuf::from(creds));
        }

        if let Some(token) = env(ENV_TOKEN_PATH).filter(|v| !v.is_empty()) {
            config.google.token_path = PathBuf::from(token);
        }
    }

    /// Apply the command-line tier.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(db_path) = &overrides.db_path {
            self.config.things.db_path = Some(db_path.clone());
        }
        if let Some(creds) = &overrides.credentials_path {
            self.config.google.credentials_path = Some(creds.clone());
        }
        if let Some(token) = &overrides.token_path {
            self.config.google.token_path = token.clone();
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were read, lowest tier first.
    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.sources.iter().map(|(_, path)| path.as_path())
    }
}

fn to_value(config: &Config) -> Result<Value, ConfigError> {
    serde_json::to_value(config).map_err(|e| ConfigError::Parse(e.to_string()))
}

fn read_tier(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str::<Value>(&content)
        .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
}
