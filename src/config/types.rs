//! Configuration types and structures.

use crate::error::ConfigError;
use crate::migrate::MigrationOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Token cache location when none is configured.
pub const DEFAULT_TOKEN_PATH: &str = "token.json";

/// Top-level configuration as read from YAML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub things: ThingsConfig,
    pub google: GoogleConfig,
    pub migration: MigrationOptions,
}

/// Source database settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThingsConfig {
    /// Path to the Things `main.sqlite` file.
    pub db_path: Option<PathBuf>,
}

/// Google API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// OAuth client secrets JSON downloaded from the Google Cloud console.
    pub credentials_path: Option<PathBuf>,
    /// Where the access and refresh tokens are cached between runs.
    pub token_path: PathBuf,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            credentials_path: None,
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
        }
    }
}

/// Fully resolved settings handed to the commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub db_path: PathBuf,
    /// `None` only when the command does not talk to Google.
    pub credentials_path: Option<PathBuf>,
    pub token_path: PathBuf,
    pub migration: MigrationOptions,
}

/// What a command needs from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    pub source: bool,
    pub google: bool,
}

impl Requirements {
    pub const SOURCE_ONLY: Self = Self {
        source: true,
        google: false,
    };
    pub const GOOGLE_ONLY: Self = Self {
        source: false,
        google: true,
    };
    pub const BOTH: Self = Self {
        source: true,
        google: true,
    };
}

impl Config {
    /// Resolve into [`Settings`], checking only what `needs` asks for.
    ///
    /// Paths that are not needed are passed through unchecked; an absent
    /// database path then resolves to an empty path.
    pub fn validate_for(&self, needs: Requirements) -> Result<Settings, ConfigError> {
        let db_path = match &self.things.db_path {
            Some(path) if needs.source => {
                if !path.exists() {
                    return Err(ConfigError::PathNotFound {
                        what: "Things database",
                        path: path.clone(),
                    });
                }
                path.clone()
            }
            Some(path) => path.clone(),
            None if needs.source => return Err(ConfigError::MissingDbPath),
            None => PathBuf::new(),
        };

        let credentials_path = match &self.google.credentials_path {
            Some(path) if needs.google && !path.exists() => {
                return Err(ConfigError::PathNotFound {
                    what: "Google API credentials file",
                    path: path.clone(),
                });
            }
            Some(path) => Some(path.clone()),
            None if needs.google => return Err(ConfigError::MissingCredentialsPath),
            None => None,
        };

        if !self.migration.heading_format.contains("{}") {
            return Err(ConfigError::InvalidHeadingFormat(
                self.migration.heading_format.clone(),
            ));
        }

        Ok(Settings {
            db_path,
            credentials_path,
            token_path: self.google.token_path.clone(),
            migration: self.migration.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn existing_paths(temp: &TempDir) -> (PathBuf, PathBuf) {
        let db = temp.path().join("main.sqlite");
        let creds = temp.path().join("credentials.json");
        std::fs::write(&db, b"").unwrap();
        std::fs::write(&creds, b"{}").unwrap();
        (db, creds)
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.things.db_path.is_none());
        assert_eq!(config.google.token_path, PathBuf::from("token.json"));
        assert_eq!(config.migration.default_list_title, "Things Imported Tasks");
    }

    #[test]
    fn test_yaml_partial_keeps_defaults() {
        let config: Config = serde_yaml::from_str(
            r###"
things:
  db_path: /tmp/main.sqlite
migration:
  heading_format: "## {}"
"###,
        )
        .unwrap();
        assert_eq!(config.things.db_path, Some(PathBuf::from("/tmp/main.sqlite")));
        assert_eq!(config.migration.heading_format, "## {}");
        assert_eq!(config.migration.default_list_title, "Things Imported Tasks");
    }

    #[test]
    fn test_yaml_rejects_bad_types() {
        assert!(serde_yaml::from_str::<Config>("things: 42").is_err());
    }

    #[test]
    fn test_validate_requires_db_path() {
        let config = Config::default();
        assert!(matches!(config.validate_for(Requirements::BOTH), Err(ConfigError::MissingDbPath)));
    }

    #[test]
    fn test_validate_requires_credentials() {
        let temp = TempDir::new().unwrap();
        let (db, _) = existing_paths(&temp);
        let mut config = Config::default();
        config.things.db_path = Some(db);
        assert!(matches!(
            config.validate_for(Requirements::BOTH),
            Err(ConfigError::MissingCredentialsPath)
        ));
    }

    #[test]
    fn test_validate_checks_existence() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.things.db_path = Some(temp.path().join("missing.sqlite"));
        match config.validate_for(Requirements::BOTH) {
            Err(ConfigError::PathNotFound { what, .. }) => assert_eq!(what, "Things database"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_validate_heading_format() {
        let temp = TempDir::new().unwrap();
        let (db, creds) = existing_paths(&temp);
        let mut config = Config::default();
        config.things.db_path = Some(db);
        config.google.credentials_path = Some(creds);
        config.migration.heading_format = "Heading".to_string();
        assert!(matches!(
            config.validate_for(Requirements::BOTH),
            Err(ConfigError::InvalidHeadingFormat(_))
        ));
    }

    #[test]
    fn test_validate_resolves_settings() {
        let temp = TempDir::new().unwrap();
        let (db, creds) = existing_paths(&temp);
        let mut config = Config::default();
        config.things.db_path = Some(db.clone());
        config.google.credentials_path = Some(creds.clone());

        let settings = config.validate_for(Requirements::BOTH).unwrap();
        assert_eq!(settings.db_path, db);
        assert_eq!(settings.credentials_path, Some(creds));
        assert_eq!(settings.token_path, PathBuf::from("token.json"));
    }

    #[test]
    fn test_validate_for_source_only_skips_google() {
        let temp = TempDir::new().unwrap();
        let (db, _) = existing_paths(&temp);
        let mut config = Config::default();
        config.things.db_path = Some(db);

        let settings = config.validate_for(Requirements::SOURCE_ONLY).unwrap();
        assert!(settings.credentials_path.is_none());
    }

    #[test]
    fn test_validate_for_google_only_skips_source() {
        let temp = TempDir::new().unwrap();
        let (_, creds) = existing_paths(&temp);
        let mut config = Config::default();
        config.google.credentials_path = Some(creds);

        let settings = config.validate_for(Requirements::GOOGLE_ONLY).unwrap();
        assert_eq!(settings.db_path, PathBuf::new());
    }
}
