//! Configuration.
//!
//! Settings are merged field by field from these tiers, lowest first:
//! 1. **Defaults** - built in
//! 2. **Project** - `./things-to-google-tasks.yaml`
//! 3. **User** - `~/.things-to-google-tasks/config.yaml`
//! 4. **Environment** - see below
//! 5. **Command line** - `--db-path`, `--creds-path`, `--token-path`
//!
//! `--config FILE` replaces the project and user tiers.
//!
//! ## Environment Variables
//! - `THINGS_DB_PATH` - Things database
//! - `GOOGLE_API_CREDENTIALS_PATH` - OAuth client secrets JSON
//! - `GOOGLE_API_TOKEN_PATH` - token cache

mod loader;
mod merge;
mod types;

pub use loader::{
    ConfigLoader, ConfigPaths, ConfigTier, ENV_CREDENTIALS_PATH, ENV_DB_PATH, ENV_TOKEN_PATH,
    Overrides, PROJECT_CONFIG_FILE, USER_CONFIG_DIR,
};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
