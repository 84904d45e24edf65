//! Server configuration
//!
//! Layered, lowest precedence first: built-in defaults, the optional
//! `prospectflow.toml` (or the file given by `--config`), `PROSPECTFLOW_*`
//! environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use prospectflow_core::logging_facility::Profile;
use serde::Deserialize;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_DATABASE: &str = "prospectflow.db";
const DEFAULT_CONFIG_NAME: &str = "prospectflow";
const ENV_PREFIX: &str = "PROSPECTFLOW";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
    /// SQLite file; `None` selects the in-memory store
    pub database_path: Option<PathBuf>,
    pub log_profile: Profile,
    /// Explicit tracing filter directive, below `RUST_LOG` in precedence
    #[serde(default)]
    pub log_filter: Option<String>,
}

/// Command-line values that win over every other layer
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<String>,
    pub database_path: Option<PathBuf>,
    pub in_memory: bool,
    pub log_profile: Option<Profile>,
}

impl ServerConfig {
    /// Load defaults, the config file and the environment
    ///
    /// An explicit `config_file` must exist; the default one is optional.
    ///
    /// # Errors
    ///
    /// Returns the `config` crate's error for unreadable files or values
    /// that do not deserialize.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) => File::from(path.to_path_buf()).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        Config::builder()
            .set_default("bind", DEFAULT_BIND)?
            .set_default("database_path", DEFAULT_DATABASE)?
            .set_default("log_profile", "development")?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(bind) = overrides.bind {
            self.bind = bind;
        }
        if let Some(path) = overrides.database_path {
            self.database_path = Some(path);
        }
        if overrides.in_memory {
            self.database_path = None;
        }
        if let Some(profile) = overrides.log_profile {
            self.log_profile = profile;
        }
        self
    }
}
