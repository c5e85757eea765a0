//! Configuration types and parsing for clickforge.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the connection password
pub const PASSWORD_ENV: &str = "CF_PASSWORD";

/// Environment variable that selects a target when `--target` is absent
pub const TARGET_ENV: &str = "CF_TARGET";

/// Main project configuration from clickforge.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Directory holding `<Version>.up.sql` / `<Version>.down.sql` pairs
    #[serde(default = "default_migration_path")]
    pub migration_path: String,

    /// Store connection
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Variables available to `var()` in SQL migrations
    #[serde(default)]
    pub vars: HashMap<String, serde_yaml::Value>,

    /// Named target configurations (e.g., dev, staging, prod)
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Connection override
    #[serde(default)]
    pub connection: Option<ConnectionConfig>,

    /// Variable overrides (merged with base vars)
    #[serde(default)]
    pub vars: HashMap<String, serde_yaml::Value>,
}

/// Connection to the ClickHouse HTTP interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Base URL of the HTTP interface
    #[serde(default = "default_url")]
    pub url: String,

    /// Database selected for every statement
    #[serde(default = "default_database")]
    pub database: String,

    /// User name
    #[serde(default = "default_user")]
    pub user: String,

    /// Password (overridden by `CF_PASSWORD` when set)
    #[serde(default)]
    pub password: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            database: default_database(),
            user: default_user(),
            password: String::new(),
        }
    }
}

fn default_migration_path() -> String {
    "migrations".to_string()
}

fn default_url() -> String {
    "http://localhost:8123".to_string()
}

fn default_database() -> String {
    "default".to_string()
}

fn default_user() -> String {
    "default".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    ///
    /// Looks for `clickforge.yml`, then `clickforge.yaml`.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("clickforge.yml");
        let yaml_path = dir.join("clickforge.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "project name must not be empty".to_string(),
            });
        }
        if self.migration_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migration_path must not be empty".to_string(),
            });
        }
        let connections = std::iter::once(&self.connection)
            .chain(self.targets.values().filter_map(|t| t.connection.as_ref()));
        for conn in connections {
            if !conn.url.starts_with("http://") && !conn.url.starts_with("https://") {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "connection url '{}' must start with http:// or https://",
                        conn.url
                    ),
                });
            }
        }
        Ok(())
    }

    /// Absolute path of the migration directory
    pub fn migration_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migration_path)
    }

    /// Get all available target names, sorted
    pub fn available_targets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get connection configuration, optionally applying target overrides
    ///
    /// A `CF_PASSWORD` environment variable replaces the configured password.
    pub fn get_connection_config(&self, target: Option<&str>) -> CoreResult<ConnectionConfig> {
        let mut connection = match target {
            Some(name) => {
                let target_config =
                    self.targets
                        .get(name)
                        .ok_or_else(|| CoreError::ConfigInvalid {
                            message: format!(
                                "Target '{}' not found. Available targets: {}",
                                name,
                                self.available_targets().join(", ")
                            ),
                        })?;
                target_config
                    .connection
                    .clone()
                    .unwrap_or_else(|| self.connection.clone())
            }
            None => self.connection.clone(),
        };

        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            log::debug!("Using connection password from {PASSWORD_ENV}");
            connection.password = password;
        }
        Ok(connection)
    }

    /// Get merged variables, with target overrides taking precedence.
    pub fn get_merged_vars(
        &self,
        target: Option<&str>,
    ) -> Cow<'_, HashMap<String, serde_yaml::Value>> {
        let target_config = target.and_then(|name| self.targets.get(name));
        match target_config.filter(|tc| !tc.vars.is_empty()) {
            Some(tc) => {
                let mut vars = self.vars.clone();
                for (key, value) in &tc.vars {
                    vars.insert(key.clone(), value.clone());
                }
                Cow::Owned(vars)
            }
            None => Cow::Borrowed(&self.vars),
        }
    }

    /// Resolve target from CLI flag or CF_TARGET environment variable
    ///
    /// Priority: CLI flag > CF_TARGET env var > None
    pub fn resolve_target(cli_target: Option<&str>) -> Option<String> {
        cli_target
            .map(String::from)
            .or_else(|| std::env::var(TARGET_ENV).ok())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
