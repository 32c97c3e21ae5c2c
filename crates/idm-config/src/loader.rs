//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "idm.toml",
    "./config/idm.toml",
    "/etc/idm/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found), apply `IDM_*` overrides, validate.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(ConfigError::ReadError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file {} does not exist", path.display()),
                )));
            }
        }

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, |key| env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            return Some(path.clone());
        }

        if let Ok(path) = env::var("IDM_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply overrides read through `lookup`; unparsable numeric or boolean values are ignored.
pub(crate) fn apply_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    // MongoDB
    if let Some(val) = lookup("IDM_MONGODB_URI") {
        config.mongodb.uri = val;
    }
    if let Some(val) = lookup("IDM_MONGODB_DATABASE") {
        config.mongodb.database = val;
    }

    // Password policy
    if let Some(min) = lookup("IDM_PASSWORD_MIN_LENGTH").and_then(|v| v.parse().ok()) {
        config.password.min_length = min;
    }
    if let Some(flag) = lookup("IDM_PASSWORD_REQUIRE_DIGIT").and_then(|v| v.parse().ok()) {
        config.password.require_digit = flag;
    }
    if let Some(flag) = lookup("IDM_PASSWORD_REQUIRE_NON_ALPHANUMERIC").and_then(|v| v.parse().ok()) {
        config.password.require_non_alphanumeric = flag;
    }
    if let Some(cost) = lookup("IDM_ARGON2_MEMORY_COST").and_then(|v| v.parse().ok()) {
        config.password.memory_cost = cost;
    }
    if let Some(cost) = lookup("IDM_ARGON2_TIME_COST").and_then(|v| v.parse().ok()) {
        config.password.time_cost = cost;
    }

    // Bootstrap
    if let Some(flag) = lookup("IDM_SEED_ADMIN_ROLE").and_then(|v| v.parse().ok()) {
        config.bootstrap.seed_admin_role = flag;
    }
    if let Some(val) = lookup("IDM_ADMIN_USERNAME") {
        config.bootstrap.admin_username = Some(val);
    }
    if let Some(val) = lookup("IDM_ADMIN_EMAIL") {
        config.bootstrap.admin_email = Some(val);
    }
    if let Some(val) = lookup("IDM_ADMIN_PASSWORD") {
        config.bootstrap.admin_password = Some(val);
    }

    // General
    if let Some(flag) = lookup("IDM_DEV_MODE").and_then(|v| v.parse().ok()) {
        config.dev_mode = flag;
    }
}
