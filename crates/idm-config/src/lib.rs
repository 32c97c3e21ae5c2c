//! IDM Configuration System
//!
//! TOML-based configuration with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mongodb: MongoConfig,
    pub password: PasswordConfig,
    pub bootstrap: BootstrapConfig,

    /// Enable development mode
    pub dev_mode: bool,
}

/// MongoDB configuration
///
/// Multi-document transactions need a replica set, so the default URI
/// points at a single-node replica set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017/?replicaSet=rs0&directConnection=true".to_string(),
            database: "idm".to_string(),
        }
    }
}

/// Password policy and Argon2id cost parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub max_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,

    /// Argon2 memory cost in KiB
    pub memory_cost: u32,
    /// Argon2 iterations
    pub time_cost: u32,
    /// Argon2 lanes
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 6,
            max_length: 128,
            require_digit: false,
            require_lowercase: false,
            require_uppercase: false,
            require_non_alphanumeric: false,
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// First-run seeding of the admin role and an initial administrator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub seed_admin_role: bool,
    pub admin_username: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl BootstrapConfig {
    /// Username, email and password of the first administrator, when all three are set.
    pub fn admin_account(&self) -> Option<(&str, &str, &str)> {
        match (&self.admin_username, &self.admin_email, &self.admin_password) {
            (Some(u), Some(e), Some(p)) => Some((u.as_str(), e.as_str(), p.as_str())),
            _ => None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Reject settings the platform cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mongodb.uri.trim().is_empty() {
            return Err(ConfigError::ValidationError("mongodb.uri must not be empty".to_string()));
        }
        if self.mongodb.database.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "mongodb.database must not be empty".to_string(),
            ));
        }
        if self.password.min_length == 0 {
            return Err(ConfigError::ValidationError(
                "password.min_length must be at least 1".to_string(),
            ));
        }
        if self.password.min_length > self.password.max_length {
            return Err(ConfigError::ValidationError(format!(
                "password.min_length ({}) exceeds password.max_length ({})",
                self.password.min_length, self.password.max_length
            )));
        }
        if self.password.time_cost == 0 || self.password.parallelism == 0 {
            return Err(ConfigError::ValidationError(
                "password.time_cost and password.parallelism must be positive".to_string(),
            ));
        }

        let bootstrap = &self.bootstrap;
        let partial_admin = [
            bootstrap.admin_username.is_some(),
            bootstrap.admin_email.is_some(),
            bootstrap.admin_password.is_some(),
        ];
        if partial_admin.iter().any(|set| *set) && !partial_admin.iter().all(|set| *set) {
            return Err(ConfigError::ValidationError(
                "bootstrap admin_username, admin_email and admin_password must be set together"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# IDM Configuration
# Environment variables (IDM_*) override these settings

[mongodb]
uri = "mongodb://localhost:27017/?replicaSet=rs0&directConnection=true"
database = "idm"

[password]
min_length = 6
max_length = 128
require_digit = false
require_lowercase = false
require_uppercase = false
require_non_alphanumeric = false
memory_cost = 65536
time_cost = 3
parallelism = 4

[bootstrap]
seed_admin_role = true
# admin_username = "admin"
# admin_email = "admin@example.com"
# admin_password = "change-me"

dev_mode = false
"#
        .to_string()
    }
}
