//! Credential hashing
//!
//! Argon2id hashing behind the `CredentialHasher` capability, with a
//! configurable password policy checked before anything is hashed.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;
use tracing::debug;

use crate::usecase::UseCaseError;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Password policy violated: {}", .0.join("; "))]
    Policy(Vec<String>),

    #[error("Invalid Argon2 parameters: {0}")]
    InvalidParams(String),

    #[error("Credential hashing failed: {0}")]
    Hashing(String),
}

impl From<CredentialError> for UseCaseError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Policy(violations) => UseCaseError::validation_with_details(
                "PASSWORD_POLICY",
                violations.join("; "),
                crate::details! { "violations" => violations },
            ),
            other => {
                tracing::error!(error = %other, "Credential hashing failed");
                UseCaseError::internal()
            }
        }
    }
}

/// Turns a plaintext credential into its stored form.
pub trait CredentialHasher: Send + Sync {
    fn hash_credential(&self, plaintext: &str) -> Result<String, CredentialError>;
}

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_non_alphanumeric: bool,
}

/// Any non-empty password up to 128 characters. Deployments tighten this
/// through `PasswordConfig`.
impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 1,
            max_length: 128,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_non_alphanumeric: false,
        }
    }
}

impl PasswordPolicy {
    /// Every rule the password breaks, or `Ok` when it satisfies the policy.
    pub fn validate(&self, password: &str) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let length = password.chars().count();

        if length < self.min_length {
            errors.push(format!("Password must be at least {} characters", self.min_length));
        }
        if length > self.max_length {
            errors.push(format!("Password must be at most {} characters", self.max_length));
        }
        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            errors.push("Password must contain at least one uppercase letter".to_string());
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            errors.push("Password must contain at least one lowercase letter".to_string());
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Password must contain at least one digit".to_string());
        }
        if self.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
            errors.push("Password must contain at least one non-alphanumeric character".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Argon2Config {
    /// KiB
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
    pub output_len: usize,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
            output_len: 32,
        }
    }
}

impl Argon2Config {
    /// Cheap parameters for tests.
    pub fn testing() -> Self {
        Self {
            memory_cost: 4096,
            time_cost: 1,
            parallelism: 1,
            output_len: 32,
        }
    }

    fn to_params(&self) -> Result<Params, CredentialError> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(self.output_len),
        )
        .map_err(|e| CredentialError::InvalidParams(e.to_string()))
    }
}

pub struct PasswordService {
    argon2: Argon2<'static>,
    policy: PasswordPolicy,
}

impl PasswordService {
    pub fn new(config: Argon2Config, policy: PasswordPolicy) -> Result<Self, CredentialError> {
        let params = config.to_params()?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            policy,
        })
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Validate against the policy, then hash to a PHC string with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        self.policy.validate(password).map_err(CredentialError::Policy)?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;

        debug!("Password hashed");
        Ok(hash.to_string())
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(hash).map_err(|e| CredentialError::Hashing(e.to_string()))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::Hashing(e.to_string())),
        }
    }
}

impl CredentialHasher for PasswordService {
    fn hash_credential(&self, plaintext: &str) -> Result<String, CredentialError> {
        self.hash_password(plaintext)
    }
}
