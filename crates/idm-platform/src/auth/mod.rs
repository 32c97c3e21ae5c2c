//! Credential subsystem

pub mod password_service;

pub use password_service::{Argon2Config, CredentialError, CredentialHasher, PasswordPolicy, PasswordService};
