//! Use Case Errors
//!
//! The outcome taxonomy every identity operation reports through.
//!
//! ```ignore
//! use idm_platform::usecase::{UseCaseError, details};
//!
//! UseCaseError::conflict_with_details(
//!     "EMAIL_EXISTS",
//!     "duplicate email",
//!     details!{ "email" => email },
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Message carried by every `InternalError`. The underlying cause is logged, never returned.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Macro for creating error detail maps.
#[macro_export]
macro_rules! details {
    () => {
        std::collections::HashMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), serde_json::json!($value));
        )+
        map
    }};
}

/// Categorized use case failures.
///
/// - `ValidationError` -> 400
/// - `ForbiddenError` -> 403
/// - `NotFoundError` -> 404
/// - `ConflictError` -> 409
/// - `InternalError` -> 500
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UseCaseError {
    /// Missing or malformed input, or a password policy violation.
    ValidationError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// The named role, user or referenced record does not exist.
    NotFoundError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// A uniqueness rule would be broken. The code tells which one.
    ConflictError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// The caller is not allowed to run the operation.
    ForbiddenError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// The identity store failed.
    InternalError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },
}

impl UseCaseError {
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn validation_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFoundError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn not_found_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::NotFoundError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConflictError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn conflict_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::ConflictError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn forbidden(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ForbiddenError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Create an internal error. Always carries the generic message.
    pub fn internal() -> Self {
        Self::InternalError {
            code: "INTERNAL_ERROR".to_string(),
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            details: HashMap::new(),
        }
    }

    /// Get the error code.
    pub fn code(&self) -> &str {
        match self {
            Self::ValidationError { code, .. } => code,
            Self::NotFoundError { code, .. } => code,
            Self::ConflictError { code, .. } => code,
            Self::ForbiddenError { code, .. } => code,
            Self::InternalError { code, .. } => code,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            Self::ValidationError { message, .. } => message,
            Self::NotFoundError { message, .. } => message,
            Self::ConflictError { message, .. } => message,
            Self::ForbiddenError { message, .. } => message,
            Self::InternalError { message, .. } => message,
        }
    }

    /// Get the structured details.
    pub fn details(&self) -> &HashMap<String, serde_json::Value> {
        match self {
            Self::ValidationError { details, .. } => details,
            Self::NotFoundError { details, .. } => details,
            Self::ConflictError { details, .. } => details,
            Self::ForbiddenError { details, .. } => details,
            Self::InternalError { details, .. } => details,
        }
    }

    /// Get the suggested HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ValidationError { .. } => 400,
            Self::ForbiddenError { .. } => 403,
            Self::NotFoundError { .. } => 404,
            Self::ConflictError { .. } => 409,
            Self::InternalError { .. } => 500,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFoundError { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConflictError { .. })
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::ForbiddenError { .. })
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InternalError { .. })
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for UseCaseError {}
