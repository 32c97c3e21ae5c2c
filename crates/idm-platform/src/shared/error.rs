//! Identity store errors

use thiserror::Error;
use tracing::error;

use crate::usecase::UseCaseError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("Duplicate key on index {index}")]
    DuplicateKey { index: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Store failures surface as the generic internal error; the cause is logged here.
impl From<StoreError> for UseCaseError {
    fn from(err: StoreError) -> Self {
        error!(error = %err, "Identity store operation failed");
        UseCaseError::internal()
    }
}
