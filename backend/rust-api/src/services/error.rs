use thiserror::Error;

use crate::models::FieldErrors;
use crate::storage::StoreError;

/// Outcome of a service call that did not produce its entity.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    /// The submitted form was rejected; the caller re-renders it with these
    /// messages.
    #[error("There are errors in the form:")]
    Validation(FieldErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
