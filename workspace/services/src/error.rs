use common::PeriodError;
use thiserror::Error;

/// Error types for the domain services
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Error from reading or writing uploaded files
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Expected input problems, one human-readable message each
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The row is missing, deleted, or not visible to the caller
    #[error("{0}")]
    NotFound(String),

    /// The caller may see the row but not act on it
    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    InvalidPeriod(#[from] PeriodError),

    /// Failure inside the identity provider itself
    #[error("Identity error: {0}")]
    Identity(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![message.into()])
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }
}

/// Type alias for Result with ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;
