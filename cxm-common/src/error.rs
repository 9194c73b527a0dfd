//! Common error types for CaixaMaster

use thiserror::Error;

/// Common result type for CaixaMaster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across CaixaMaster crates
///
/// Every failure is scoped to the operation that raised it; nothing in this
/// taxonomy is fatal to the process.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Attempted operation outside its defined domain; session state is
    /// left unchanged by the rejected operation
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Credential mismatch or role denied; retryable, in-progress work
    /// is preserved
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
