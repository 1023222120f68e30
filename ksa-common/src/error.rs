//! Common error types for KSA

use thiserror::Error;

/// Common result type for KSA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the KSA crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
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

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether repeating the same action later may succeed.
    ///
    /// Lock contention and pool exhaustion are transient; constraint
    /// violations, bad input and missing rows are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Database(db_err) => match db_err {
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => true,
                other => other.to_string().contains("database is locked"),
            },
            Error::Io(_) => true,
            _ => false,
        }
    }
}
