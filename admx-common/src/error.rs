//! Common error types for ADMX

use thiserror::Error;

/// Common result type for ADMX operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across ADMX modules
///
/// Reconciliation-internal anomalies (an insight row referencing an entity
/// absent from the catalog, a non-finite metric value) are never errors:
/// they are recovered locally by the engine (status resolves to UNKNOWN,
/// metrics coerce to 0). Only boundary operations fail.
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

    /// Transport or decoding failure against the advertising platform API
    #[error("Platform error: {0}")]
    Platform(String),

    /// The platform refused a status change (e.g. account payment block).
    /// Surfaced with the platform's raw reason; never retried automatically.
    #[error("Status update rejected: {reason}")]
    StatusUpdateRejected { reason: String },

    /// The platform rate-limited a status change. Surfaced distinctly so
    /// the caller can advise waiting; never retried automatically.
    #[error("Status update rate limited")]
    StatusUpdateRateLimited,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
