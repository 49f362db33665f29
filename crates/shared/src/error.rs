//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// This is the taxonomy the embedding API layer maps onto transport
/// responses. Crate-local errors (ledger, directory, channel) convert into
/// it at the boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict (immutable field change, non-latest movement mutation).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A uniqueness constraint was violated.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The operation would drive an account balance below zero.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// The target account is deactivated.
    #[error("Inactive account: {0}")]
    InactiveAccount(String),

    /// A dependent remote service failed or timed out.
    #[error("Remote service error: {0}")]
    RemoteError(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) | Self::DuplicateKey(_) => 409,
            Self::InsufficientFunds(_) | Self::InactiveAccount(_) => 422,
            Self::RemoteError(_) => 502,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::DuplicateKey(_) => "DUPLICATE_KEY",
            Self::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            Self::InactiveAccount(_) => "INACTIVE_ACCOUNT",
            Self::RemoteError(_) => "REMOTE_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
