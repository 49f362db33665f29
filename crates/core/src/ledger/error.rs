//! Ledger error types for validation and state errors.
//!
//! This module defines all errors that can occur during ledger operations,
//! including account rule violations, movement mutation errors, balance
//! errors, and concurrency errors.

use ledgra_shared::error::AppError;
use ledgra_shared::types::MovementId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Account is inactive and cannot accept movements.
    #[error("Account {0} is inactive")]
    InactiveAccount(String),

    /// Account number is already taken by another account.
    #[error("Account number '{0}' already exists")]
    DuplicateAccountNumber(String),

    /// Account number is empty or longer than 20 characters.
    #[error("Invalid account number '{0}': must be 1 to 20 characters")]
    InvalidAccountNumber(String),

    /// Opening balance cannot be negative.
    #[error("Opening balance cannot be negative: {0}")]
    NegativeOpeningBalance(Decimal),

    /// Field is immutable once the account exists.
    #[error("Field '{0}' cannot be changed after creation")]
    ImmutableField(&'static str),

    /// Opening balance cannot change once movements exist.
    #[error("Opening balance is locked: account has {0} movements")]
    OpeningBalanceLocked(u64),

    // ========== Movement Errors ==========
    /// Movement not found.
    #[error("Movement not found: {0}")]
    MovementNotFound(MovementId),

    /// Withdrawal would leave the account below zero.
    #[error("Insufficient funds: balance {balance}, attempted withdrawal {attempted}")]
    InsufficientFunds {
        /// Balance the movement was applied against.
        balance: Decimal,
        /// Absolute amount the caller tried to withdraw.
        attempted: Decimal,
    },

    /// Only the most recent movement of an account may be amended or removed.
    #[error("Movement {0} is not the latest movement of its account")]
    NotLatestMovement(MovementId),

    // ========== Concurrency Errors ==========
    /// Another writer touched the account first.
    #[error("Concurrent update detected, please retry")]
    ConcurrentUpdate,
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InactiveAccount(_) => "INACTIVE_ACCOUNT",
            Self::DuplicateAccountNumber(_) => "DUPLICATE_ACCOUNT_NUMBER",
            Self::InvalidAccountNumber(_) => "INVALID_ACCOUNT_NUMBER",
            Self::NegativeOpeningBalance(_) => "NEGATIVE_OPENING_BALANCE",
            Self::ImmutableField(_) => "IMMUTABLE_FIELD",
            Self::OpeningBalanceLocked(_) => "OPENING_BALANCE_LOCKED",
            Self::MovementNotFound(_) => "MOVEMENT_NOT_FOUND",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::NotLatestMovement(_) => "NOT_LATEST_MOVEMENT",
            Self::ConcurrentUpdate => "CONCURRENT_UPDATE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - field validation errors
            Self::InvalidAccountNumber(_) | Self::NegativeOpeningBalance(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::MovementNotFound(_) => 404,

            // 409 Conflict - uniqueness, immutability, and concurrency errors
            Self::DuplicateAccountNumber(_)
            | Self::ImmutableField(_)
            | Self::OpeningBalanceLocked(_)
            | Self::NotLatestMovement(_)
            | Self::ConcurrentUpdate => 409,

            // 422 Unprocessable Entity - state rules
            Self::InactiveAccount(_) | Self::InsufficientFunds { .. } => 422,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentUpdate)
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::AccountNotFound(_) | LedgerError::MovementNotFound(_) => {
                Self::NotFound(message)
            }
            LedgerError::InactiveAccount(_) => Self::InactiveAccount(message),
            LedgerError::DuplicateAccountNumber(_) => Self::DuplicateKey(message),
            LedgerError::InvalidAccountNumber(_) | LedgerError::NegativeOpeningBalance(_) => {
                Self::Validation(message)
            }
            LedgerError::ImmutableField(_)
            | LedgerError::OpeningBalanceLocked(_)
            | LedgerError::NotLatestMovement(_)
            | LedgerError::ConcurrentUpdate => Self::Conflict(message),
            LedgerError::InsufficientFunds { .. } => Self::InsufficientFunds(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::AccountNotFound("ACC-001".to_string()).error_code(),
            "ACCOUNT_NOT_FOUND"
        );
        assert_eq!(
            LedgerError::InsufficientFunds {
                balance: dec!(100.00),
                attempted: dec!(250.00),
            }
            .error_code(),
            "INSUFFICIENT_FUNDS"
        );
        assert_eq!(
            LedgerError::NotLatestMovement(MovementId::new()).error_code(),
            "NOT_LATEST_MOVEMENT"
        );
        assert_eq!(LedgerError::ConcurrentUpdate.error_code(), "CONCURRENT_UPDATE");
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            LedgerError::InvalidAccountNumber(String::new()).http_status_code(),
            400
        );
        assert_eq!(
            LedgerError::AccountNotFound("ACC-001".to_string()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::DuplicateAccountNumber("ACC-001".to_string()).http_status_code(),
            409
        );
        assert_eq!(LedgerError::ConcurrentUpdate.http_status_code(), 409);
        assert_eq!(
            LedgerError::InactiveAccount("ACC-001".to_string()).http_status_code(),
            422
        );
        assert_eq!(
            LedgerError::InsufficientFunds {
                balance: dec!(0),
                attempted: dec!(1),
            }
            .http_status_code(),
            422
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::ConcurrentUpdate.is_retryable());
        assert!(!LedgerError::AccountNotFound("ACC-001".to_string()).is_retryable());
        assert!(!LedgerError::NotLatestMovement(MovementId::new()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::InsufficientFunds {
            balance: dec!(700.00),
            attempted: dec!(900.00),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: balance 700.00, attempted withdrawal 900.00"
        );

        let err = LedgerError::OpeningBalanceLocked(3);
        assert_eq!(err.to_string(), "Opening balance is locked: account has 3 movements");
    }

    #[test]
    fn test_app_error_conversion() {
        let app: AppError = LedgerError::AccountNotFound("ACC-001".to_string()).into();
        assert!(matches!(app, AppError::NotFound(_)));

        let app: AppError = LedgerError::InsufficientFunds {
            balance: dec!(10),
            attempted: dec!(20),
        }
        .into();
        assert!(matches!(app, AppError::InsufficientFunds(_)));

        let app: AppError = LedgerError::ConcurrentUpdate.into();
        assert!(matches!(app, AppError::Conflict(_)));

        let app: AppError = LedgerError::ImmutableField("owner_client_id").into();
        assert!(matches!(app, AppError::Conflict(_)));

        let app: AppError = LedgerError::DuplicateAccountNumber("ACC-001".to_string()).into();
        assert!(matches!(app, AppError::DuplicateKey(_)));
    }
}
