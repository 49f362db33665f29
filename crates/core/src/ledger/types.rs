//! Ledger domain types for movement registration and amendment.
//!
//! This module defines the core types used for recording and rebasing
//! account movements in the running-balance ledger.

use chrono::{DateTime, Utc};
use ledgra_shared::types::{AccountId, MovementId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Movement kind: either Deposit or Withdrawal.
///
/// The kind alone determines the sign of the stored amount:
/// deposits are persisted positive, withdrawals negative, regardless
/// of the sign the caller supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    /// Deposit into the account.
    Deposit,
    /// Withdrawal from the account.
    Withdrawal,
}

impl MovementKind {
    /// Returns true if this kind reduces the account balance.
    #[must_use]
    pub fn is_withdrawal(&self) -> bool {
        matches!(self, Self::Withdrawal)
    }

    /// Returns the sign applied to stored amounts of this kind.
    #[must_use]
    pub fn sign(&self) -> Decimal {
        match self {
            Self::Deposit => Decimal::ONE,
            Self::Withdrawal => Decimal::NEGATIVE_ONE,
        }
    }
}

/// A movement already persisted against an account.
///
/// `resulting_balance` is the account balance immediately after this
/// movement was applied; consecutive records chain off each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    /// Unique identifier for this movement.
    pub id: MovementId,
    /// When the movement took effect.
    pub occurred_at: DateTime<Utc>,
    /// Per-account insertion counter; breaks ties between equal timestamps.
    pub sequence: i64,
    /// Whether this is a deposit or withdrawal.
    pub kind: MovementKind,
    /// Signed amount (positive for deposits, negative for withdrawals).
    pub signed_amount: Decimal,
    /// Account balance after applying this movement.
    pub resulting_balance: Decimal,
    /// The account this movement belongs to.
    pub account_id: AccountId,
}

/// Outcome of applying one movement against a base balance.
///
/// Holds the values the caller persists; nothing has been stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMovement {
    /// The normalized signed amount.
    pub signed_amount: Decimal,
    /// The balance after applying the signed amount to the base.
    pub resulting_balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_movement_kind_predicates() {
        assert!(MovementKind::Withdrawal.is_withdrawal());
        assert!(!MovementKind::Deposit.is_withdrawal());
    }

    #[test]
    fn test_movement_kind_sign() {
        assert_eq!(MovementKind::Deposit.sign(), dec!(1));
        assert_eq!(MovementKind::Withdrawal.sign(), dec!(-1));
    }

    #[test]
    fn test_movement_kind_wire_format() {
        assert_eq!(
            serde_json::to_string(&MovementKind::Deposit).unwrap(),
            "\"DEPOSIT\""
        );
        assert_eq!(
            serde_json::to_string(&MovementKind::Withdrawal).unwrap(),
            "\"WITHDRAWAL\""
        );
        let parsed: MovementKind = serde_json::from_str("\"WITHDRAWAL\"").unwrap();
        assert_eq!(parsed, MovementKind::Withdrawal);
    }
}
