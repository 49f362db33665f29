//! Account domain types.

use chrono::{DateTime, Utc};
use ledgra_shared::types::{AccountId, ClientId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Savings account.
    Savings,
    /// Checking account.
    Checking,
}

/// A client-owned account.
///
/// `account_number` and `owner_client_id` are fixed at creation. The
/// owner's display name is not stored here: it belongs to the client
/// registry and is resolved on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Business identifier, unique across all accounts.
    pub account_number: String,
    /// Savings or checking.
    pub account_type: AccountType,
    /// Balance the movement chain starts from.
    pub opening_balance: Decimal,
    /// Whether the account accepts ledger writes.
    pub active: bool,
    /// The registry client that owns this account.
    pub owner_client_id: ClientId,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Input for opening a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Business identifier, unique across all accounts.
    pub account_number: String,
    /// Savings or checking.
    pub account_type: AccountType,
    /// Defaults to zero when omitted.
    pub opening_balance: Option<Decimal>,
    /// The registry client that will own the account.
    pub owner_client_id: ClientId,
}

/// Full update payload for an existing account.
///
/// Mirrors the account shape so callers can send the whole record back;
/// validation decides which fields may actually change.
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    /// Must match the stored number; the field is immutable.
    pub account_number: Option<String>,
    /// Must match the stored owner; the field is immutable.
    pub owner_client_id: Option<ClientId>,
    /// New product type, if changing.
    pub account_type: Option<AccountType>,
    /// New active flag, if changing.
    pub active: Option<bool>,
    /// New opening balance; only legal while no movements exist.
    pub opening_balance: Option<Decimal>,
}

/// The effective, validated changes to apply to an account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPatch {
    /// New product type, if any.
    pub account_type: Option<AccountType>,
    /// New active flag, if any.
    pub active: Option<bool>,
    /// New opening balance, if any.
    pub opening_balance: Option<Decimal>,
}

impl AccountPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.account_type.is_none() && self.active.is_none() && self.opening_balance.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&AccountType::Savings).unwrap(),
            "\"SAVINGS\""
        );
        assert_eq!(
            serde_json::to_string(&AccountType::Checking).unwrap(),
            "\"CHECKING\""
        );
        let parsed: AccountType = serde_json::from_str("\"CHECKING\"").unwrap();
        assert_eq!(parsed, AccountType::Checking);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(AccountPatch::default().is_empty());
        assert!(!AccountPatch {
            active: Some(false),
            ..AccountPatch::default()
        }
        .is_empty());
    }
}
