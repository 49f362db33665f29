//! Database enum mappings for Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account product type (`account_type` Postgres enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    /// Savings account.
    #[sea_orm(string_value = "savings")]
    Savings,
    /// Checking account.
    #[sea_orm(string_value = "checking")]
    Checking,
}

impl From<ledgra_core::account::AccountType> for AccountType {
    fn from(value: ledgra_core::account::AccountType) -> Self {
        match value {
            ledgra_core::account::AccountType::Savings => Self::Savings,
            ledgra_core::account::AccountType::Checking => Self::Checking,
        }
    }
}

impl From<AccountType> for ledgra_core::account::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Savings => Self::Savings,
            AccountType::Checking => Self::Checking,
        }
    }
}

/// Movement kind (`movement_kind` Postgres enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_kind")]
pub enum MovementKind {
    /// Deposit into the account.
    #[sea_orm(string_value = "deposit")]
    Deposit,
    /// Withdrawal from the account.
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
}

impl From<ledgra_core::ledger::MovementKind> for MovementKind {
    fn from(value: ledgra_core::ledger::MovementKind) -> Self {
        match value {
            ledgra_core::ledger::MovementKind::Deposit => Self::Deposit,
            ledgra_core::ledger::MovementKind::Withdrawal => Self::Withdrawal,
        }
    }
}

impl From<MovementKind> for ledgra_core::ledger::MovementKind {
    fn from(value: MovementKind) -> Self {
        match value {
            MovementKind::Deposit => Self::Deposit,
            MovementKind::Withdrawal => Self::Withdrawal,
        }
    }
}
