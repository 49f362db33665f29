//! Field validation and immutability rules for accounts.

use rust_decimal::Decimal;

use crate::ledger::LedgerError;

use super::standing::{LifecycleAction, Standing};
use super::types::{Account, AccountPatch, AccountUpdate, NewAccount};

/// Longest permitted account number.
pub const MAX_ACCOUNT_NUMBER_LEN: usize = 20;

fn validate_account_number(number: &str) -> Result<(), LedgerError> {
    if number.trim().is_empty() || number.chars().count() > MAX_ACCOUNT_NUMBER_LEN {
        return Err(LedgerError::InvalidAccountNumber(number.to_string()));
    }
    Ok(())
}

/// Validates the payload for opening a new account.
///
/// # Errors
///
/// Returns `InvalidAccountNumber` for a blank or overlong number and
/// `NegativeOpeningBalance` when the balance starts below zero.
pub fn validate_new_account(input: &NewAccount) -> Result<(), LedgerError> {
    validate_account_number(&input.account_number)?;

    if let Some(balance) = input.opening_balance {
        if balance < Decimal::ZERO {
            return Err(LedgerError::NegativeOpeningBalance(balance));
        }
    }

    Ok(())
}

/// Validates an update against the stored account and folds it into the
/// effective patch.
///
/// Callers send the full account shape back; fields that match the
/// stored record are dropped from the patch so an echo of the current
/// state applies cleanly as a no-op.
///
/// # Errors
///
/// Returns `ImmutableField` when the number or owner differ from the
/// stored record, `OpeningBalanceLocked` when the opening balance
/// changes on an account that already has movements, and
/// `NegativeOpeningBalance` for balances below zero.
pub fn validate_update(
    current: &Account,
    update: &AccountUpdate,
    movement_count: u64,
) -> Result<AccountPatch, LedgerError> {
    if let Some(number) = &update.account_number {
        if number != &current.account_number {
            return Err(LedgerError::ImmutableField("account_number"));
        }
    }

    if let Some(owner) = &update.owner_client_id {
        if owner != &current.owner_client_id {
            return Err(LedgerError::ImmutableField("owner_client_id"));
        }
    }

    let mut patch = AccountPatch::default();

    if let Some(balance) = update.opening_balance {
        if balance < Decimal::ZERO {
            return Err(LedgerError::NegativeOpeningBalance(balance));
        }
        if balance != current.opening_balance {
            if movement_count > 0 {
                return Err(LedgerError::OpeningBalanceLocked(movement_count));
            }
            patch.opening_balance = Some(balance);
        }
    }

    if let Some(account_type) = update.account_type {
        if account_type != current.account_type {
            patch.account_type = Some(account_type);
        }
    }

    if let Some(active) = update.active {
        let transition =
            Standing::from_flag(current.active).apply(LifecycleAction::for_flag(active));
        if transition.changed {
            patch.active = Some(transition.next.as_flag());
        }
    }

    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::types::AccountType;
    use chrono::Utc;
    use ledgra_shared::types::{AccountId, ClientId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn make_account() -> Account {
        Account {
            id: AccountId::new(),
            account_number: "ACC-001".to_string(),
            account_type: AccountType::Savings,
            opening_balance: dec!(500.00),
            active: true,
            owner_client_id: ClientId::from("CLI-42"),
            created_at: Utc::now(),
        }
    }

    fn make_new_account(number: &str, opening: Option<Decimal>) -> NewAccount {
        NewAccount {
            account_number: number.to_string(),
            account_type: AccountType::Checking,
            opening_balance: opening,
            owner_client_id: ClientId::from("CLI-42"),
        }
    }

    #[rstest]
    #[case("ACC-001", true)]
    #[case("12345678901234567890", true)] // exactly 20 chars
    #[case("123456789012345678901", false)] // 21 chars
    #[case("", false)]
    #[case("   ", false)]
    fn test_account_number_length(#[case] number: &str, #[case] ok: bool) {
        let result = validate_new_account(&make_new_account(number, None));
        assert_eq!(result.is_ok(), ok, "number: {number:?}");
    }

    #[test]
    fn test_new_account_rejects_negative_opening() {
        let err = validate_new_account(&make_new_account("ACC-001", Some(dec!(-0.01)))).unwrap_err();
        assert!(matches!(err, LedgerError::NegativeOpeningBalance(b) if b == dec!(-0.01)));

        assert!(validate_new_account(&make_new_account("ACC-001", Some(dec!(0)))).is_ok());
        assert!(validate_new_account(&make_new_account("ACC-001", None)).is_ok());
    }

    #[test]
    fn test_update_rejects_number_change() {
        let current = make_account();
        let update = AccountUpdate {
            account_number: Some("ACC-002".to_string()),
            owner_client_id: None,
            account_type: None,
            active: None,
            opening_balance: None,
        };
        assert!(matches!(
            validate_update(&current, &update, 0),
            Err(LedgerError::ImmutableField("account_number"))
        ));
    }

    #[test]
    fn test_update_rejects_owner_change() {
        let current = make_account();
        let update = AccountUpdate {
            account_number: None,
            owner_client_id: Some(ClientId::from("CLI-99")),
            account_type: None,
            active: None,
            opening_balance: None,
        };
        assert!(matches!(
            validate_update(&current, &update, 0),
            Err(LedgerError::ImmutableField("owner_client_id"))
        ));
    }

    #[test]
    fn test_update_locks_opening_balance_once_movements_exist() {
        let current = make_account();
        let update = AccountUpdate {
            account_number: None,
            owner_client_id: None,
            account_type: None,
            active: None,
            opening_balance: Some(dec!(900.00)),
        };

        // No movements yet: the change goes through.
        let patch = validate_update(&current, &update, 0).unwrap();
        assert_eq!(patch.opening_balance, Some(dec!(900.00)));

        // Movements exist: the change is rejected.
        assert!(matches!(
            validate_update(&current, &update, 3),
            Err(LedgerError::OpeningBalanceLocked(3))
        ));
    }

    #[test]
    fn test_update_echoing_current_state_is_noop() {
        let current = make_account();
        let update = AccountUpdate {
            account_number: Some(current.account_number.clone()),
            owner_client_id: Some(current.owner_client_id.clone()),
            account_type: Some(current.account_type),
            active: Some(current.active),
            opening_balance: Some(current.opening_balance),
        };
        // Echoing the record back must apply cleanly even with movements.
        let patch = validate_update(&current, &update, 5).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_update_folds_changes_into_patch() {
        let current = make_account();
        let update = AccountUpdate {
            account_number: None,
            owner_client_id: None,
            account_type: Some(AccountType::Checking),
            active: Some(false),
            opening_balance: None,
        };
        let patch = validate_update(&current, &update, 5).unwrap();
        assert_eq!(patch.account_type, Some(AccountType::Checking));
        assert_eq!(patch.active, Some(false));
        assert_eq!(patch.opening_balance, None);
    }

    #[test]
    fn test_update_rejects_negative_opening() {
        let current = make_account();
        let update = AccountUpdate {
            account_number: None,
            owner_client_id: None,
            account_type: None,
            active: None,
            opening_balance: Some(dec!(-1)),
        };
        assert!(matches!(
            validate_update(&current, &update, 0),
            Err(LedgerError::NegativeOpeningBalance(_))
        ));
    }
}
