//! Business rules for registering, amending, and removing movements.
//!
//! All functions here are pure: they decide, the storage layer executes.
//! The base balance of an account is the `resulting_balance` of its
//! latest movement, or the opening balance when no movements exist.

use rust_decimal::Decimal;

use ledgra_shared::types::MovementId;

use super::error::LedgerError;
use super::types::{MovementKind, MovementRecord, ResolvedMovement};

/// Normalizes a caller-supplied amount to its stored signed form.
///
/// The movement kind wins over the sign the caller sent: deposits are
/// stored positive and withdrawals negative, so `Withdrawal` with `900`
/// and `Withdrawal` with `-900` both normalize to `-900`.
#[must_use]
pub fn normalized_amount(kind: MovementKind, amount: Decimal) -> Decimal {
    amount.abs() * kind.sign()
}

/// Applies one movement against a base balance.
///
/// # Errors
///
/// Returns `InsufficientFunds` if the resulting balance would drop below
/// zero. Nothing is persisted by this function either way.
pub fn resolve_movement(
    base_balance: Decimal,
    kind: MovementKind,
    amount: Decimal,
) -> Result<ResolvedMovement, LedgerError> {
    let signed_amount = normalized_amount(kind, amount);
    let resulting_balance = base_balance + signed_amount;

    if resulting_balance < Decimal::ZERO {
        return Err(LedgerError::InsufficientFunds {
            balance: base_balance,
            attempted: amount.abs(),
        });
    }

    Ok(ResolvedMovement {
        signed_amount,
        resulting_balance,
    })
}

/// Returns the latest movement of an account.
///
/// Latest means greatest `(occurred_at, sequence)`; the sequence breaks
/// ties between movements recorded in the same instant.
#[must_use]
pub fn latest(records: &[MovementRecord]) -> Option<&MovementRecord> {
    records.iter().max_by_key(|r| (r.occurred_at, r.sequence))
}

/// Returns the balance a new movement is applied against.
#[must_use]
pub fn registration_base(opening_balance: Decimal, records: &[MovementRecord]) -> Decimal {
    latest(records).map_or(opening_balance, |r| r.resulting_balance)
}

/// Returns the balance an amended movement is re-applied against.
///
/// The target is excluded from the chain, so a sole movement rebases
/// against the opening balance and the latest movement rebases against
/// its predecessor.
#[must_use]
pub fn amendment_base(
    opening_balance: Decimal,
    records: &[MovementRecord],
    excluding: MovementId,
) -> Decimal {
    records
        .iter()
        .filter(|r| r.id != excluding)
        .max_by_key(|r| (r.occurred_at, r.sequence))
        .map_or(opening_balance, |r| r.resulting_balance)
}

/// Checks that a movement may be amended or removed.
///
/// Only the sole movement of an account, or its latest one, is mutable.
/// Anything earlier has successors whose balances chain off it.
///
/// # Errors
///
/// Returns `MovementNotFound` if the target is not among the account's
/// records, or `NotLatestMovement` if newer movements exist.
pub fn check_mutable(target: MovementId, records: &[MovementRecord]) -> Result<(), LedgerError> {
    if !records.iter().any(|r| r.id == target) {
        return Err(LedgerError::MovementNotFound(target));
    }

    if records.len() == 1 {
        return Ok(());
    }

    match latest(records) {
        Some(newest) if newest.id == target => Ok(()),
        _ => Err(LedgerError::NotLatestMovement(target)),
    }
}
