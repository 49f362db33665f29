//! Movement repository for ledger writes and queries.
//!
//! Every write begins a transaction and locks the owning account row
//! (`SELECT ... FOR UPDATE`) before reading the movement chain, so
//! movements of one account are applied strictly one at a time. The
//! `(account_id, sequence)` unique index backstops the lock: a writer
//! that slips past it fails with `ConcurrentUpdate` instead of
//! corrupting the chain.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

use ledgra_core::account::Standing;
use ledgra_core::ledger::{
    amendment_base, check_mutable, registration_base, resolve_movement, LedgerError, MovementKind,
    MovementRecord,
};
use ledgra_shared::error::AppError;
use ledgra_shared::types::{AccountId, MovementId};

use crate::entities::{accounts, movements};

// ========== Movement Errors ==========

/// Error types for movement operations.
#[derive(Debug, thiserror::Error)]
pub enum MovementError {
    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<MovementError> for AppError {
    fn from(err: MovementError) -> Self {
        match err {
            MovementError::Ledger(e) => e.into(),
            MovementError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

// ========== Inputs ==========

/// Input for posting a new movement.
#[derive(Debug, Clone)]
pub struct RegisterMovementInput {
    /// Number of the account to post against.
    pub account_number: String,
    /// Deposit or withdrawal.
    pub kind: MovementKind,
    /// Caller-supplied amount. The stored sign comes from the kind, so
    /// `-50` and `50` post the same movement.
    pub amount: Decimal,
}

/// Input for amending the latest (or sole) movement of an account.
#[derive(Debug, Clone)]
pub struct UpdateMovementInput {
    /// The movement to amend.
    pub movement_id: MovementId,
    /// Replacement kind.
    pub kind: MovementKind,
    /// Replacement amount, sign-normalized from the kind.
    pub amount: Decimal,
    /// Replacement timestamp. Defaults to now when omitted.
    pub occurred_at: Option<DateTime<Utc>>,
}

// ========== Repository ==========

/// Repository for movement database operations.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    db: DatabaseConnection,
}

impl MovementRepository {
    /// Creates a new movement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a movement against the account's current balance.
    ///
    /// The account is looked up by number. The base balance is the
    /// latest movement's resulting balance, or the opening balance for
    /// an account with no movements yet. Nothing is persisted when a
    /// ledger rule rejects the movement.
    ///
    /// # Errors
    ///
    /// Returns `MovementError::Ledger` when the account is unknown or
    /// inactive, when a withdrawal would overdraw the balance, or when
    /// a concurrent writer won the race. Returns `MovementError::Database`
    /// on connection failures.
    pub async fn register_movement(
        &self,
        input: RegisterMovementInput,
    ) -> Result<MovementRecord, MovementError> {
        let txn = self.db.begin().await?;

        let account = self.lock_account_by_number(&txn, &input.account_number).await?;
        Standing::from_flag(account.is_active).ensure_active(&account.account_number)?;

        let records = self.load_chain(&txn, account.id).await?;
        let base = registration_base(account.opening_balance, &records);
        let resolved = resolve_movement(base, input.kind, input.amount)?;

        let now = Utc::now();
        let model = movements::ActiveModel {
            id: Set(MovementId::new().into_inner()),
            account_id: Set(account.id),
            occurred_at: Set(now.into()),
            sequence: Set(next_sequence(&records)),
            kind: Set(input.kind.into()),
            signed_amount: Set(resolved.signed_amount),
            resulting_balance: Set(resolved.resulting_balance),
            created_at: Set(now.into()),
        };

        let inserted = model.insert(&txn).await.map_err(classify_write_conflict)?;
        txn.commit().await?;

        Ok(inserted.into())
    }

    /// Amends the latest (or sole) movement of its account, rebasing
    /// its resulting balance on the remaining chain.
    ///
    /// The timestamp is replaced by `occurred_at`, or by the amendment
    /// time when the input omits it.
    ///
    /// # Errors
    ///
    /// Returns `MovementError::Ledger` when the movement is unknown,
    /// when it is neither the latest nor the sole movement of its
    /// account, or when the amended withdrawal would overdraw the
    /// rebased balance. Returns `MovementError::Database` on connection
    /// failures.
    pub async fn update_movement(
        &self,
        input: UpdateMovementInput,
    ) -> Result<MovementRecord, MovementError> {
        let txn = self.db.begin().await?;

        // The pre-lock read only discovers the owning account; the
        // target is re-read under the account lock before any decision.
        let preliminary = self.find_movement(&txn, input.movement_id).await?;
        let account = self.lock_account_by_id(&txn, preliminary.account_id).await?;

        let target = self.find_movement(&txn, input.movement_id).await?;
        let records = self.load_chain(&txn, account.id).await?;
        check_mutable(input.movement_id, &records)?;

        let base = amendment_base(account.opening_balance, &records, input.movement_id);
        let resolved = resolve_movement(base, input.kind, input.amount)?;
        let occurred_at = input.occurred_at.unwrap_or_else(Utc::now);

        let mut active: movements::ActiveModel = target.into();
        active.kind = Set(input.kind.into());
        active.signed_amount = Set(resolved.signed_amount);
        active.resulting_balance = Set(resolved.resulting_balance);
        active.occurred_at = Set(occurred_at.into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        Ok(updated.into())
    }

    /// Deletes the latest (or sole) movement of its account.
    ///
    /// Earlier movements are frozen history and cannot be removed.
    ///
    /// # Errors
    ///
    /// Returns `MovementError::Ledger` when the movement is unknown or
    /// not the latest of its account, and `MovementError::Database` on
    /// connection failures.
    pub async fn delete_movement(&self, movement_id: MovementId) -> Result<(), MovementError> {
        let txn = self.db.begin().await?;

        let preliminary = self.find_movement(&txn, movement_id).await?;
        let account = self.lock_account_by_id(&txn, preliminary.account_id).await?;

        let records = self.load_chain(&txn, account.id).await?;
        check_mutable(movement_id, &records)?;

        movements::Entity::delete_by_id(movement_id.into_inner())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        Ok(())
    }

    /// Lists an account's movements, newest first.
    ///
    /// # Errors
    ///
    /// Returns `MovementError::Database` on connection failures.
    pub async fn list_movements(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<MovementRecord>, MovementError> {
        let models = movements::Entity::find()
            .filter(movements::Column::AccountId.eq(account_id.into_inner()))
            .order_by_desc(movements::Column::OccurredAt)
            .order_by_desc(movements::Column::Sequence)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    /// Counts an account's movements.
    ///
    /// # Errors
    ///
    /// Returns `MovementError::Database` on connection failures.
    pub async fn count_movements(&self, account_id: AccountId) -> Result<u64, MovementError> {
        let count = movements::Entity::find()
            .filter(movements::Column::AccountId.eq(account_id.into_inner()))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    // ========== Private Helpers ==========

    async fn lock_account_by_number(
        &self,
        txn: &DatabaseTransaction,
        number: &str,
    ) -> Result<accounts::Model, MovementError> {
        accounts::Entity::find()
            .filter(accounts::Column::AccountNumber.eq(number))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(number.to_string()).into())
    }

    async fn lock_account_by_id(
        &self,
        txn: &DatabaseTransaction,
        account_id: uuid::Uuid,
    ) -> Result<accounts::Model, MovementError> {
        accounts::Entity::find_by_id(account_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()).into())
    }

    async fn find_movement(
        &self,
        txn: &DatabaseTransaction,
        movement_id: MovementId,
    ) -> Result<movements::Model, MovementError> {
        movements::Entity::find_by_id(movement_id.into_inner())
            .one(txn)
            .await?
            .ok_or_else(|| LedgerError::MovementNotFound(movement_id).into())
    }

    async fn load_chain(
        &self,
        txn: &DatabaseTransaction,
        account_id: uuid::Uuid,
    ) -> Result<Vec<MovementRecord>, MovementError> {
        let models = movements::Entity::find()
            .filter(movements::Column::AccountId.eq(account_id))
            .order_by_asc(movements::Column::OccurredAt)
            .order_by_asc(movements::Column::Sequence)
            .all(txn)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}

/// Next per-account sequence value. Sequences start at 1 and only grow,
/// surviving deletions of the latest movement without reuse hazards
/// because the unique index spans the live rows only.
fn next_sequence(records: &[MovementRecord]) -> i64 {
    records.iter().map(|r| r.sequence).max().unwrap_or(0) + 1
}

/// Maps a unique-index violation on insert to `ConcurrentUpdate` so
/// callers see a retryable conflict rather than a raw driver error.
fn classify_write_conflict(err: DbErr) -> MovementError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => LedgerError::ConcurrentUpdate.into(),
        _ => MovementError::Database(err),
    }
}
