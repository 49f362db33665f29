//! Account repository for account database operations.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

use ledgra_core::account::{validate_new_account, AccountPatch, LifecycleAction, NewAccount};
use ledgra_core::ledger::LedgerError;
use ledgra_core::sync::{AccountSync, SyncError};
use ledgra_shared::error::AppError;
use ledgra_shared::types::{AccountId, ClientId};

use crate::entities::{accounts, movements};

// ========== Account Errors ==========

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Ledger(e) => e.into(),
            AccountError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

// ========== Repository ==========

/// Repository for account database operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account.
    ///
    /// New accounts open active, with the opening balance defaulting to
    /// zero when the input omits it.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Ledger` when the account number is invalid
    /// or already taken, and `AccountError::Database` on connection
    /// failures. The unique index on the number backstops the pre-check,
    /// so a racing duplicate still surfaces as `DuplicateAccountNumber`.
    pub async fn create_account(&self, input: NewAccount) -> Result<accounts::Model, AccountError> {
        validate_new_account(&input)?;

        let existing = accounts::Entity::find()
            .filter(accounts::Column::AccountNumber.eq(&input.account_number))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(LedgerError::DuplicateAccountNumber(input.account_number).into());
        }

        let number = input.account_number.clone();
        let now = chrono::Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            account_number: Set(input.account_number),
            account_type: Set(input.account_type.into()),
            opening_balance: Set(input.opening_balance.unwrap_or(Decimal::ZERO)),
            is_active: Set(true),
            owner_client_id: Set(input.owner_client_id.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = account.insert(&self.db).await.map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                LedgerError::DuplicateAccountNumber(number).into()
            }
            _ => AccountError::Database(err),
        })?;

        Ok(inserted)
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Database` on connection failures.
    pub async fn find_account_by_id(
        &self,
        id: AccountId,
    ) -> Result<Option<accounts::Model>, AccountError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?;

        Ok(account)
    }

    /// Finds an account by its number.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Database` on connection failures.
    pub async fn find_account_by_number(
        &self,
        number: &str,
    ) -> Result<Option<accounts::Model>, AccountError> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::AccountNumber.eq(number))
            .one(&self.db)
            .await?;

        Ok(account)
    }

    /// Lists all accounts, ordered by account number.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Database` on connection failures.
    pub async fn list_accounts(&self) -> Result<Vec<accounts::Model>, AccountError> {
        let accounts = accounts::Entity::find()
            .order_by_asc(accounts::Column::AccountNumber)
            .all(&self.db)
            .await?;

        Ok(accounts)
    }

    /// Applies a validated patch to an account.
    ///
    /// The patch carries only the mutable fields, so number and owner
    /// cannot change through this path. Callers validate the full
    /// update against the current state first; the movement count that
    /// locks the opening balance is re-checked here under the same row
    /// lock the ledger writers take, so a movement racing the update
    /// cannot slip an opening-balance change past the rule.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Ledger` when the account is unknown or
    /// the opening balance changes on an account with movements, and
    /// `AccountError::Database` on connection failures.
    pub async fn update_account(
        &self,
        id: AccountId,
        patch: AccountPatch,
    ) -> Result<accounts::Model, AccountError> {
        let txn = self.db.begin().await?;

        let account = accounts::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))?;

        if patch.is_empty() {
            return Ok(account);
        }

        if patch.opening_balance.is_some() {
            let movement_count = movements::Entity::find()
                .filter(movements::Column::AccountId.eq(account.id))
                .count(&txn)
                .await?;
            if movement_count > 0 {
                return Err(LedgerError::OpeningBalanceLocked(movement_count).into());
            }
        }

        let now = chrono::Utc::now().into();
        let mut active: accounts::ActiveModel = account.into();

        if let Some(account_type) = patch.account_type {
            active.account_type = Set(account_type.into());
        }
        if let Some(is_active) = patch.active {
            active.is_active = Set(is_active);
        }
        if let Some(opening_balance) = patch.opening_balance {
            active.opening_balance = Set(opening_balance);
        }
        active.updated_at = Set(now);

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes an account together with its movement history.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Ledger` when the account is unknown, and
    /// `AccountError::Database` on connection failures.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), AccountError> {
        let txn = self.db.begin().await?;

        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))?;

        movements::Entity::delete_many()
            .filter(movements::Column::AccountId.eq(account.id))
            .exec(&txn)
            .await?;
        accounts::Entity::delete_by_id(account.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    // ========== Private Helpers ==========

    /// Drives every account of a client into the action's target
    /// standing, skipping rows already there so the affected count
    /// reflects actual transitions and replays are no-ops.
    async fn apply_standing_for_client(
        &self,
        client: &ClientId,
        action: LifecycleAction,
    ) -> Result<u64, AccountError> {
        let target = action.target();
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::IsActive, Expr::value(target.as_flag()))
            .col_expr(
                accounts::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().fixed_offset()),
            )
            .filter(accounts::Column::OwnerClientId.eq(client.as_str()))
            .filter(accounts::Column::IsActive.ne(target.as_flag()))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn purge_for_client(&self, client: &ClientId) -> Result<u64, AccountError> {
        let txn = self.db.begin().await?;

        let ids: Vec<uuid::Uuid> = accounts::Entity::find()
            .filter(accounts::Column::OwnerClientId.eq(client.as_str()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|account| account.id)
            .collect();

        if ids.is_empty() {
            return Ok(0);
        }

        movements::Entity::delete_many()
            .filter(movements::Column::AccountId.is_in(ids.clone()))
            .exec(&txn)
            .await?;
        let deleted = accounts::Entity::delete_many()
            .filter(accounts::Column::Id.is_in(ids))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(deleted.rows_affected)
    }
}

// ========== Client Registry Sync ==========

/// Lifecycle handlers applied when client events arrive. Each runs as
/// one database operation (or one transaction), so a failure leaves
/// nothing half-applied and the event can simply be redelivered.
#[async_trait]
impl AccountSync for AccountRepository {
    async fn activate_client_accounts(&self, client: &ClientId) -> Result<u64, SyncError> {
        self.apply_standing_for_client(client, LifecycleAction::Activate)
            .await
            .map_err(into_sync_error)
    }

    async fn deactivate_client_accounts(&self, client: &ClientId) -> Result<u64, SyncError> {
        self.apply_standing_for_client(client, LifecycleAction::Deactivate)
            .await
            .map_err(into_sync_error)
    }

    async fn purge_client_accounts(&self, client: &ClientId) -> Result<u64, SyncError> {
        self.purge_for_client(client).await.map_err(into_sync_error)
    }
}

fn into_sync_error(err: AccountError) -> SyncError {
    SyncError::Storage(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_number_maps_to_duplicate_key() {
        let err = AccountError::Ledger(LedgerError::DuplicateAccountNumber("ACC-1".to_string()));
        assert!(matches!(AppError::from(err), AppError::DuplicateKey(_)));
    }

    #[test]
    fn test_database_error_maps_to_database() {
        let err = AccountError::Database(DbErr::Custom("boom".to_string()));
        assert!(matches!(AppError::from(err), AppError::Database(_)));
    }

    #[test]
    fn test_sync_error_keeps_cause_message() {
        let err = AccountError::Database(DbErr::Custom("connection reset".to_string()));
        let sync = into_sync_error(err);
        assert!(sync.to_string().contains("connection reset"));
    }
}
