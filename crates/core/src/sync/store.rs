//! Storage contract for applying client lifecycle events.

use async_trait::async_trait;
use ledgra_shared::types::ClientId;
use thiserror::Error;

/// Errors from applying a lifecycle event to storage.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The storage operation failed; the delivery must not be
    /// acknowledged so the event is redelivered.
    #[error("Sync storage error: {0}")]
    Storage(String),
}

/// Applies client lifecycle events to the accounts this service owns.
///
/// Each method covers every account of the given client in one atomic
/// operation, and each is idempotent: re-applying an already-applied
/// event changes nothing. Together that makes at-least-once delivery
/// safe without any dedup bookkeeping.
#[async_trait]
pub trait AccountSync: Send + Sync {
    /// Reactivates all accounts owned by the client.
    ///
    /// Returns the number of accounts that were touched.
    async fn activate_client_accounts(&self, client: &ClientId) -> Result<u64, SyncError>;

    /// Deactivates all accounts owned by the client.
    ///
    /// Returns the number of accounts that were touched.
    async fn deactivate_client_accounts(&self, client: &ClientId) -> Result<u64, SyncError>;

    /// Removes all accounts owned by the client, movements included.
    ///
    /// Returns the number of accounts that were removed.
    async fn purge_client_accounts(&self, client: &ClientId) -> Result<u64, SyncError>;
}
