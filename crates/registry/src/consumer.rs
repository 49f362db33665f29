//! Worker that applies client lifecycle events to local accounts.
//!
//! The consumer side of the registry integration. Deliveries are
//! acknowledged only after the storage operation commits; a failed
//! handler leaves the delivery unacknowledged so the channel redelivers
//! it. Redelivery is the only retry mechanism, which is safe because
//! every [`AccountSync`] operation is idempotent.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use ledgra_core::sync::{AccountSync, ClientLifecycleEvent, LifecycleEventKind, SyncError};

use crate::channel::{EventMessage, Subscription};

/// Applies client lifecycle events from a subscription to the accounts
/// this service owns.
pub struct AccountSyncConsumer<S> {
    store: S,
}

impl<S: AccountSync> AccountSyncConsumer<S> {
    /// Creates a consumer applying events through the given store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Consumes deliveries until the shutdown token fires.
    ///
    /// Each delivery is handled in its own storage operation and
    /// acknowledged on success. On failure the delivery is dropped
    /// unacknowledged and comes back on the next receive.
    pub async fn run(&self, subscription: Subscription, shutdown: CancellationToken) {
        loop {
            let delivery = tokio::select! {
                () = shutdown.cancelled() => break,
                delivery = subscription.recv() => delivery,
            };

            match self.handle(delivery.message()).await {
                Ok(()) => delivery.ack(),
                Err(err) => {
                    warn!(
                        key = %delivery.message().key,
                        attempt = delivery.attempt(),
                        error = %err,
                        "Lifecycle event handler failed, delivery will be retried"
                    );
                    drop(delivery);
                }
            }
        }
        info!("Account sync consumer stopped");
    }

    /// Applies one wire message to the store.
    ///
    /// Undecodable payloads and unrecognized event kinds are logged and
    /// discarded as handled, so a poison message cannot wedge the
    /// subscription. Storage failures propagate to the caller, which
    /// withholds the acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns the storage error when the event could not be applied.
    pub async fn handle(&self, message: &EventMessage) -> Result<(), SyncError> {
        let event: ClientLifecycleEvent = match serde_json::from_value(message.payload.clone()) {
            Ok(event) => event,
            Err(err) => {
                warn!(
                    key = %message.key,
                    error = %err,
                    "Discarding lifecycle event with undecodable payload"
                );
                return Ok(());
            }
        };

        match event.kind {
            LifecycleEventKind::Activated => {
                let affected = self.store.activate_client_accounts(&event.client_id).await?;
                info!(client_id = %event.client_id, affected, "Client accounts reactivated");
            }
            LifecycleEventKind::Deactivated => {
                let affected = self
                    .store
                    .deactivate_client_accounts(&event.client_id)
                    .await?;
                info!(client_id = %event.client_id, affected, "Client accounts deactivated");
            }
            LifecycleEventKind::Deleted => {
                let affected = self.store.purge_client_accounts(&event.client_id).await?;
                info!(client_id = %event.client_id, affected, "Client accounts purged");
            }
            LifecycleEventKind::Unknown(kind) => {
                warn!(
                    client_id = %event.client_id,
                    kind = %kind,
                    "Discarding lifecycle event of unknown kind"
                );
            }
        }

        Ok(())
    }
}
