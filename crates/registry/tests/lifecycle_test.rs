//! End-to-end lifecycle flow over the in-memory channel.
//!
//! Exercises producer -> channel -> consumer against an in-memory account
//! store, with no database or broker involved.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use ledgra_core::account::Standing;
use ledgra_core::ledger::LedgerError;
use ledgra_core::sync::{AccountSync, SyncError};
use ledgra_registry::{
    AccountSyncConsumer, ClientLifecycleProducer, EventChannel, InMemoryEventChannel,
};
use ledgra_shared::types::ClientId;

/// Account store double: account number -> (owner client code, active).
///
/// Mirrors the repository's sync semantics: operations touch only rows
/// not already in the target state, so replays report zero.
#[derive(Clone, Default)]
struct MemoryAccounts {
    rows: Arc<Mutex<HashMap<String, (String, bool)>>>,
    applied: Arc<Mutex<Vec<(String, u64)>>>,
}

impl MemoryAccounts {
    fn open(&self, number: &str, owner: &str) {
        self.rows
            .lock()
            .unwrap()
            .insert(number.to_string(), (owner.to_string(), true));
    }

    fn is_active(&self, number: &str) -> Option<bool> {
        self.rows
            .lock()
            .unwrap()
            .get(number)
            .map(|(_, active)| *active)
    }

    fn contains(&self, number: &str) -> bool {
        self.rows.lock().unwrap().contains_key(number)
    }

    fn applied(&self) -> Vec<(String, u64)> {
        self.applied.lock().unwrap().clone()
    }

    fn set_active_for(&self, client: &ClientId, active: bool) -> u64 {
        let mut rows = self.rows.lock().unwrap();
        let mut touched = 0;
        for (owner, row_active) in rows.values_mut() {
            if owner.as_str() == client.as_str() && *row_active != active {
                *row_active = active;
                touched += 1;
            }
        }
        touched
    }

    fn purge_for(&self, client: &ClientId) -> u64 {
        let mut rows = self.rows.lock().unwrap();
        let mut removed = 0;
        rows.retain(|_, (owner, _)| {
            if owner.as_str() == client.as_str() {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    fn record(&self, op: &str, affected: u64) -> Result<u64, SyncError> {
        self.applied.lock().unwrap().push((op.to_string(), affected));
        Ok(affected)
    }
}

#[async_trait]
impl AccountSync for MemoryAccounts {
    async fn activate_client_accounts(&self, client: &ClientId) -> Result<u64, SyncError> {
        let affected = self.set_active_for(client, true);
        self.record("activate", affected)
    }

    async fn deactivate_client_accounts(&self, client: &ClientId) -> Result<u64, SyncError> {
        let affected = self.set_active_for(client, false);
        self.record("deactivate", affected)
    }

    async fn purge_client_accounts(&self, client: &ClientId) -> Result<u64, SyncError> {
        let affected = self.purge_for(client);
        self.record("purge", affected)
    }
}

struct Harness {
    producer: ClientLifecycleProducer,
    accounts: MemoryAccounts,
    shutdown: CancellationToken,
    worker: tokio::task::JoinHandle<()>,
}

impl Harness {
    fn start() -> Self {
        let channel = Arc::new(InMemoryEventChannel::new("clientes-eventos"));
        let subscription = channel.subscribe("cuentas");
        let accounts = MemoryAccounts::default();
        let shutdown = CancellationToken::new();

        let consumer = AccountSyncConsumer::new(accounts.clone());
        let worker = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { consumer.run(subscription, shutdown).await })
        };

        Self {
            producer: ClientLifecycleProducer::new(channel),
            accounts,
            shutdown,
            worker,
        }
    }

    async fn stop(self) {
        self.shutdown.cancel();
        self.worker.await.unwrap();
    }
}

async fn wait_for(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within one second");
}

// ============================================================================
// Deactivation blocks registrations, reactivation unblocks them
// ============================================================================

#[tokio::test]
async fn test_deactivation_event_blocks_new_registrations() {
    let harness = Harness::start();
    let client = ClientId::from("CLI-1");
    harness.accounts.open("ACC-001", "CLI-1");
    harness.accounts.open("ACC-002", "CLI-1");
    harness.accounts.open("ACC-100", "CLI-2");

    harness.producer.client_deactivated(&client).await.unwrap();

    let accounts = harness.accounts.clone();
    wait_for(move || accounts.is_active("ACC-002") == Some(false)).await;

    assert_eq!(harness.accounts.is_active("ACC-001"), Some(false));
    assert_eq!(
        harness.accounts.is_active("ACC-100"),
        Some(true),
        "other clients' accounts must be untouched"
    );

    // The ledger guard now refuses writes on the deactivated accounts.
    let guard = Standing::from_flag(harness.accounts.is_active("ACC-001").unwrap())
        .ensure_active("ACC-001");
    assert!(matches!(guard, Err(LedgerError::InactiveAccount(_))));
    assert!(Standing::from_flag(true).ensure_active("ACC-100").is_ok());

    // Reactivation restores them.
    harness.producer.client_activated(&client).await.unwrap();
    let accounts = harness.accounts.clone();
    wait_for(move || accounts.is_active("ACC-001") == Some(true)).await;
    assert!(
        Standing::from_flag(harness.accounts.is_active("ACC-001").unwrap())
            .ensure_active("ACC-001")
            .is_ok()
    );

    harness.stop().await;
}

// ============================================================================
// Deletion purges every account of the client
// ============================================================================

#[tokio::test]
async fn test_deletion_event_purges_accounts() {
    let harness = Harness::start();
    harness.accounts.open("ACC-301", "CLI-3");
    harness.accounts.open("ACC-302", "CLI-3");
    harness.accounts.open("ACC-401", "CLI-4");

    harness
        .producer
        .client_deleted(&ClientId::from("CLI-3"))
        .await
        .unwrap();

    let accounts = harness.accounts.clone();
    wait_for(move || !accounts.contains("ACC-301")).await;

    assert!(!harness.accounts.contains("ACC-302"));
    assert!(
        harness.accounts.contains("ACC-401"),
        "other clients' accounts must survive the purge"
    );
    assert_eq!(harness.accounts.applied(), vec![("purge".to_string(), 2)]);

    harness.stop().await;
}

// ============================================================================
// Duplicate deliveries apply as no-ops
// ============================================================================

#[tokio::test]
async fn test_redelivered_deactivation_applies_once() {
    let harness = Harness::start();
    let client = ClientId::from("CLI-5");
    harness.accounts.open("ACC-501", "CLI-5");
    harness.accounts.open("ACC-502", "CLI-5");

    // At-least-once delivery can hand the consumer the same event twice.
    harness.producer.client_deactivated(&client).await.unwrap();
    harness.producer.client_deactivated(&client).await.unwrap();

    let accounts = harness.accounts.clone();
    wait_for(move || accounts.applied().len() == 2).await;

    assert_eq!(
        harness.accounts.applied(),
        vec![
            ("deactivate".to_string(), 2),
            ("deactivate".to_string(), 0)
        ],
        "the second application must touch nothing"
    );
    assert_eq!(harness.accounts.is_active("ACC-501"), Some(false));
    assert_eq!(harness.accounts.is_active("ACC-502"), Some(false));

    harness.stop().await;
}
