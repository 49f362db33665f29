//! Client registry integration for Ledgra.
//!
//! This crate provides:
//! - The event channel contract and its in-memory transport
//! - The lifecycle event producer and the account-sync consumer
//! - HTTP lookups against the registry with read-path name caching
//! - The account service gluing repositories to the registry

pub mod channel;
pub mod consumer;
pub mod lookup;
pub mod producer;
pub mod service;

pub use channel::{EventChannel, EventMessage, InMemoryEventChannel};
pub use consumer::AccountSyncConsumer;
pub use lookup::{ClientLookupClient, NameCache};
pub use producer::ClientLifecycleProducer;
pub use service::{AccountService, AccountView};
