//! Client lifecycle synchronization.
//!
//! The client registry service owns client records. Lifecycle changes
//! reach this service as events; this module defines their wire shape
//! and the contract the storage layer implements to apply them.

pub mod event;
pub mod store;

pub use event::{ClientLifecycleEvent, LifecycleEventKind};
pub use store::{AccountSync, SyncError};
