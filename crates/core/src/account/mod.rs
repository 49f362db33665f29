//! Account domain model.
//!
//! This module implements the account side of the ledger:
//! - Account types and input payloads
//! - Lifecycle standing driven by client registry events
//! - Field validation and immutability rules

pub mod standing;
pub mod types;
pub mod validation;

pub use standing::{LifecycleAction, Standing, Transition};
pub use types::{Account, AccountPatch, AccountType, AccountUpdate, NewAccount};
pub use validation::{validate_new_account, validate_update, MAX_ACCOUNT_NUMBER_LEN};
