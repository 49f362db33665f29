//! Core business logic for Ledgra.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `account` - Account model, lifecycle standing, and field validation
//! - `ledger` - Movement model, balance chaining, and mutation policy
//! - `sync` - Client lifecycle events and the account sync contract
//! - `client` - Read-side view of clients owned by the registry service

pub mod account;
pub mod client;
pub mod ledger;
pub mod sync;
