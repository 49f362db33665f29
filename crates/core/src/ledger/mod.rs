//! Movement ledger logic.
//!
//! This module implements the core ledger functionality:
//! - Movement records (deposits and withdrawals)
//! - Signed amount normalization
//! - Running balance chaining
//! - Mutation eligibility rules
//! - Error types for ledger operations

pub mod error;
pub mod policy;
pub mod types;

pub use error::LedgerError;
pub use policy::{
    amendment_base, check_mutable, latest, normalized_amount, registration_base, resolve_movement,
};
pub use types::{MovementKind, MovementRecord, ResolvedMovement};
